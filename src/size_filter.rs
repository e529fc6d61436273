//! Size predicate (C6): a thin filter over the walker (C2). Converts a
//! `(condition, value, unit)` triple into a `[min_size, max_size]` window for
//! the walk, then re-checks each entry to cover the `Exactly` case precisely
//! (the walker's window alone can't express "equal to", only "at least" /
//! "at most").

use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::error::EngineError;
use crate::progress::EngineProgress;
use crate::types::{FileInfo, SizeCondition, SizeUnit};
use crate::walk::walk_roots;

/// Convert a `(value, unit)` pair to a byte count.
pub fn to_bytes(value: f64, unit: SizeUnit) -> u64 {
    (value * unit.bytes_per_unit() as f64).round() as u64
}

/// Human-readable byte count (`"1.50 MB"`), matching the units in
/// [`SizeUnit`].
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[(&str, u64)] = &[
        ("TB", 1024u64.pow(4)),
        ("GB", 1024u64.pow(3)),
        ("MB", 1024u64.pow(2)),
        ("KB", 1024),
    ];
    for (label, factor) in UNITS {
        if bytes >= *factor {
            return format!("{:.2} {label}", bytes as f64 / *factor as f64);
        }
    }
    format!("{bytes} B")
}

/// Find every file under `roots` matching `condition` against `value` in
/// `unit`. Roots that fail to walk are skipped (logged); cancellation
/// returns [`EngineError::Cancelled`] with no partial list.
pub fn find_by_size(
    roots: &[PathBuf],
    condition: SizeCondition,
    value: f64,
    unit: SizeUnit,
    cancel: &CancelToken,
    progress: &dyn EngineProgress,
) -> Result<Vec<FileInfo>, EngineError> {
    let bytes = to_bytes(value, unit);
    let (min_size, max_size) = match condition {
        SizeCondition::LargerThan => (bytes.saturating_add(1), u64::MAX),
        SizeCondition::SmallerThan => (0, bytes.saturating_sub(1)),
        SizeCondition::Exactly => (0, u64::MAX),
    };

    let (found, failures) = walk_roots(roots, min_size, max_size, cancel, progress)?;
    for f in &failures {
        log::warn!("root invalid, skipped: {} ({})", f.root.display(), f.reason);
    }

    let out = if condition == SizeCondition::Exactly {
        found.into_iter().filter(|f| f.size == bytes).collect()
    } else {
        found
    };
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::fs;

    #[test]
    fn larger_than_returns_only_the_big_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("small.bin"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("big.bin"), vec![0u8; 2 * 1024 * 1024]).unwrap();

        let cancel = CancelToken::new();
        let roots = vec![dir.path().to_path_buf()];
        let found = find_by_size(
            &roots,
            SizeCondition::LargerThan,
            1.0,
            SizeUnit::MB,
            &cancel,
            &NullProgress,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "big.bin");
    }

    #[test]
    fn smaller_than_returns_only_the_small_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("tiny.bin"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("big.bin"), vec![0u8; 2000]).unwrap();

        let cancel = CancelToken::new();
        let roots = vec![dir.path().to_path_buf()];
        let found = find_by_size(
            &roots,
            SizeCondition::SmallerThan,
            1.0,
            SizeUnit::KB,
            &cancel,
            &NullProgress,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "tiny.bin");
    }

    #[test]
    fn exactly_matches_precise_byte_count() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("exact.bin"), vec![0u8; 512]).unwrap();
        fs::write(dir.path().join("off_by_one.bin"), vec![0u8; 513]).unwrap();

        let cancel = CancelToken::new();
        let roots = vec![dir.path().to_path_buf()];
        let found = find_by_size(
            &roots,
            SizeCondition::Exactly,
            512.0,
            SizeUnit::B,
            &cancel,
            &NullProgress,
        )
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "exact.bin");
    }

    #[test]
    fn format_size_picks_largest_fitting_unit() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1024 * 1024 * 3), "3.00 MB");
    }
}
