//! Walker (C2): cancellable recursive directory enumeration honoring the
//! exclusion policy (C1), yielding [`FileInfo`] for every regular file that
//! passes the name/extension policy and the caller's size window.
//!
//! Modeled as a lazy `Iterator` over `walkdir`, per SPEC_FULL.md §9's design
//! note: a whole-tree Vec would blow memory on a multi-hundred-thousand-file
//! root, so nothing downstream of [`walk_one`] materializes the full list.

use std::path::{Path, PathBuf};

use crate::cancel::CancelToken;
use crate::config::PROGRESS_STRIDE;
use crate::error::EngineError;
use crate::exclude::{is_excluded_dir_name, is_excluded_file};
use crate::progress::EngineProgress;
use crate::types::FileInfo;

/// Lazy, cancellable, exclusion-aware walk of a single root.
pub struct Walker<'a> {
    inner: walkdir::IntoIter,
    min_size: u64,
    max_size: u64,
    cancel: CancelToken,
    progress: &'a dyn EngineProgress,
    observed: usize,
    done: bool,
}

impl<'a> Walker<'a> {
    fn empty(min_size: u64, max_size: u64, cancel: CancelToken, progress: &'a dyn EngineProgress) -> Self {
        Walker {
            inner: walkdir::WalkDir::new(std::env::temp_dir()).max_depth(0).into_iter(),
            min_size,
            max_size,
            cancel,
            progress,
            observed: 0,
            done: true,
        }
    }
}

impl<'a> Iterator for Walker<'a> {
    type Item = FileInfo;

    fn next(&mut self) -> Option<FileInfo> {
        if self.done {
            return None;
        }
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }
            let entry = match self.inner.next() {
                Some(Ok(e)) => e,
                Some(Err(_)) => continue, // permission/IO error: silently skipped
                None => return None,
            };

            if entry.file_type().is_dir() {
                let excluded = entry
                    .file_name()
                    .to_str()
                    .map(is_excluded_dir_name)
                    .unwrap_or(false);
                if excluded {
                    self.inner.skip_current_dir();
                }
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if is_excluded_file(path) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                Err(_) => continue,
            };

            self.observed += 1;
            if self.observed.is_multiple_of(PROGRESS_STRIDE) {
                self.progress.on_enum(self.observed, path);
            }

            let size = metadata.len();
            if size < self.min_size || size > self.max_size {
                continue;
            }

            return Some(FileInfo::from_metadata(path.to_path_buf(), &metadata));
        }
    }
}

/// Begin a cancellable walk of `root`, honoring the exclusion policy (C1)
/// and the `[min_size, max_size]` byte window. Prunes excluded directories
/// before descending into them; silently skips excluded or unreadable
/// files. Returns [`EngineError::RootInvalid`] only if `root` itself
/// cannot be walked — per-entry errors never propagate.
pub fn walk<'a>(
    root: &Path,
    min_size: u64,
    max_size: u64,
    cancel: CancelToken,
    progress: &'a dyn EngineProgress,
) -> Result<Walker<'a>, EngineError> {
    let meta = std::fs::metadata(root)
        .map_err(|e| EngineError::RootInvalid(root.to_path_buf(), e.to_string()))?;
    if !meta.is_dir() {
        return Err(EngineError::RootInvalid(
            root.to_path_buf(),
            "not a directory".to_string(),
        ));
    }
    if let Some(name) = root.file_name().and_then(|n| n.to_str())
        && is_excluded_dir_name(name)
    {
        return Ok(Walker::empty(min_size, max_size, cancel, progress));
    }

    let inner = walkdir::WalkDir::new(root).into_iter();

    Ok(Walker {
        inner,
        min_size,
        max_size,
        cancel,
        progress,
        observed: 0,
        done: false,
    })
}

/// A root that failed to walk, paired with the reason. Other roots passed
/// to [`walk_roots`] are still scanned — see spec.md §7 `RootInvalid`.
#[derive(Debug)]
pub struct RootFailure {
    pub root: PathBuf,
    pub reason: String,
}

/// Walk every root in `roots`, merging results and deduplicating files
/// reachable via more than one root input by canonicalized absolute path
/// (spec.md §8 boundary behavior). A root that fails to walk is recorded in
/// the returned failure list rather than aborting the whole call; the only
/// error this function itself returns is [`EngineError::Cancelled`].
pub fn walk_roots(
    roots: &[PathBuf],
    min_size: u64,
    max_size: u64,
    cancel: &CancelToken,
    progress: &dyn EngineProgress,
) -> Result<(Vec<FileInfo>, Vec<RootFailure>), EngineError> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let mut failures = Vec::new();

    for root in roots {
        if cancel.is_cancelled() {
            return Err(EngineError::Cancelled);
        }
        match walk(root, min_size, max_size, cancel.clone(), progress) {
            Ok(iter) => {
                for info in iter {
                    if cancel.is_cancelled() {
                        return Err(EngineError::Cancelled);
                    }
                    let key = info.path.canonicalize().unwrap_or_else(|_| info.path.clone());
                    if seen.insert(key) {
                        out.push(info);
                    }
                }
            }
            Err(EngineError::RootInvalid(path, reason)) => {
                log::debug!("root invalid, skipping: {} ({})", path.display(), reason);
                failures.push(RootFailure { root: path, reason });
            }
            Err(e) => return Err(e),
        }
    }
    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    Ok((out, failures))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::fs;

    #[test]
    fn walks_regular_files_within_size_window() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), vec![0u8; 100]).unwrap();
        fs::write(dir.path().join("b.bin"), vec![0u8; 5]).unwrap();

        let cancel = CancelToken::new();
        let found: Vec<_> = walk(dir.path(), 10, u64::MAX, cancel, &NullProgress)
            .unwrap()
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "a.bin");
    }

    #[test]
    fn prunes_excluded_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join(".git").join("config"), b"x").unwrap();
        fs::write(dir.path().join("readme.txt"), b"hi").unwrap();

        let cancel = CancelToken::new();
        let found: Vec<_> = walk(dir.path(), 0, u64::MAX, cancel, &NullProgress)
            .unwrap()
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "readme.txt");
    }

    #[test]
    fn rejects_nonexistent_root() {
        let cancel = CancelToken::new();
        let err = walk(
            Path::new("/does/not/exist/surely"),
            0,
            u64::MAX,
            cancel,
            &NullProgress,
        );
        assert!(matches!(err, Err(EngineError::RootInvalid(_, _))));
    }

    #[test]
    fn cancel_stops_enumeration_immediately() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..20 {
            fs::write(dir.path().join(format!("f{i}.bin")), vec![0u8; 10]).unwrap();
        }
        let cancel = CancelToken::new();
        cancel.cancel();
        let found: Vec<_> = walk(dir.path(), 0, u64::MAX, cancel, &NullProgress)
            .unwrap()
            .collect();
        assert!(found.is_empty());
    }

    #[test]
    fn walk_roots_dedupes_same_file_reached_twice() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), vec![1u8; 10]).unwrap();
        let cancel = CancelToken::new();
        let roots = vec![dir.path().to_path_buf(), dir.path().to_path_buf()];
        let (files, failures) = walk_roots(&roots, 0, u64::MAX, &cancel, &NullProgress).unwrap();
        assert_eq!(files.len(), 1);
        assert!(failures.is_empty());
    }

    #[test]
    fn walk_roots_records_invalid_root_and_continues() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.bin"), vec![1u8; 10]).unwrap();
        let cancel = CancelToken::new();
        let roots = vec![PathBuf::from("/no/such/root"), dir.path().to_path_buf()];
        let (files, failures) = walk_roots(&roots, 0, u64::MAX, &cancel, &NullProgress).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(failures.len(), 1);
    }
}
