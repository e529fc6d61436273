//! Duplicate pipeline (C5): the heart of the system. A four-phase state
//! machine — enumerate (C2) → group by size → quick-hash pool (C3 + C4) →
//! full-hash pool (C3 + C4) → group filter — grounded on the teacher's
//! bounded producer/worker-pool architecture (`pipeline/{context,
//! orchestrator}.rs`'s channel handoff, generalized here to rayon-scoped
//! pools sized per spec.md §6's `QUICK_POOL`/`FULL_POOL`).

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use rayon::prelude::*;

use crate::cache::HashCache;
use crate::cancel::CancelToken;
use crate::config::{HashingConsts, WorkerThreadLimits};
use crate::drives::{drive_type_for_path, DriveType};
use crate::error::EngineError;
use crate::hash::{hash_full, hash_quick};
use crate::progress::{EngineProgress, HashPhase};
use crate::types::{DuplicateGroup, FileInfo};
use crate::walk::walk_roots;

/// Counters describing one [`find_duplicates`] run, useful for diagnostics
/// and tests. `quick_matched_not_full` is the telemetry SPEC_FULL.md §6
/// adds for the quick-hash-collision Open Question in spec.md §9: how many
/// files shared a quick hash with at least one sibling but turned out to
/// have a different full hash.
#[derive(Debug, Clone, Default)]
pub struct DuplicateStats {
    pub files_observed: usize,
    pub size_candidates: usize,
    pub quick_hashed: usize,
    pub full_hashed: usize,
    pub quick_matched_not_full: u64,
    pub groups_found: usize,
}

/// Run `f` inside a rayon thread pool bounded to `size` workers. Falls back
/// to running on the ambient pool if a pool of that size can't be built
/// (e.g. the process is already deeply nested in rayon scopes) — bounded
/// parallelism is a throughput tuning, not a correctness requirement.
fn with_bounded_pool<R>(size: usize, f: impl FnOnce() -> R + Send) -> R
where
    R: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(size.max(1)).build() {
        Ok(pool) => pool.install(f),
        Err(e) => {
            log::debug!("could not build a {size}-worker pool ({e}); using the ambient pool");
            f()
        }
    }
}

fn parse_hex_u64(s: &str) -> Option<u64> {
    u64::from_str_radix(s, 16).ok()
}

/// `QUICK_POOL`/`FULL_POOL` (spec.md §6) are tuned for a spinning-disk
/// baseline (spec.md §9 Design Notes). Per that same note — "a good
/// implementation exposes them and adapts upward on fast SSDs" — scale both
/// pools up when every root resolves to an SSD; any HDD, network, or
/// undetectable root in the set keeps the documented defaults rather than
/// risking over-saturating a slower device.
fn pool_sizes_for_roots(roots: &[PathBuf]) -> (usize, usize) {
    let quick_default = WorkerThreadLimits::QUICK_POOL;
    let full_default = WorkerThreadLimits::FULL_POOL;
    let all_ssd = !roots.is_empty()
        && roots.iter().all(|r| drive_type_for_path(r) == DriveType::Ssd);
    if !all_ssd {
        return (quick_default, full_default);
    }
    let available = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(quick_default);
    let quick = available.max(quick_default);
    let full = (quick / 2).max(full_default);
    (quick, full)
}

/// Find duplicate-content groups across `roots`. Only files at or above
/// `min_size` are considered (0 includes empty files). Cancellation at any
/// phase returns [`EngineError::Cancelled`] with no partial groups — see
/// spec.md §4.5.
pub fn find_duplicates(
    roots: &[PathBuf],
    min_size: u64,
    cache: &HashCache,
    cancel: &CancelToken,
    progress: &dyn EngineProgress,
) -> Result<(Vec<DuplicateGroup>, DuplicateStats), EngineError> {
    let mut stats = DuplicateStats::default();

    // Phase 1 — enumeration, single-threaded (the walker is the bottleneck).
    let (files, failures) = walk_roots(roots, min_size, HashingConsts::MAX_FILE_SIZE, cancel, progress)?;
    for f in &failures {
        log::warn!("root invalid, skipped: {} ({})", f.root.display(), f.reason);
    }
    stats.files_observed = files.len();
    let (quick_pool, full_pool) = pool_sizes_for_roots(roots);

    let mut size_groups: HashMap<u64, Vec<FileInfo>> = HashMap::new();
    for f in files {
        size_groups.entry(f.size).or_default().push(f);
    }
    let candidates: Vec<FileInfo> = size_groups
        .into_values()
        .filter(|v| v.len() >= 2)
        .flatten()
        .collect();
    stats.size_candidates = candidates.len();

    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }
    if candidates.is_empty() {
        return Ok((Vec::new(), stats));
    }

    // Phase 2 — quick digest, bounded worker pool.
    let total_quick = candidates.len();
    let quick_groups: Mutex<HashMap<(u64, u64), Vec<FileInfo>>> = Mutex::new(HashMap::new());
    let quick_done = AtomicU64::new(0);

    let quick_result = with_bounded_pool(quick_pool, || {
        candidates.par_iter().try_for_each(|info| -> Result<(), EngineError> {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let quick = cache
                .get(&info.path, info.size, info.mtime)
                .and_then(|(q, _)| q)
                .and_then(|s| parse_hex_u64(&s))
                .or_else(|| {
                    let q = hash_quick(&info.path, info.size)?;
                    cache.put(&info.path, info.size, info.mtime, q, None);
                    Some(q)
                });
            let Some(quick) = quick else {
                return Ok(()); // unreadable file: skipped silently (PerFileIO)
            };
            let mut tagged = info.clone();
            tagged.quick_hash = Some(quick);
            if let Ok(mut groups) = quick_groups.lock() {
                groups.entry((info.size, quick)).or_default().push(tagged);
            }
            let done = quick_done.fetch_add(1, Ordering::Relaxed) + 1;
            if done.is_multiple_of(10) || done as usize == total_quick {
                progress.on_hash_phase(HashPhase::Quick, done as usize, total_quick, &info.path);
            }
            Ok(())
        })
    });
    cache.flush().ok();
    quick_result?;

    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    // Phase 3 — full digest, smaller bounded worker pool.
    let quick_groups = quick_groups.into_inner().unwrap_or_default();
    let full_candidates: Vec<FileInfo> = quick_groups
        .values()
        .filter(|v| v.len() >= 2)
        .flatten()
        .cloned()
        .collect();
    stats.quick_hashed = total_quick;
    stats.full_hashed = full_candidates.len();

    if full_candidates.is_empty() {
        return Ok((Vec::new(), stats));
    }

    let total_full = full_candidates.len();
    let full_groups: Mutex<HashMap<u64, Vec<FileInfo>>> = Mutex::new(HashMap::new());
    let resolved: Mutex<HashMap<PathBuf, u64>> = Mutex::new(HashMap::new());
    let full_done = AtomicU64::new(0);

    let full_result = with_bounded_pool(full_pool, || {
        full_candidates.par_iter().try_for_each(|info| -> Result<(), EngineError> {
            if cancel.is_cancelled() {
                return Err(EngineError::Cancelled);
            }
            let quick = info
                .quick_hash
                .expect("phase 3 candidates always carry a quick hash from phase 2");

            let (full, phase) = if info.size <= HashingConsts::SMALL_FILE_THRESHOLD {
                // Small-file promotion: quick already read the whole file.
                cache.put(&info.path, info.size, info.mtime, quick, Some(quick));
                (Some(quick), HashPhase::Small)
            } else {
                let full = cache
                    .get(&info.path, info.size, info.mtime)
                    .and_then(|(_, f)| f)
                    .and_then(|s| parse_hex_u64(&s))
                    .or_else(|| {
                        let f = hash_full(&info.path, cancel)?;
                        cache.put(&info.path, info.size, info.mtime, quick, Some(f));
                        Some(f)
                    });
                (full, HashPhase::Full)
            };
            let Some(full) = full else {
                return Ok(());
            };

            if let Ok(mut r) = resolved.lock() {
                r.insert(info.path.clone(), full);
            }
            let mut tagged = info.clone();
            tagged.full_hash = Some(full);
            if let Ok(mut groups) = full_groups.lock() {
                groups.entry(full).or_default().push(tagged);
            }
            let done = full_done.fetch_add(1, Ordering::Relaxed) + 1;
            if done.is_multiple_of(10) || done as usize == total_full {
                progress.on_hash_phase(phase, done as usize, total_full, &info.path);
            }
            Ok(())
        })
    });
    cache.flush().ok();
    full_result?;

    if cancel.is_cancelled() {
        return Err(EngineError::Cancelled);
    }

    // Telemetry: within each original quick-hash group, how many members'
    // full hash turned out not to match the majority (spec.md §9 Open
    // Question on quick-hash collisions).
    let resolved = resolved.into_inner().unwrap_or_default();
    let mut quick_matched_not_full = 0u64;
    for members in quick_groups.values().filter(|v| v.len() >= 2) {
        let mut by_full: HashMap<u64, u64> = HashMap::new();
        for m in members {
            if let Some(&fh) = resolved.get(&m.path) {
                *by_full.entry(fh).or_insert(0) += 1;
            }
        }
        if by_full.len() > 1 {
            let max = by_full.values().max().copied().unwrap_or(0);
            let total: u64 = by_full.values().sum();
            quick_matched_not_full += total - max;
        }
    }
    stats.quick_matched_not_full = quick_matched_not_full;

    // Phase 4 — group filter.
    let full_groups = full_groups.into_inner().unwrap_or_default();
    let groups: Vec<DuplicateGroup> = full_groups
        .into_iter()
        .filter(|(_, files)| files.len() >= 2)
        .map(|(full_hash, files)| DuplicateGroup {
            full_hash,
            size: files[0].size,
            files,
        })
        .collect();
    stats.groups_found = groups.len();

    Ok((groups, stats))
}
