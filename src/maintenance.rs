//! Cache maintenance (C9): orphan sweep, stale-row eviction, and vacuum,
//! run both automatically on a delayed startup thread and on demand from
//! the CLI's `cache` subcommands (spec.md §4.8). Grounded on the teacher's
//! `thread::spawn`-a-background-worker pattern (`engine/core.rs`), adapted
//! from a streaming walk worker to a single delayed one-shot sweep.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::info;

use crate::cache::{HashCache, DEFAULT_ORPHAN_BATCH};
use crate::config::MaintenanceConsts;

/// Outcome of a maintenance sweep, for logging and for the CLI's `cache
/// cleanup` summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaintenanceReport {
    pub orphans_removed: u64,
    pub stale_removed: u64,
    pub vacuumed: bool,
}

/// Run one full sweep synchronously: orphan sweep, then stale-row eviction,
/// then a conditional `VACUUM` if either step freed rows. Each step is
/// independently invocable (see [`sweep_orphans`], [`sweep_stale`]) for the
/// CLI's individual `cache cleanup-*` subcommands.
pub fn run_sweep(cache: &HashCache) -> MaintenanceReport {
    let orphans_removed = sweep_orphans(cache);
    let stale_removed = sweep_stale(cache);
    let vacuumed = orphans_removed > 0 || stale_removed > 0;
    if vacuumed {
        cache.vacuum();
    }
    info!(
        "cache maintenance: {orphans_removed} orphaned, {stale_removed} stale, vacuumed={vacuumed}"
    );
    MaintenanceReport {
        orphans_removed,
        stale_removed,
        vacuumed,
    }
}

/// Delete cache rows whose path no longer exists on disk.
pub fn sweep_orphans(cache: &HashCache) -> u64 {
    cache.cleanup_orphaned(DEFAULT_ORPHAN_BATCH)
}

/// Delete cache rows not checked in over [`MaintenanceConsts::STALE_AGE_DAYS`].
pub fn sweep_stale(cache: &HashCache) -> u64 {
    let max_age = Duration::from_secs(MaintenanceConsts::STALE_AGE_DAYS as u64 * 24 * 60 * 60);
    cache.cleanup_stale(max_age)
}

/// Spawn a background thread that waits
/// [`MaintenanceConsts::STARTUP_DELAY_SECS`] then runs [`run_sweep`] once.
/// Detached: the caller does not need to join it, matching spec.md §4.8's
/// "maintenance never blocks the UI" requirement. Errors inside the sweep
/// are already swallowed by [`HashCache`]'s own methods, so this never
/// panics the thread.
pub fn spawn_startup_sweep(cache: Arc<HashCache>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(MaintenanceConsts::STARTUP_DELAY_SECS));
        run_sweep(&cache);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn sweep_orphans_removes_missing_paths_only() {
        let dir = tempfile::tempdir().unwrap();
        let alive = dir.path().join("alive.bin");
        fs::write(&alive, b"x").unwrap();
        let gone = dir.path().join("gone.bin");

        let cache = HashCache::open_in_memory().unwrap();
        cache.put(&alive, 1, 1.0, 1, Some(1));
        cache.put(&gone, 1, 1.0, 2, Some(2));
        cache.flush().unwrap();

        assert_eq!(sweep_orphans(&cache), 1);
        assert!(cache.get(&alive, 1, 1.0).is_some());
    }

    #[test]
    fn run_sweep_vacuums_only_when_something_was_removed() {
        let cache = HashCache::open_in_memory().unwrap();
        let report = run_sweep(&cache);
        assert_eq!(report.orphans_removed, 0);
        assert_eq!(report.stale_removed, 0);
        assert!(!report.vacuumed);
    }

    #[test]
    fn sweep_stale_respects_configured_age() {
        let cache = HashCache::open_in_memory().unwrap();
        cache.put(std::path::Path::new("/tmp/x"), 1, 1.0, 1, Some(1));
        cache.flush().unwrap();
        // A fresh row is not yet 30 days stale.
        assert_eq!(sweep_stale(&cache), 0);
    }
}
