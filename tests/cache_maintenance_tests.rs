//! Integration coverage for the hash cache's maintenance sweeps (C9) against
//! a real on-disk SQLite file, not the in-memory variant the unit tests use.

use dupengine::{run_sweep, HashCache};
use std::fs;

#[test]
fn sweep_removes_orphans_from_a_real_database_file() {
    let db_dir = tempfile::tempdir().unwrap();
    let work_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("hash_cache.db");

    let alive = work_dir.path().join("alive.bin");
    fs::write(&alive, b"hello").unwrap();
    let gone = work_dir.path().join("gone.bin");

    let cache = HashCache::open(&db_path).unwrap();
    cache.put(&alive, 5, 1.0, 1, Some(1));
    cache.put(&gone, 5, 1.0, 2, Some(2));
    cache.flush().unwrap();
    assert_eq!(cache.stats().entries, 2);

    let report = run_sweep(&cache);
    assert_eq!(report.orphans_removed, 1);
    assert!(report.vacuumed);
    assert_eq!(cache.stats().entries, 1);
}

#[test]
fn reopening_an_existing_database_keeps_its_schema() {
    let db_dir = tempfile::tempdir().unwrap();
    let db_path = db_dir.path().join("hash_cache.db");

    {
        let cache = HashCache::open(&db_path).unwrap();
        cache.put(std::path::Path::new("/tmp/x"), 1, 1.0, 1, Some(1));
        cache.flush().unwrap();
    }

    let reopened = HashCache::open(&db_path).unwrap();
    assert_eq!(reopened.stats().entries, 1);
}
