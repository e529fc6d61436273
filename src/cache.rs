//! Hash cache (C4): a `rusqlite`-backed `file_cache` table keyed on absolute
//! path, validated against `(size, mtime)`, with buffered writes committed
//! only on an explicit [`HashCache::flush`].
//!
//! Grounded on the teacher's WAL-pragma-and-single-mutexed-connection
//! pattern (`engine/db_ops/{open,connection}.rs`): one connection, guarded
//! by a mutex, shared across the worker pool. The teacher commits every
//! batch inside a single call; this cache instead separates `put` (queue)
//! from `flush` (commit) because spec.md §4.4 explicitly rejects
//! flush-per-write as a 100x+ throughput regression.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::config::MaintenanceConsts;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS file_cache (
    path TEXT PRIMARY KEY,
    size INTEGER NOT NULL,
    mtime REAL NOT NULL,
    quick_hash TEXT NOT NULL,
    full_hash TEXT,
    last_checked REAL NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_file_cache_size_mtime ON file_cache(size, mtime);
CREATE INDEX IF NOT EXISTS idx_file_cache_last_checked ON file_cache(last_checked);
"#;

const WAL_PRAGMAS: &str = "PRAGMA synchronous = NORMAL; PRAGMA temp_store = MEMORY;";

/// Queued row awaiting a [`HashCache::flush`].
struct PendingRow {
    key: String,
    size: i64,
    mtime: f64,
    quick_hash: String,
    full_hash: Option<String>,
    last_checked: f64,
}

/// Snapshot returned by [`HashCache::stats`]. No durability guarantee — a
/// concurrent `put` may land between the two queries this reads.
#[derive(Debug, Clone)]
pub struct CacheStats {
    pub entries: u64,
    pub bytes: u64,
    pub path: PathBuf,
}

pub struct HashCache {
    conn: Mutex<Connection>,
    pending: Mutex<Vec<PendingRow>>,
    path: PathBuf,
}

/// Normalize a path to the cache's primary-key representation. Case folding
/// is applied on Windows and macOS, where the underlying filesystem is
/// typically case-insensitive — see SPEC_FULL.md §6's resolution of the
/// case-sensitive-keying Open Question. Linux keeps paths case-sensitive.
pub fn cache_key(path: &Path) -> String {
    let raw = path.to_string_lossy().replace('\\', "/");
    if cfg!(target_os = "windows") || cfg!(target_os = "macos") {
        raw.to_lowercase()
    } else {
        raw
    }
}

fn now_secs() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}

impl HashCache {
    /// Open (creating if absent) the cache database at `path`, applying WAL
    /// mode and the schema. The returned cache owns a single connection
    /// guarded by an internal mutex — concurrent callers serialize on it,
    /// per spec.md §4.4's concurrency model.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("create cache directory")?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("open hash cache at {}", path.display()))?;
        conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))
            .context("enable WAL")?;
        conn.execute_batch(WAL_PRAGMAS).context("set pragmas")?;
        conn.execute_batch(SCHEMA).context("create schema")?;
        Ok(HashCache {
            conn: Mutex::new(conn),
            pending: Mutex::new(Vec::new()),
            path: path.to_path_buf(),
        })
    }

    /// An in-memory cache, useful for tests and for callers that want
    /// memoization within a single run only.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory cache")?;
        conn.execute_batch(SCHEMA).context("create schema")?;
        Ok(HashCache {
            conn: Mutex::new(conn),
            pending: Mutex::new(Vec::new()),
            path: PathBuf::from(":memory:"),
        })
    }

    /// Validated lookup: present only when `size` and `mtime` exactly match
    /// the stored row. Any DB error is swallowed and treated as a miss, per
    /// spec.md §4.4's failure semantics.
    pub fn get(&self, path: &Path, size: u64, mtime: f64) -> Option<(Option<String>, Option<String>)> {
        let key = cache_key(path);
        let conn = self.conn.lock().ok()?;
        let row: rusqlite::Result<(i64, f64, String, Option<String>)> = conn.query_row(
            "SELECT size, mtime, quick_hash, full_hash FROM file_cache WHERE path = ?1",
            [&key],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        );
        match row {
            Ok((db_size, db_mtime, quick, full)) => {
                if db_size as u64 == size && db_mtime == mtime {
                    Some((Some(quick), full))
                } else {
                    None
                }
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(_) => None,
        }
    }

    /// Queue an upsert; not committed until [`HashCache::flush`]. `full` may
    /// be `None` — a present `quick_hash` with absent `full_hash` is
    /// legitimate and means "file too small to need a separate full hash".
    pub fn put(&self, path: &Path, size: u64, mtime: f64, quick_hash: u64, full_hash: Option<u64>) {
        let row = PendingRow {
            key: cache_key(path),
            size: size as i64,
            mtime,
            quick_hash: format!("{quick_hash:016x}"),
            full_hash: full_hash.map(|h| format!("{h:016x}")),
            last_checked: now_secs(),
        };
        if let Ok(mut pending) = self.pending.lock() {
            pending.push(row);
        }
    }

    /// Durably commit every queued `put` in a single transaction. A no-op
    /// (and still `Ok`) when nothing is pending. Any IO/DB error downgrades
    /// to a swallowed no-op, leaving pending rows queued for the next flush.
    pub fn flush(&self) -> Result<()> {
        let mut pending = match self.pending.lock() {
            Ok(p) => p,
            Err(_) => return Ok(()),
        };
        if pending.is_empty() {
            return Ok(());
        }
        let Ok(mut conn) = self.conn.lock() else {
            return Ok(());
        };
        let result = (|| -> Result<()> {
            let tx = conn.transaction().context("begin flush transaction")?;
            {
                let mut stmt = tx
                    .prepare(
                        "INSERT INTO file_cache (path, size, mtime, quick_hash, full_hash, last_checked)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                         ON CONFLICT(path) DO UPDATE SET
                            size = excluded.size,
                            mtime = excluded.mtime,
                            quick_hash = excluded.quick_hash,
                            full_hash = excluded.full_hash,
                            last_checked = excluded.last_checked",
                    )
                    .context("prepare upsert")?;
                for row in pending.iter() {
                    stmt.execute(rusqlite::params![
                        row.key,
                        row.size,
                        row.mtime,
                        row.quick_hash,
                        row.full_hash,
                        row.last_checked,
                    ])
                    .context("upsert row")?;
                }
            }
            tx.commit().context("commit flush")?;
            Ok(())
        })();
        if result.is_ok() {
            pending.clear();
        }
        drop(conn);
        // Cache IO failures never propagate; callers proceed as if uncached.
        Ok(())
    }

    /// Delete rows whose `last_checked` is older than `now - max_age`.
    /// Returns the number of rows deleted; swallows DB errors as zero.
    pub fn cleanup_stale(&self, max_age: Duration) -> u64 {
        let Ok(conn) = self.conn.lock() else {
            return 0;
        };
        let cutoff = now_secs() - max_age.as_secs_f64();
        conn.execute("DELETE FROM file_cache WHERE last_checked < ?1", [cutoff])
            .map(|n| n as u64)
            .unwrap_or(0)
    }

    /// For every row, checks path existence and deletes misses, processed
    /// in batches of `batch` to bound lock hold time. Returns the total
    /// number of rows deleted.
    pub fn cleanup_orphaned(&self, batch: usize) -> u64 {
        let batch = batch.max(1);
        let mut total = 0u64;
        // Keyset pagination by `path` (the primary key): deleting rows in
        // one batch never perturbs the ordering of rows still ahead of the
        // cursor, unlike LIMIT/OFFSET which would skip rows as we delete.
        let mut cursor = String::new();
        loop {
            let paths: Vec<String> = {
                let Ok(conn) = self.conn.lock() else {
                    return total;
                };
                let Ok(mut stmt) =
                    conn.prepare("SELECT path FROM file_cache WHERE path > ?1 ORDER BY path LIMIT ?2")
                else {
                    return total;
                };
                let rows = stmt.query_map(rusqlite::params![cursor, batch as i64], |r| {
                    r.get::<_, String>(0)
                });
                match rows {
                    Ok(rows) => rows.filter_map(|r| r.ok()).collect(),
                    Err(_) => return total,
                }
            };
            if paths.is_empty() {
                break;
            }
            cursor = paths.last().cloned().unwrap_or(cursor);

            let orphans: Vec<&String> = paths.iter().filter(|p| !Path::new(p).exists()).collect();
            if !orphans.is_empty() {
                let Ok(conn) = self.conn.lock() else {
                    return total;
                };
                for p in &orphans {
                    if conn
                        .execute("DELETE FROM file_cache WHERE path = ?1", [p.as_str()])
                        .is_ok()
                    {
                        total += 1;
                    }
                }
            }
            if paths.len() < batch {
                break;
            }
        }
        total
    }

    /// Compact the store in place (`VACUUM`). Swallows errors.
    pub fn vacuum(&self) {
        if let Ok(conn) = self.conn.lock() {
            let _ = conn.execute_batch("VACUUM");
        }
    }

    /// Snapshot of row count and on-disk byte size.
    pub fn stats(&self) -> CacheStats {
        let entries = self
            .conn
            .lock()
            .ok()
            .and_then(|conn| {
                conn.query_row("SELECT COUNT(*) FROM file_cache", [], |r| {
                    r.get::<_, i64>(0)
                })
                .ok()
            })
            .map(|n| n.max(0) as u64)
            .unwrap_or(0);
        let bytes = std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0);
        CacheStats {
            entries,
            bytes,
            path: self.path.clone(),
        }
    }

    /// Remove every row and vacuum.
    pub fn clear_all(&self) -> Result<()> {
        if let Ok(mut pending) = self.pending.lock() {
            pending.clear();
        }
        let conn = self.conn.lock().map_err(|_| anyhow::anyhow!("cache mutex poisoned"))?;
        conn.execute("DELETE FROM file_cache", [])
            .context("clear file_cache")?;
        conn.execute_batch("VACUUM").context("vacuum after clear")?;
        Ok(())
    }
}

/// Startup maintenance tuning default, kept here so [`crate::maintenance`]
/// doesn't need its own copy of the orphan-sweep batch size.
pub const DEFAULT_ORPHAN_BATCH: usize = MaintenanceConsts::ORPHAN_SWEEP_BATCH;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn round_trips_unchanged_size_and_mtime() {
        let cache = HashCache::open_in_memory().unwrap();
        let path = Path::new("/tmp/example.bin");
        cache.put(path, 100, 123.456, 0xDEAD, Some(0xBEEF));
        cache.flush().unwrap();

        let got = cache.get(path, 100, 123.456).unwrap();
        assert_eq!(got.0.as_deref(), Some("000000000000dead"));
        assert_eq!(got.1.as_deref(), Some("000000000000beef"));
    }

    #[test]
    fn miss_on_size_or_mtime_mismatch() {
        let cache = HashCache::open_in_memory().unwrap();
        let path = Path::new("/tmp/example.bin");
        cache.put(path, 100, 123.456, 0xDEAD, Some(0xBEEF));
        cache.flush().unwrap();

        assert!(cache.get(path, 101, 123.456).is_none());
        assert!(cache.get(path, 100, 999.0).is_none());
    }

    #[test]
    fn put_without_flush_is_not_visible() {
        let cache = HashCache::open_in_memory().unwrap();
        let path = Path::new("/tmp/unflushed.bin");
        cache.put(path, 10, 1.0, 0x1, None);
        assert!(cache.get(path, 10, 1.0).is_none());
        cache.flush().unwrap();
        assert!(cache.get(path, 10, 1.0).is_some());
    }

    #[test]
    fn null_full_hash_is_a_legitimate_small_file_marker() {
        let cache = HashCache::open_in_memory().unwrap();
        let path = Path::new("/tmp/small.bin");
        cache.put(path, 10, 1.0, 0xAAAA, None);
        cache.flush().unwrap();
        let (quick, full) = cache.get(path, 10, 1.0).unwrap();
        assert!(quick.is_some());
        assert!(full.is_none());
    }

    #[test]
    fn cleanup_orphaned_deletes_rows_for_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let alive = dir.path().join("alive.bin");
        fs::write(&alive, b"x").unwrap();
        let gone = dir.path().join("gone.bin");

        let cache = HashCache::open_in_memory().unwrap();
        cache.put(&alive, 1, 1.0, 1, Some(1));
        cache.put(&gone, 1, 1.0, 2, Some(2));
        cache.flush().unwrap();

        let deleted = cache.cleanup_orphaned(1000);
        assert_eq!(deleted, 1);
        assert!(cache.get(&alive, 1, 1.0).is_some());
        assert!(cache.get(&gone, 1, 1.0).is_none());
    }

    #[test]
    fn cleanup_stale_deletes_old_rows() {
        let cache = HashCache::open_in_memory().unwrap();
        let path = Path::new("/tmp/stale.bin");
        cache.put(path, 1, 1.0, 1, Some(1));
        cache.flush().unwrap();
        {
            let conn = cache.conn.lock().unwrap();
            conn.execute("UPDATE file_cache SET last_checked = 0", [])
                .unwrap();
        }
        let deleted = cache.cleanup_stale(Duration::from_secs(60));
        assert_eq!(deleted, 1);
    }

    #[test]
    fn clear_all_empties_the_table() {
        let cache = HashCache::open_in_memory().unwrap();
        cache.put(Path::new("/tmp/a"), 1, 1.0, 1, Some(1));
        cache.flush().unwrap();
        cache.clear_all().unwrap();
        assert_eq!(cache.stats().entries, 0);
    }
}
