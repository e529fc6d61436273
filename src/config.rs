//! Tuning constants (spec §6) and on-disk settings, grouped the way the
//! teacher's `utils::config` groups its own tuning constants.

use std::sync::OnceLock;

/// Package-derived paths: built once from `CARGO_PKG_NAME`, then cached.
pub struct PackagePaths {
    db_filename: String,
}

static PACKAGE_PATHS: OnceLock<PackagePaths> = OnceLock::new();

impl PackagePaths {
    pub fn get() -> &'static PackagePaths {
        PACKAGE_PATHS.get_or_init(|| PackagePaths {
            db_filename: "hash_cache.db".to_string(),
        })
    }

    pub fn db_filename(&self) -> &str {
        &self.db_filename
    }

    /// Per-user app-data directory the cache DB lives under.
    pub fn app_data_dir(&self) -> std::path::PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(env!("CARGO_PKG_NAME"))
    }
}

/// Worker pool sizes for the two hashing phases of the duplicate pipeline.
#[derive(Clone, Copy, Debug)]
pub struct WorkerThreadLimits {
    pub quick_pool: usize,
    pub full_pool: usize,
    pub hdd_max: usize,
    pub floor: usize,
    pub unknown_max: usize,
    pub network_max: usize,
}

impl Default for WorkerThreadLimits {
    fn default() -> Self {
        Self {
            quick_pool: Self::QUICK_POOL,
            full_pool: Self::FULL_POOL,
            hdd_max: Self::HDD_THREADS,
            floor: Self::FLOOR_THREADS,
            unknown_max: Self::UNKNOWN_MAX_THREADS,
            network_max: Self::NETWORK_MAX_THREADS,
        }
    }
}

impl WorkerThreadLimits {
    pub const QUICK_POOL: usize = 8;
    pub const FULL_POOL: usize = 4;
    pub const HDD_THREADS: usize = 2;
    pub const FLOOR_THREADS: usize = 1;
    pub const UNKNOWN_MAX_THREADS: usize = 4;
    pub const NETWORK_MAX_THREADS: usize = 4;
}

/// Hashing I/O thresholds and buffer sizes (spec §6).
pub struct HashingConsts;

impl HashingConsts {
    /// Streaming chunk size for full-digest reads.
    pub const CHUNK_SIZE: usize = 64 * 1024;
    /// Files at or below this size get their quick hash promoted directly
    /// to the full hash instead of re-reading the whole file.
    pub const SMALL_FILE_THRESHOLD: u64 = 1024 * 1024;
    /// Bytes sampled from the start and end of a file for the quick sketch.
    pub const QUICK_SAMPLE: usize = 1024;
    /// Files above this size are skipped entirely (never hashed).
    pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024 * 1024;
}

/// Walk progress reporting stride (spec §9 design note).
pub const PROGRESS_STRIDE: usize = 500;

/// Cache maintenance tuning (C9).
pub struct MaintenanceConsts;

impl MaintenanceConsts {
    pub const ORPHAN_SWEEP_BATCH: usize = 1000;
    pub const STALE_AGE_DAYS: i64 = 30;
    /// Delay before the background maintenance task runs once at startup.
    pub const STARTUP_DELAY_SECS: u64 = 5;
}

/// Batch size for cache write transactions.
pub const DB_INSERT_BATCH_SIZE: usize = 1000;
