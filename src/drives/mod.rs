//! Drive discovery (C8): enumerate mountable roots on the host, plus
//! drive-type detection used to size the hashing worker pools (spec.md §9
//! design note: "a good implementation exposes [the pool sizes] and adapts
//! upward on fast SSDs"). Grounded on the teacher's
//! `disk_detect/{mod,linux,macos,windows,network}.rs`, kept close to
//! verbatim for the platform-probing internals; the DB-backed network-IOPS
//! calibration in the teacher's `probe.rs` has no counterpart here (it
//! existed to tune the teacher's indexer, not this engine's fixed
//! `QUICK_POOL`/`FULL_POOL`).

use std::path::{Path, PathBuf};

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "macos")]
mod macos;
mod network;
#[cfg(target_os = "windows")]
mod windows;

use crate::config::WorkerThreadLimits;

/// Drive type for performance tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveType {
    Ssd,
    Hdd,
    Network,
    Unknown,
}

impl DriveType {
    /// Optimal worker thread count for this drive type, given the number of
    /// threads the host makes available.
    pub fn worker_threads(&self, available_threads: usize) -> usize {
        let limits = WorkerThreadLimits::default();
        match self {
            DriveType::Ssd => available_threads,
            DriveType::Hdd => available_threads.min(limits.hdd_max),
            DriveType::Network => limits.floor,
            DriveType::Unknown => available_threads.min(limits.unknown_max),
        }
    }

    pub fn is_hdd(&self) -> bool {
        matches!(self, DriveType::Hdd)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, DriveType::Network)
    }
}

/// Detect the drive type backing `path`.
pub fn drive_type_for_path(path: &Path) -> DriveType {
    #[cfg(target_os = "macos")]
    {
        macos::detect(path)
    }
    #[cfg(target_os = "linux")]
    {
        linux::detect(path)
    }
    #[cfg(target_os = "windows")]
    {
        windows::detect(path)
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        log::debug!("unsupported platform for drive detection: {}", path.display());
        DriveType::Unknown
    }
}

/// Enumerate mountable roots on the host (C8). Pure function; no state. On
/// a letter-drive OS, probes `A:` through `Z:` and keeps the ones that
/// exist; elsewhere returns the single root `/`.
pub fn all_drives() -> Vec<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        (b'A'..=b'Z')
            .filter_map(|letter| {
                let root = PathBuf::from(format!("{}:\\", letter as char));
                root.exists().then_some(root)
            })
            .collect()
    }
    #[cfg(not(target_os = "windows"))]
    {
        vec![PathBuf::from("/")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_drives_returns_at_least_one_reachable_root() {
        let drives = all_drives();
        assert!(!drives.is_empty());
        assert!(drives.iter().all(|d| d.exists()));
    }

    #[test]
    fn worker_threads_caps_hdd_below_available() {
        let available = 16;
        assert!(DriveType::Hdd.worker_threads(available) <= available);
        assert_eq!(DriveType::Network.worker_threads(available), WorkerThreadLimits::FLOOR_THREADS);
    }
}
