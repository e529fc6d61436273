//! Core data types shared across the walker, hasher, cache, and pipeline.

use std::path::PathBuf;

/// A single file observed during a walk, carrying the `Metadata` snapshot
/// that every later stage reasons about. `size`/`mtime`/`ctime` are never
/// re-read once set here: a file that changes mid-run is diffed against
/// this snapshot, not against its current on-disk state.
#[derive(Debug, Clone, PartialEq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub name: String,
    pub size: u64,
    pub mtime: f64,
    pub ctime: f64,
    pub extension: String,
    pub quick_hash: Option<u64>,
    pub full_hash: Option<u64>,
    pub group_label: Option<String>,
}

impl FileInfo {
    pub fn from_metadata(path: PathBuf, metadata: &std::fs::Metadata) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = path
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        FileInfo {
            path,
            name,
            size: metadata.len(),
            mtime: system_time_to_secs(metadata.modified().ok()),
            ctime: system_time_to_secs(metadata.created().ok()),
            extension,
            quick_hash: None,
            full_hash: None,
            group_label: None,
        }
    }
}

fn system_time_to_secs(t: Option<std::time::SystemTime>) -> f64 {
    t.and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

/// Row shape of the persistent hash cache's `file_cache` table.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub path: String,
    pub size: i64,
    pub mtime: f64,
    pub quick_hash: String,
    pub full_hash: Option<String>,
    pub last_checked: f64,
}

/// A group of two or more files sharing a full content digest. Ephemeral:
/// never persisted, returned only from a single `find_duplicates` call.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateGroup {
    pub full_hash: u64,
    pub size: u64,
    pub files: Vec<FileInfo>,
}

/// Tie-breaking strategy for deciding which member of a duplicate group to
/// keep when the caller wants a delete candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeepStrategy {
    Newest,
    Oldest,
    FirstPath,
}

impl DuplicateGroup {
    /// Paths to discard under `strategy`, keeping exactly one member.
    pub fn candidates_to_remove(&self, strategy: KeepStrategy) -> Vec<PathBuf> {
        if self.files.len() <= 1 {
            return Vec::new();
        }
        let mut sorted: Vec<&FileInfo> = self.files.iter().collect();
        match strategy {
            KeepStrategy::Newest => sorted.sort_by(|a, b| b.mtime.total_cmp(&a.mtime)),
            KeepStrategy::Oldest => sorted.sort_by(|a, b| a.mtime.total_cmp(&b.mtime)),
            KeepStrategy::FirstPath => sorted.sort_by(|a, b| a.path.cmp(&b.path)),
        }
        sorted[1..].iter().map(|f| f.path.clone()).collect()
    }
}

/// Condition for the size predicate (C6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCondition {
    LargerThan,
    SmallerThan,
    Exactly,
}

/// Unit a size value is expressed in before conversion to bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    pub fn bytes_per_unit(self) -> u64 {
        match self {
            SizeUnit::B => 1,
            SizeUnit::KB => 1024,
            SizeUnit::MB => 1024 * 1024,
            SizeUnit::GB => 1024 * 1024 * 1024,
            SizeUnit::TB => 1024u64.pow(4),
        }
    }
}
