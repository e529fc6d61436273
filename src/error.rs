//! Public error taxonomy.
//!
//! Per-file I/O errors encountered during a walk and cache I/O errors are
//! never surfaced as [`EngineError`] — they are logged and the offending
//! file/cache entry is skipped. Only a bad root or a cancelled run reach the
//! caller as an error.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum EngineError {
    RootInvalid(PathBuf, String),
    Cancelled,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::RootInvalid(path, reason) => {
                write!(f, "invalid root {}: {}", path.display(), reason)
            }
            EngineError::Cancelled => write!(f, "operation cancelled"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Errors surfaced by the trash collaborator (UI-facing, not part of
/// [`EngineError`] since deletion is never performed by the core engine).
#[derive(Debug)]
pub enum TrashError {
    NotFound(PathBuf),
    PermissionDenied(PathBuf),
    Other(String),
}

impl fmt::Display for TrashError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrashError::NotFound(p) => write!(f, "not found: {}", p.display()),
            TrashError::PermissionDenied(p) => write!(f, "permission denied: {}", p.display()),
            TrashError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for TrashError {}
