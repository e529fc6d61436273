//! Progress reporting abstraction (spec §9 design note): a small trait
//! instead of the teacher's boxed-closure callbacks, so a caller (CLI or
//! GUI) can implement one type and pass `&dyn EngineProgress` everywhere.

use std::path::Path;

/// Which phase of the duplicate pipeline a hash-phase update belongs to.
/// `Small` marks the small-file-promotion path (quick hash promoted
/// directly to full hash, spec.md §4.5 phase 3) so a caller can tell it
/// apart from a genuine full-content read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashPhase {
    Quick,
    Full,
    Small,
}

pub trait EngineProgress: Send + Sync {
    /// Called every [`crate::config::PROGRESS_STRIDE`] files during
    /// enumeration. `path` is the most recently observed file.
    fn on_enum(&self, files_scanned: usize, path: &Path);

    /// Called periodically during a hash phase, reporting `done` of `total`
    /// submitted tasks completed so far and the most recently finished
    /// path.
    fn on_hash_phase(&self, phase: HashPhase, done: usize, total: usize, path: &Path);
}

/// A no-op implementation for callers that don't want progress reporting.
pub struct NullProgress;

impl EngineProgress for NullProgress {
    fn on_enum(&self, _files_scanned: usize, _path: &Path) {}
    fn on_hash_phase(&self, _phase: HashPhase, _done: usize, _total: usize, _path: &Path) {}
}
