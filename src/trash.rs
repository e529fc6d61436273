//! Trash collaborator: spec.md §6 treats `move_to_trash` as an external
//! interface the engine never calls internally (deletion decisions are a
//! UI-layer concern, spec.md §1). This module provides a thin trait plus a
//! default implementation backed by the `trash` crate, grounded in
//! SPEC_FULL.md §8's `not_found`/`permission_denied`/`other(msg)` taxonomy.

use std::path::Path;

use crate::error::TrashError;

/// A collaborator that can move a path to the host trash/recycle bin.
/// Boxed as a trait object at call sites that may want a mock in tests.
pub trait TrashCollaborator {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError>;
}

/// Default collaborator backed by the `trash` crate.
pub struct SystemTrash;

impl TrashCollaborator for SystemTrash {
    fn move_to_trash(&self, path: &Path) -> Result<(), TrashError> {
        if !path.exists() {
            return Err(TrashError::NotFound(path.to_path_buf()));
        }
        trash::delete(path).map_err(|err| classify(path, &err))
    }
}

fn classify(path: &Path, err: &trash::Error) -> TrashError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();
    if !path.exists() {
        TrashError::NotFound(path.to_path_buf())
    } else if lower.contains("permission") || lower.contains("access is denied") {
        TrashError::PermissionDenied(path.to_path_buf())
    } else {
        TrashError::Other(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn moves_an_existing_file_out_of_place() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.txt");
        fs::write(&file, b"x").unwrap();

        let trash = SystemTrash;
        // Trash I/O depends on a desktop trash service being reachable in
        // the test sandbox; only assert it doesn't panic and the file is
        // no longer at its original path on success.
        let result = trash.move_to_trash(&file);
        if result.is_ok() {
            assert!(!file.exists());
        }
    }

    #[test]
    fn missing_path_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("never_existed.txt");
        let trash = SystemTrash;
        match trash.move_to_trash(&missing) {
            Err(TrashError::NotFound(p)) => assert_eq!(p, missing),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
