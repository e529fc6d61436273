//! Type predicate (C7): classification over the walker (C2) by extension,
//! grouped into disjoint categories. First match wins in declared order, so
//! a file can belong to at most one category even if an extension were
//! (accidentally) listed twice.

use std::path::PathBuf;

use crate::cancel::CancelToken;
use crate::error::EngineError;
use crate::progress::EngineProgress;
use crate::types::FileInfo;
use crate::walk::walk_roots;

/// One extension-set category, in declared (first-match-wins) order.
pub struct TypeCategory {
    pub key: &'static str,
    pub label: &'static str,
    pub extensions: &'static [&'static str],
    /// Flagged at the interface boundary: deletion here is safe but
    /// user-sensitive (spec.md §4.6).
    pub advanced: bool,
}

impl TypeCategory {
    pub fn is_advanced(&self) -> bool {
        self.advanced
    }
}

/// Built-in categories, documents-first, temporary-files flagged advanced.
pub const CATEGORIES: &[TypeCategory] = &[
    TypeCategory {
        key: "documents",
        label: "Documents",
        extensions: &[
            ".doc", ".docx", ".pdf", ".txt", ".rtf", ".odt", ".xls", ".xlsx", ".ppt", ".pptx",
            ".csv", ".md",
        ],
        advanced: false,
    },
    TypeCategory {
        key: "images",
        label: "Images",
        extensions: &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".webp", ".svg", ".heic", ".raw",
        ],
        advanced: false,
    },
    TypeCategory {
        key: "videos",
        label: "Videos",
        extensions: &[
            ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".mpg", ".mpeg",
        ],
        advanced: false,
    },
    TypeCategory {
        key: "audio",
        label: "Audio",
        extensions: &[
            ".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a", ".opus",
        ],
        advanced: false,
    },
    TypeCategory {
        key: "archives",
        label: "Archives",
        extensions: &[
            ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".iso",
        ],
        advanced: false,
    },
    TypeCategory {
        key: "executables",
        label: "Executables",
        extensions: &[".exe", ".msi", ".app", ".dmg", ".deb", ".rpm", ".appimage"],
        advanced: false,
    },
    TypeCategory {
        key: "temporary",
        label: "Temporary Files",
        extensions: &[".tmp", ".temp", ".bak", ".cache", ".log", ".old", ".~"],
        advanced: true,
    },
];

fn category_by_key(key: &str) -> Option<&'static TypeCategory> {
    CATEGORIES.iter().find(|c| c.key == key)
}

/// Find every file under `roots` whose extension belongs to one of
/// `category_keys`'s extension sets. Each returned [`FileInfo`] is tagged
/// with its matching category's label via `group_label` (first match in
/// [`CATEGORIES`] declaration order wins).
pub fn find_by_type(
    roots: &[PathBuf],
    category_keys: &[&str],
    cancel: &CancelToken,
    progress: &dyn EngineProgress,
) -> Result<Vec<FileInfo>, EngineError> {
    let selected: Vec<&TypeCategory> = category_keys
        .iter()
        .filter_map(|k| category_by_key(k))
        .collect();

    let (found, failures) = walk_roots(roots, 0, u64::MAX, cancel, progress)?;
    for f in &failures {
        log::warn!("root invalid, skipped: {} ({})", f.root.display(), f.reason);
    }

    let mut out = Vec::new();
    for mut info in found {
        if let Some(cat) = selected.iter().find(|c| c.extensions.contains(&info.extension.as_str())) {
            info.group_label = Some(cat.label.to_string());
            out.push(info);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use std::fs;

    #[test]
    fn categories_are_disjoint_by_construction() {
        let mut seen = std::collections::HashSet::new();
        for cat in CATEGORIES {
            for ext in cat.extensions {
                assert!(seen.insert(*ext), "extension {ext} appears in more than one category");
            }
        }
    }

    #[test]
    fn finds_only_selected_category_extensions() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("photo.jpg"), b"x").unwrap();
        fs::write(dir.path().join("movie.mp4"), b"x").unwrap();
        fs::write(dir.path().join("notes.txt"), b"x").unwrap();

        let cancel = CancelToken::new();
        let roots = vec![dir.path().to_path_buf()];
        let found = find_by_type(&roots, &["images"], &cancel, &NullProgress).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "photo.jpg");
        assert_eq!(found[0].group_label.as_deref(), Some("Images"));
    }

    #[test]
    fn temporary_files_category_is_flagged_advanced() {
        let temp = category_by_key("temporary").unwrap();
        assert!(temp.is_advanced());
        let docs = category_by_key("documents").unwrap();
        assert!(!docs.is_advanced());
    }
}
