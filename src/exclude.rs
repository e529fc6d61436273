//! Exclusion policy (C1): static, case-insensitive, per-path-component
//! matching against directory names, file names, and extensions known to
//! be system-critical or otherwise unsafe to walk into.

use std::path::Path;

/// Directory component names never descended into.
pub const EXCLUDED_DIR_NAMES: &[&str] = &[
    "windows",
    "system32",
    "syswow64",
    "winnt",
    "program files",
    "program files (x86)",
    "programdata",
    "appdata",
    "$recycle.bin",
    "system volume information",
    "recovery",
    "boot",
    "windows.old",
    "perflogs",
    "$windows.~bt",
    "$windows.~ws",
    "node_modules",
    ".git",
    ".svn",
    ".hg",
];

/// Exact file names never included, regardless of extension.
pub const EXCLUDED_FILE_NAMES: &[&str] = &[
    // virtual memory / hibernation
    "pagefile.sys",
    "hiberfil.sys",
    "swapfile.sys",
    // boot loaders
    "bootmgr",
    "bootnxt",
    "ntldr",
    // NTFS metafiles
    "$mft",
    "$mftmirr",
    "$logfile",
    "$volume",
    "$bitmap",
    "$boot",
    "$badclus",
    "$secure",
    "$upcase",
    "$extend",
    "$attrdef",
    // registry hives
    "sam",
    "security",
    "software",
    "system",
    "default",
    "ntuser.dat",
    // shell metadata
    "desktop.ini",
    "thumbs.db",
    "iconcache.db",
];

/// Extensions never included (dangerous or meaningless to hash: device
/// drivers, swap files, OS images).
pub const EXCLUDED_EXTENSIONS: &[&str] = &[".sys", ".drv"];

/// Whether `name` (a single path component, not a full path) is an
/// excluded directory name.
pub fn is_excluded_dir_name(name: &str) -> bool {
    EXCLUDED_DIR_NAMES
        .iter()
        .any(|ex| ex.eq_ignore_ascii_case(name))
}

/// Whether `path`'s file name and extension pass the exclusion policy.
/// Operates on the file name component only — never substring-matches
/// against the full path.
pub fn is_excluded_file(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return true;
    };
    if EXCLUDED_FILE_NAMES.iter().any(|ex| ex.eq_ignore_ascii_case(name)) {
        return true;
    }
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let dotted = format!(".{ext}");
        if EXCLUDED_EXTENSIONS
            .iter()
            .any(|ex| ex.eq_ignore_ascii_case(&dotted))
        {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn excludes_known_dir_names_case_insensitively() {
        assert!(is_excluded_dir_name("Node_Modules"));
        assert!(is_excluded_dir_name(".git"));
        assert!(!is_excluded_dir_name("Documents"));
    }

    #[test]
    fn excludes_system_files_and_extensions() {
        assert!(is_excluded_file(&PathBuf::from("/c/pagefile.sys")));
        assert!(is_excluded_file(&PathBuf::from("/c/driver.SYS")));
        assert!(!is_excluded_file(&PathBuf::from("/c/photo.jpg")));
    }

    #[test]
    fn never_matches_on_directory_component_of_path() {
        // A file literally named like an excluded dir should still be judged
        // on its own name, not excluded by a parent directory appearing in
        // the joined path string.
        assert!(!is_excluded_file(&PathBuf::from("/home/user/notes.txt")));
    }
}
