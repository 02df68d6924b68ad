use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

use super::error::DiscoveryError;

/// Spreadsheet extensions picked up by discovery (matched case-insensitively)
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["xlsx", "xls"];

/// Check a path's extension against the allow-list
pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
}

/// Files found under a root, plus the subtrees that could not be walked
#[derive(Debug, Default)]
pub struct Discovery {
    pub files: Vec<PathBuf>,
    pub errors: Vec<String>,
}

/// Recursively collect every spreadsheet file under `root`
///
/// Entries that cannot be read are recorded in `errors` and skipped; the walk
/// itself never aborts. Only a missing or non-directory root is fatal.
pub fn discover(root: &Path) -> Result<Discovery, DiscoveryError> {
    if !root.exists() {
        return Err(DiscoveryError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(DiscoveryError::NotADirectory(root.to_path_buf()));
    }

    let mut discovery = Discovery::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                if is_file_entry(&entry) && has_supported_extension(entry.path()) {
                    discovery.files.push(entry.into_path());
                }
            }
            Err(e) => {
                let location = e
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| root.display().to_string());
                warn!(path = %location, error = %e, "Cannot access directory entry, skipping");
                discovery
                    .errors
                    .push(format!("Cannot access {}: {}", location, e));
            }
        }
    }

    debug!(
        root = %root.display(),
        files = discovery.files.len(),
        errors = discovery.errors.len(),
        "Discovery complete"
    );

    Ok(discovery)
}

/// Regular files, and symlinks that resolve to one
///
/// Symlinked directories are not descended into.
fn is_file_entry(entry: &DirEntry) -> bool {
    let file_type = entry.file_type();
    if file_type.is_file() {
        return true;
    }
    file_type.is_symlink() && std::fs::metadata(entry.path()).is_ok_and(|meta| meta.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn finds_spreadsheets_at_any_depth() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("group_a").join("week_1");
        fs::create_dir_all(&nested).unwrap();

        fs::write(dir.path().join("top.xlsx"), b"").unwrap();
        fs::write(dir.path().join("group_a").join("legacy.XLS"), b"").unwrap();
        fs::write(nested.join("deep.Xlsx"), b"").unwrap();
        fs::write(nested.join("notes.txt"), b"").unwrap();
        fs::write(nested.join("data.csv"), b"").unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.files.len(), 3);
        assert!(found.errors.is_empty());
        assert!(found.files.iter().all(|p| has_supported_extension(p)));
    }

    #[test]
    fn empty_tree_is_not_an_error() {
        let dir = tempdir().unwrap();
        let found = discover(dir.path()).unwrap();
        assert!(found.files.is_empty());
    }

    #[test]
    fn directories_named_like_spreadsheets_are_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("folder.xlsx")).unwrap();
        let found = discover(dir.path()).unwrap();
        assert!(found.files.is_empty());
    }

    #[test]
    fn missing_root_is_fatal() {
        let dir = tempdir().unwrap();
        let result = discover(&dir.path().join("nope"));
        assert!(matches!(result, Err(DiscoveryError::RootNotFound(_))));
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(has_supported_extension(Path::new("a.XLSX")));
        assert!(has_supported_extension(Path::new("a.xls")));
        assert!(!has_supported_extension(Path::new("a.xlsm")));
        assert!(!has_supported_extension(Path::new("xlsx")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_spreadsheets_are_included() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let elsewhere = tempdir().unwrap();
        let target = elsewhere.path().join("real.xlsx");
        fs::write(&target, b"").unwrap();
        symlink(&target, dir.path().join("linked.xlsx")).unwrap();
        symlink(dir.path().join("missing.xlsx"), dir.path().join("dangling.xlsx")).unwrap();
        symlink(elsewhere.path(), dir.path().join("linked_dir")).unwrap();

        let found = discover(dir.path()).unwrap();
        assert_eq!(found.files, vec![dir.path().join("linked.xlsx")]);
        assert!(found.errors.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subtree_is_recorded_and_walk_continues() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        let open = dir.path().join("open");
        fs::create_dir_all(&locked).unwrap();
        fs::create_dir_all(&open).unwrap();
        fs::write(locked.join("hidden.xlsx"), b"").unwrap();
        fs::write(open.join("visible.xlsx"), b"").unwrap();
        fs::write(dir.path().join("top.xlsx"), b"").unwrap();

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        // Permission bits do not bind a privileged user
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let found = discover(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        let found = found.unwrap();

        assert_eq!(
            found.files,
            vec![open.join("visible.xlsx"), dir.path().join("top.xlsx")]
        );
        assert_eq!(found.errors.len(), 1);
        assert!(found.errors[0].starts_with("Cannot access "));
        assert!(found.errors[0].contains("locked"));
    }
}
