use crate::error::BackupError;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Creates `path` and any missing parents.
///
/// # Errors
/// Returns [`BackupError::WorkingDirectoryUnavailable`] naming the path when
/// it cannot be created.
pub fn create_path(path: &Path) -> Result<(), BackupError> {
    fs::create_dir_all(path).map_err(|source| BackupError::WorkingDirectoryUnavailable {
        path: path.to_path_buf(),
        source,
    })
}

/// Lexically normalizes `path`: `.` is dropped and `..` pops the previous
/// component. The filesystem is not consulted.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(normalized.components().next_back(), Some(Component::Normal(_))) {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Returns the last segment of the normalized `path`, or `root` for a
/// filesystem root.
pub fn root_folder_name(path: &Path) -> String {
    match normalize(path).components().next_back() {
        Some(Component::Normal(name)) => name.to_string_lossy().into_owned(),
        _ => "root".to_string(),
    }
}

/// Directory that receives the archives and the log of one run:
/// `<output_root>/<machine_id>/<timestamp>`.
pub fn working_dir(output_root: &Path, machine_id: &str, timestamp: &str) -> PathBuf {
    output_root.join(machine_id).join(timestamp)
}

/// Host name used to key the working directory.
pub fn machine_id() -> String {
    let name = gethostname::gethostname();
    let name = name.to_string_lossy();
    let name = name.trim();
    if name.is_empty() {
        "localhost".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_folder_name() {
        assert_eq!(root_folder_name(Path::new("/a/b/Projects")), "Projects");
        assert_eq!(root_folder_name(Path::new("/a/b/Projects/")), "Projects");
        assert_eq!(root_folder_name(Path::new("/a/b/Proj.folder/.")), "Proj.folder");
        assert_eq!(root_folder_name(Path::new("/")), "root");
        assert_eq!(root_folder_name(Path::new("/a/b/..")), "a");
        assert_eq!(root_folder_name(Path::new("/a/b/../c/./")), "c");
        assert_eq!(root_folder_name(Path::new("/..")), "root");
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/b/../c/.")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/a/../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_working_dir_layout() {
        let dir = working_dir(Path::new("/out"), "ipad", "20211001-101010");
        assert_eq!(dir, PathBuf::from("/out/ipad/20211001-101010"));
    }

    #[test]
    fn test_create_path() {
        let temp = tempfile::tempdir().unwrap();
        let nested = temp.path().join("a").join("b");
        create_path(&nested).unwrap();
        assert!(nested.is_dir());
        // existing directories are fine
        create_path(&nested).unwrap();
    }

    #[test]
    fn test_create_path_under_file_fails() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("file");
        fs::write(&file, b"x").unwrap();
        let err = create_path(&file.join("sub")).unwrap_err();
        assert!(matches!(err, BackupError::WorkingDirectoryUnavailable { .. }));
    }

    #[test]
    fn test_machine_id_is_host_name() {
        let id = machine_id();
        assert!(!id.is_empty());
        assert_eq!(id, id.trim());
        let host = gethostname::gethostname();
        if !host.is_empty() {
            assert_eq!(id, host.to_string_lossy().trim());
        }
    }
}
