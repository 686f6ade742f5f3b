//! Where the list of source paths comes from.
//!
//! Resolving platform bookmark records is someone else's job; this crate only
//! needs an ordered list of absolute paths, duplicates allowed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::error::BackupError;
use crate::path_util;

/// Supplies the ordered list of source paths for a run.
pub trait SourceProvider {
    fn sources(&self) -> Result<Vec<PathBuf>>;
}

/// A fixed list, typically from the configuration file and command line.
#[derive(Debug, Clone, Default)]
pub struct StaticSources(pub Vec<PathBuf>);

impl SourceProvider for StaticSources {
    fn sources(&self) -> Result<Vec<PathBuf>> {
        Ok(self.0.clone())
    }
}

/// A text file with one path per line. Blank lines and `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct ListFileSources {
    path: PathBuf,
}

impl ListFileSources {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SourceProvider for ListFileSources {
    fn sources(&self) -> Result<Vec<PathBuf>> {
        let text = fs::read_to_string(&self.path).map_err(|e| {
            BackupError::Config(format!(
                "cannot read source list {}: {e}",
                self.path.display()
            ))
        })?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(PathBuf::from)
            .collect())
    }
}

/// Concatenates several providers in order.
pub struct ChainedSources(pub Vec<Box<dyn SourceProvider>>);

impl SourceProvider for ChainedSources {
    fn sources(&self) -> Result<Vec<PathBuf>> {
        let mut all = vec![];
        for provider in &self.0 {
            all.extend(provider.sources()?);
        }
        Ok(all)
    }
}

/// Collects the sources as normalized absolute paths and fails with
/// [`BackupError::NoSourcesFound`] when there are none.
pub fn collect(provider: &dyn SourceProvider) -> Result<Vec<PathBuf>> {
    let sources = provider
        .sources()?
        .iter()
        .map(|path| absolutize(path))
        .collect::<Result<Vec<_>>>()?;
    if sources.is_empty() {
        return Err(BackupError::NoSourcesFound);
    }
    Ok(sources)
}

/// Makes a path absolute against the current directory, resolving `.` and
/// `..` lexically.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path_util::normalize(path))
    } else {
        Ok(path_util::normalize(&std::env::current_dir()?.join(path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_file() {
        let temp = tempfile::tempdir().unwrap();
        let list = temp.path().join("sources.txt");
        fs::write(&list, "# bookmarks\n/a/Projects\n\n  /b/Projects  \n/a/Projects\n").unwrap();
        let sources = ListFileSources::new(&list).sources().unwrap();
        assert_eq!(
            sources,
            vec![
                PathBuf::from("/a/Projects"),
                PathBuf::from("/b/Projects"),
                PathBuf::from("/a/Projects"),
            ]
        );
    }

    #[test]
    fn test_missing_list_file() {
        let err = ListFileSources::new("/definitely/not/here.txt")
            .sources()
            .unwrap_err();
        assert!(matches!(err, BackupError::Config(_)));
    }

    #[test]
    fn test_chained_and_empty() {
        let chained = ChainedSources(vec![
            Box::new(StaticSources(vec![PathBuf::from("/x")])),
            Box::new(StaticSources(vec![PathBuf::from("/y")])),
        ]);
        assert_eq!(collect(&chained).unwrap().len(), 2);
        assert!(matches!(
            collect(&StaticSources::default()),
            Err(BackupError::NoSourcesFound)
        ));
    }

    #[test]
    fn test_absolutize() {
        let abs = absolutize(Path::new("rel/dir")).unwrap();
        assert!(abs.is_absolute());
        assert!(abs.ends_with("rel/dir"));
        assert_eq!(
            absolutize(Path::new("/a/Parent/Child/..")).unwrap(),
            PathBuf::from("/a/Parent")
        );
    }

    #[test]
    fn test_relative_list_lines_become_absolute() {
        let temp = tempfile::tempdir().unwrap();
        let list = temp.path().join("sources.txt");
        fs::write(&list, ".\nDocs/../Music\n/abs/Projects\n").unwrap();
        let cwd = std::env::current_dir().unwrap();
        let sources = collect(&ListFileSources::new(&list)).unwrap();
        assert_eq!(
            sources,
            vec![
                path_util::normalize(&cwd),
                cwd.join("Music"),
                PathBuf::from("/abs/Projects"),
            ]
        );
        assert!(sources.iter().all(|p| p.is_absolute()));
    }
}
