//! Walks one source tree and streams the admitted entries into a `.tar.gz`.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use flate2::{Compression, write::GzEncoder};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::Result;
use crate::error::BackupError;
use crate::profile::{Entry, EntryKind, NonRegularPolicy, Profile};

/// Supported gzip compression levels.
#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Fastest,
    Faster,
    #[default]
    Default,
    Better,
    Best,
}

impl From<Level> for Compression {
    fn from(level: Level) -> Self {
        match level {
            Level::Fastest => Compression::fast(),
            Level::Faster => Compression::new(3),
            Level::Default => Compression::default(),
            Level::Better => Compression::new(7),
            Level::Best => Compression::best(),
        }
    }
}

/// Counters for one finished archive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveStats {
    pub entries_written: u64,
    /// Size warnings raised while building this archive.
    pub warnings: u64,
}

/// Builds one archive per call, filtering entries through an optional profile.
#[derive(Debug, Clone, Copy)]
pub struct ArchiveBuilder<'a> {
    profile: Option<&'a Profile>,
    non_regular: NonRegularPolicy,
    level: Level,
}

impl<'a> ArchiveBuilder<'a> {
    pub fn new(profile: Option<&'a Profile>, non_regular: NonRegularPolicy) -> Self {
        Self {
            profile,
            non_regular,
            level: Level::Default,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Archives `source` into `output`, storing its root as `root_label`.
    ///
    /// The archive is finalized on every path, including when a size limit
    /// aborts the walk; the walk error is the one reported.
    ///
    /// # Errors
    /// [`BackupError::SizeLimitExceeded`] when a file exceeds the profile's
    /// hard limit, or any I/O error from walking or writing.
    pub fn build(&self, source: &Path, root_label: &str, output: &Path) -> Result<ArchiveStats> {
        let file = File::create(output)?;
        let encoder = GzEncoder::new(file, self.level.into());
        let mut tar = tar::Builder::new(encoder);
        tar.follow_symlinks(false);

        let warnings_before = self.profile.map_or(0, Profile::warn_count);
        let written = self.append_tree(&mut tar, source, root_label);
        let closed = tar.into_inner().and_then(GzEncoder::finish);

        let entries_written = written?;
        closed?.flush()?;
        Ok(ArchiveStats {
            entries_written,
            warnings: self.profile.map_or(0, Profile::warn_count) - warnings_before,
        })
    }

    fn append_tree<W: Write>(
        &self,
        tar: &mut tar::Builder<W>,
        source: &Path,
        root_label: &str,
    ) -> Result<u64> {
        let mut written = 0;
        let mut walker = WalkDir::new(source)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry?;
            let arc_path = archive_path(root_label, source, entry.path())?;
            let name = entry_name(&arc_path);
            let kind = entry_kind(entry.file_type());
            let size = match kind {
                EntryKind::File => entry.metadata()?.len(),
                _ => 0,
            };
            let visited = Entry {
                name: &name,
                path: entry.path(),
                kind,
                size,
            };

            debug!("Filter on {name}");
            if !admit(&visited, entry.depth() == 0, self.profile, self.non_regular)? {
                if kind == EntryKind::Directory {
                    walker.skip_current_dir();
                }
                continue;
            }

            match kind {
                EntryKind::Directory => tar.append_dir(&arc_path, entry.path())?,
                EntryKind::File => tar.append_path_with_name(entry.path(), &arc_path)?,
                EntryKind::Other => {
                    if let Err(e) = tar.append_path_with_name(entry.path(), &arc_path) {
                        warn!(" WARN: Could not archive {}: {e}", entry.path().display());
                        continue;
                    }
                }
            }
            written += 1;
        }
        Ok(written)
    }
}

/// Per-entry admission: the root always passes, entries without a profile
/// pass by default, everything else defers to the profile.
pub fn admit(
    entry: &Entry<'_>,
    is_root: bool,
    profile: Option<&Profile>,
    non_regular: NonRegularPolicy,
) -> Result<bool> {
    if is_root {
        debug!(" INCLUDE: Always match root folder {}", entry.name);
        return Ok(true);
    }
    match profile {
        Some(profile) => profile.should_include(entry, non_regular),
        None => {
            debug!(" INCLUDE: default action");
            Ok(true)
        }
    }
}

fn entry_kind(file_type: std::fs::FileType) -> EntryKind {
    if file_type.is_file() {
        EntryKind::File
    } else if file_type.is_dir() {
        EntryKind::Directory
    } else {
        EntryKind::Other
    }
}

/// Replaces the source root with `root_label`.
fn archive_path(root_label: &str, source: &Path, path: &Path) -> Result<PathBuf> {
    let rel = path.strip_prefix(source).map_err(|_| {
        BackupError::Io(io::Error::other(format!(
            "{} is not inside {}",
            path.display(),
            source.display()
        )))
    })?;
    let mut arc_path = PathBuf::from(root_label);
    if !rel.as_os_str().is_empty() {
        arc_path.push(rel);
    }
    Ok(arc_path)
}

/// `/`-separated form of an archive path, as matched by the profile rules.
fn entry_name(arc_path: &Path) -> String {
    arc_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
