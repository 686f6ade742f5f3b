//! Backup profiles: the named rule bundle that governs one backup target.

use std::cell::Cell;
use std::path::Path;

use log::{debug, warn};

use crate::error::BackupError;
use crate::matcher::{self, PatternSet};
use crate::size_gate::{self, SizeCheck};

/// Kind of a filesystem entry observed during a tree walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
    /// Symlinks, devices, sockets, fifos.
    Other,
}

/// A single entry visited while walking a source tree.
#[derive(Debug, Clone, Copy)]
pub struct Entry<'a> {
    /// Archive-relative name, `/`-separated, starting with the root label.
    pub name: &'a str,
    /// Location on disk, used in error reports.
    pub path: &'a Path,
    pub kind: EntryKind,
    /// Byte size; only meaningful for files.
    pub size: u64,
}

/// What to do with entries that are neither regular files nor directories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonRegularPolicy {
    #[default]
    Exclude,
    Include,
}

impl NonRegularPolicy {
    pub fn from_include_flag(include: bool) -> Self {
        if include {
            NonRegularPolicy::Include
        } else {
            NonRegularPolicy::Exclude
        }
    }
}

/// Inclusion rules and size thresholds for one logical backup target.
///
/// The warning counter lives on the profile and accumulates across every
/// source the profile governs; it is reset only by building a new profile.
/// Runs are single-threaded, so a `Cell` is enough to count through `&self`.
#[derive(Debug, Default)]
pub struct Profile {
    name: String,
    allowed_files: PatternSet,
    banned_files: PatternSet,
    allowed_dirs: PatternSet,
    banned_dirs: PatternSet,
    max_size_warn: Option<u64>,
    max_size_fail: Option<u64>,
    warn_count: Cell<u64>,
}

impl Profile {
    /// Creates an unrestricted profile. The name must not be empty.
    pub fn new(name: impl Into<String>) -> Result<Self, BackupError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(BackupError::InvalidProfile {
                reason: "profile name must not be empty".to_string(),
            });
        }
        Ok(Self {
            name,
            ..Self::default()
        })
    }

    pub fn with_allowed_files(mut self, patterns: PatternSet) -> Self {
        self.allowed_files = patterns;
        self
    }

    pub fn with_banned_files(mut self, patterns: PatternSet) -> Self {
        self.banned_files = patterns;
        self
    }

    pub fn with_allowed_dirs(mut self, patterns: PatternSet) -> Self {
        self.allowed_dirs = patterns;
        self
    }

    pub fn with_banned_dirs(mut self, patterns: PatternSet) -> Self {
        self.banned_dirs = patterns;
        self
    }

    pub fn with_max_size_warn(mut self, limit: Option<u64>) -> Self {
        self.max_size_warn = limit;
        self
    }

    pub fn with_max_size_fail(mut self, limit: Option<u64>) -> Self {
        self.max_size_fail = limit;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_size_warn(&self) -> Option<u64> {
        self.max_size_warn
    }

    pub fn max_size_fail(&self) -> Option<u64> {
        self.max_size_fail
    }

    /// Number of files seen so far above the warn threshold.
    pub fn warn_count(&self) -> u64 {
        self.warn_count.get()
    }

    /// Decides whether `entry` goes into the archive.
    ///
    /// Files pass the size gate first: exceeding the hard limit returns
    /// [`BackupError::SizeLimitExceeded`], exceeding the warn limit bumps the
    /// warning counter and continues with the pattern rules.
    pub fn should_include(
        &self,
        entry: &Entry<'_>,
        non_regular: NonRegularPolicy,
    ) -> Result<bool, BackupError> {
        match entry.kind {
            EntryKind::File => {
                match size_gate::check(entry.size, self.max_size_warn, self.max_size_fail) {
                    SizeCheck::Fail { limit } => {
                        return Err(BackupError::SizeLimitExceeded {
                            path: entry.path.to_path_buf(),
                            size: entry.size,
                            limit,
                        });
                    }
                    SizeCheck::Warn { limit } => {
                        warn!(
                            " WARN: File {} size {} > warn size {limit}",
                            entry.name, entry.size
                        );
                        self.warn_count.set(self.warn_count.get() + 1);
                    }
                    SizeCheck::Ok => {}
                }
                Ok(matcher::decide(entry.name, &self.allowed_files, &self.banned_files).is_include())
            }
            EntryKind::Directory => {
                Ok(matcher::decide(entry.name, &self.allowed_dirs, &self.banned_dirs).is_include())
            }
            EntryKind::Other => Ok(non_regular_decision(entry, non_regular)),
        }
    }
}

/// Applies the operator's policy to an entry that is neither a file nor a directory.
pub(crate) fn non_regular_decision(entry: &Entry<'_>, policy: NonRegularPolicy) -> bool {
    debug!(
        " WARN: Found something that is not a file or directory: {}",
        entry.path.display()
    );
    match policy {
        NonRegularPolicy::Exclude => {
            debug!(" EXCLUDE: Ignoring");
            false
        }
        NonRegularPolicy::Include => {
            debug!(" INCLUDE: Including");
            true
        }
    }
}
