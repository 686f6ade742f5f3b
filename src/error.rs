//! Error taxonomy for a backup run.
//!
//! Every variant is fatal for the run that raised it. Recoverable conditions
//! (size warnings, unclassified entry kinds) never surface as errors; they are
//! absorbed where they are detected and reported through counters and the log.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::sysexits;

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("No backup sources found. Add source paths to the configuration or the command line.")]
    NoSourcesFound,

    #[error("Could not create path {}: {source}", .path.display())]
    WorkingDirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("File {}, size {size} > max size {limit}", .path.display())]
    SizeLimitExceeded { path: PathBuf, size: u64, limit: u64 },

    #[error("Invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Association refers to unknown profile '{profile}'")]
    UnknownProfile { profile: String },

    #[error("Invalid profile: {reason}")]
    InvalidProfile { reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl BackupError {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            BackupError::NoSourcesFound => sysexits::EX_NOINPUT,
            BackupError::WorkingDirectoryUnavailable { .. } => sysexits::EX_CANTCREAT,
            BackupError::SizeLimitExceeded { .. } => sysexits::EX_DATAERR,
            BackupError::InvalidPattern { .. }
            | BackupError::UnknownProfile { .. }
            | BackupError::InvalidProfile { .. }
            | BackupError::Config(_) => sysexits::EX_CONFIG,
            BackupError::Io(_) | BackupError::Walk(_) => sysexits::EX_IOERR,
        }
    }
}
