//! fbackup: packages source trees into filtered, compressed archives.
//!
//! This crate provides the selection engine (rule matching, size limits,
//! profiles and their routing), collision-safe archive naming, the archive
//! builder and the sequential run orchestrator behind the `fbk` CLI.

pub mod archive;
pub mod commands;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod matcher;
pub mod naming;
pub mod orchestrator;
pub mod path_util;
pub mod profile;
pub mod router;
pub mod size_gate;
pub mod sources;
pub mod sysexits;

/// Unified result type for all fallible operations in fbackup.
pub type Result<T> = std::result::Result<T, error::BackupError>;
