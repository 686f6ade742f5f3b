//! Log stream setup: the console, or a log file inside the working directory.

use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode, WriteLogger};

use crate::Result;
use crate::config::Settings;
use crate::constants::LOG_FILE_PREFIX;
use crate::error::BackupError;

/// `fileBackup_Log_<timestamp>.log`
pub fn log_file_name(timestamp: &str) -> String {
    format!("{LOG_FILE_PREFIX}_{timestamp}.log")
}

/// Colors only when stdout is a terminal.
pub fn color_choice(is_terminal: bool) -> ColorChoice {
    if is_terminal {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    }
}

pub fn level_filter(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Installs the global logger. Returns the log file when output is redirected.
///
/// # Errors
/// Fails when the log file cannot be created or a logger is already installed.
pub fn init(settings: &Settings, working_dir: &Path, timestamp: &str) -> Result<Option<PathBuf>> {
    let level = level_filter(settings.verbose);
    if settings.log_to_file {
        let path = working_dir.join(log_file_name(timestamp));
        let file = File::create(&path)?;
        let config = ConfigBuilder::new()
            .set_target_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .build();
        WriteLogger::init(level, config, file).map_err(logger_error)?;
        Ok(Some(path))
    } else {
        let config = ConfigBuilder::new()
            .set_time_level(LevelFilter::Off)
            .set_target_level(LevelFilter::Off)
            .set_thread_level(LevelFilter::Off)
            .set_location_level(LevelFilter::Off)
            .set_level_padding(simplelog::LevelPadding::Off)
            .build();
        let color = color_choice(io::stdout().is_terminal());
        TermLogger::init(level, config, TerminalMode::Mixed, color).map_err(logger_error)?;
        Ok(None)
    }
}

fn logger_error(e: log::SetLoggerError) -> BackupError {
    BackupError::Config(format!("cannot install logger: {e}"))
}
