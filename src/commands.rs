//! Command-line interface definition for fbackup.
//!
//! This module defines the CLI commands and the glue that turns a parsed
//! command into a configured run: loading the configuration file, applying
//! overrides, preparing the working directory and the log stream, and
//! handing the source list to the orchestrator or the discovery report.

use crate::Result;
use crate::archive::Level;
use crate::config::{self, ConfigFile, Settings};
use crate::constants::TIMESTAMP_FORMAT;
use crate::discovery;
use crate::logging;
use crate::orchestrator::{Orchestrator, RunSummary};
use crate::path_util;
use crate::router::ProfileRouter;
use crate::sources::{self, ChainedSources, ListFileSources, SourceProvider, StaticSources};
use clap::{Args, Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;

/// Command-line interface definition for fbackup.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub commands: Option<Commands>,
}

/// Supported fbackup commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive every source path, one tar.gz per source.
    Run {
        #[command(flatten)]
        options: RunOptions,
        /// Only report what would be archived.
        #[arg(short = 'n', long)]
        dry_run: bool,
    },
    /// Report source paths, example archive names and sample children without archiving.
    Discover {
        #[command(flatten)]
        options: RunOptions,
    },
    /// Display the absolute path of the default configuration file.
    Config,
}

/// Options shared by `run` and `discover`; they override the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct RunOptions {
    /// Source paths, appended after the configured ones.
    pub sources: Vec<PathBuf>,
    /// Configuration file to use instead of the default one.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// File listing one source path per line.
    #[arg(short = 'f', long)]
    pub sources_file: Option<PathBuf>,
    /// Log every include/exclude decision.
    #[arg(short, long)]
    pub verbose: bool,
    /// Archive symlinks, devices and other non-regular entries.
    #[arg(long)]
    pub include_non_regular: bool,
    /// Log to the console instead of a file in the working directory.
    #[arg(long)]
    pub no_log_file: bool,
    /// Directory under which `<machine>/<timestamp>` is created.
    #[arg(short, long)]
    pub output_root: Option<PathBuf>,
    /// Machine identifier used in the working directory path.
    #[arg(long)]
    pub machine_id: Option<String>,
    /// Compression level.
    #[arg(short, long)]
    pub level: Option<Level>,
}

impl RunOptions {
    /// Loads the configuration file and applies the command-line overrides.
    pub fn load_config(&self) -> Result<ConfigFile> {
        let mut config = match &self.config {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::load_default()?,
        };
        config.verbose |= self.verbose;
        config.include_non_regular |= self.include_non_regular;
        if self.no_log_file {
            config.log_to_file = false;
        }
        if let Some(root) = &self.output_root {
            config.output_root = Some(root.clone());
        }
        if let Some(id) = &self.machine_id {
            config.machine_id = Some(id.clone());
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        if let Some(file) = &self.sources_file {
            config.sources_file = Some(file.clone());
        }
        config.sources.extend(self.sources.iter().cloned());
        Ok(config)
    }
}

/// Result of a `run` or `discover` invocation.
#[derive(Debug)]
pub enum Outcome {
    Backup(RunSummary),
    Discovery(Vec<discovery::SourceReport>),
}

/// Runs a backup (or discovery) with the merged configuration.
///
/// The working directory and the log stream are set up first, then the
/// source list is collected; any failure aborts the whole run.
///
/// # Errors
/// Returns the first fatal [`crate::error::BackupError`].
pub fn run(options: &RunOptions, force_discovery: bool) -> Result<Outcome> {
    let config = options.load_config()?;
    let mut settings = config.settings()?;
    settings.discovery |= force_discovery;
    let router = config.router()?;

    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    let working_dir = path_util::working_dir(&settings.output_root, &settings.machine_id, &timestamp);
    path_util::create_path(&working_dir)?;
    if let Some(log_file) = logging::init(&settings, &working_dir, &timestamp)? {
        eprintln!("Logging to {}", log_file.display());
    }

    let outcome = execute(&config, &settings, &router, &timestamp, working_dir);
    // main reports on stderr; only the log file needs its own copy
    if let Err(e) = &outcome
        && settings.log_to_file
    {
        error!("{e}");
    }
    outcome
}

fn execute(
    config: &ConfigFile,
    settings: &Settings,
    router: &ProfileRouter,
    timestamp: &str,
    working_dir: PathBuf,
) -> Result<Outcome> {
    let sources = sources::collect(&source_provider(config))?;

    if settings.discovery {
        let reports = discovery::discover(&sources, timestamp);
        discovery::print_reports(&reports);
        return Ok(Outcome::Discovery(reports));
    }

    info!("Working directory {}", working_dir.display());
    let summary = Orchestrator::new(settings, router, timestamp, working_dir).run(&sources)?;
    Ok(Outcome::Backup(summary))
}

/// Configured sources, then the sources file.
fn source_provider(config: &ConfigFile) -> ChainedSources {
    let mut providers: Vec<Box<dyn SourceProvider>> =
        vec![Box::new(StaticSources(config.sources.clone()))];
    if let Some(file) = &config.sources_file {
        providers.push(Box::new(ListFileSources::new(file)));
    }
    ChainedSources(providers)
}

/// Prints the absolute path to the configuration file.
pub fn config() -> Result<()> {
    println!("config file: {}", config::config_file()?.display());
    Ok(())
}
