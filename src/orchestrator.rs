//! Drives one archive per source path, strictly in order.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::Result;
use crate::archive::{ArchiveBuilder, ArchiveStats};
use crate::config::Settings;
use crate::constants::LOG_FILE_PREFIX;
use crate::naming::NameAllocator;
use crate::path_util;
use crate::router::ProfileRouter;

/// One archive written by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveReport {
    pub source: PathBuf,
    pub logical_name: String,
    pub file: PathBuf,
    /// Final size of the compressed file in bytes.
    pub size: u64,
    pub stats: ArchiveStats,
}

/// What a completed backup run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub archives: Vec<ArchiveReport>,
}

impl RunSummary {
    pub fn warnings(&self) -> u64 {
        self.archives.iter().map(|a| a.stats.warnings).sum()
    }
}

/// True for paths that look like a log file of this tool.
pub fn is_log_path(path: &Path) -> bool {
    path.to_string_lossy().contains(LOG_FILE_PREFIX)
}

/// Sequential backup run over a list of sources.
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    router: &'a ProfileRouter,
    names: NameAllocator,
    working_dir: PathBuf,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        settings: &'a Settings,
        router: &'a ProfileRouter,
        timestamp: &str,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings,
            router,
            names: NameAllocator::new(timestamp),
            working_dir: working_dir.into(),
        }
    }

    /// Archives every source. The first fatal error stops the run; archives
    /// already written stay on disk.
    pub fn run(&mut self, sources: &[PathBuf]) -> Result<RunSummary> {
        info!("BACKUP MODE");
        info!("===========");
        let mut summary = RunSummary::default();
        for source in sources {
            if is_log_path(source) {
                debug!("Skipping backup log");
                continue;
            }
            summary.archives.push(self.backup_one(source)?);
        }
        info!(
            "Wrote {} archive(s) with {} size warning(s)",
            summary.archives.len(),
            summary.warnings()
        );
        Ok(summary)
    }

    fn backup_one(&mut self, source: &Path) -> Result<ArchiveReport> {
        let root_folder = path_util::root_folder_name(source);
        let route = self.router.resolve(source, &root_folder);
        let name = self.names.allocate(route.logical_name);
        if let Some(profile) = route.profile {
            debug!(
                "Profile {} for {}: warn above {:?}, fail above {:?}",
                profile.name(),
                source.display(),
                profile.max_size_warn(),
                profile.max_size_fail()
            );
        }

        info!(
            "--BACKING UP-- Folder {root_folder} using name {}",
            name.logical_name
        );
        let file = self.working_dir.join(&name.file_name);
        let stats = ArchiveBuilder::new(route.profile, self.settings.non_regular)
            .level(self.settings.level)
            .build(source, &root_folder, &file)?;
        let size = fs::metadata(&file)?.len();
        info!("--FILE WRITTEN-- {} of size {size}", name.file_name);

        Ok(ArchiveReport {
            source: source.to_path_buf(),
            logical_name: name.logical_name,
            file,
            size,
            stats,
        })
    }
}
