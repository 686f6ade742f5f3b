//! Discovery mode: reports what a backup run would produce without archiving.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use log::info;
use walkdir::WalkDir;

use crate::constants::DISCOVERY_SAMPLE_SIZE;
use crate::naming;
use crate::orchestrator::is_log_path;
use crate::path_util;

/// Diagnostic block for one source path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceReport {
    pub path: PathBuf,
    /// Archive name produced when no association renames the source.
    pub example_name: String,
    /// Root folder name, shared with an earlier source.
    pub duplicate_name: Option<String>,
    /// Up to five immediate, non-hidden children, sorted by name.
    pub samples: Vec<String>,
}

impl fmt::Display for SourceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "PATH:{}", self.path.display())?;
        writeln!(
            f,
            "Example backup file name if no friendly name is defined: {}",
            self.example_name
        )?;
        if let Some(name) = &self.duplicate_name {
            writeln!(
                f,
                "**NOTE** {name} will be used in the backup file name.  This name was also found for one of your other backup locations and so you should ensure that it has a friendly named defined."
            )?;
        }
        if !self.samples.is_empty() {
            writeln!(f, "A sample of files from this path:")?;
        }
        for sample in &self.samples {
            writeln!(f, " |_ {sample}")?;
        }
        Ok(())
    }
}

/// Builds one report per source, skipping the run's own log files.
pub fn discover(sources: &[PathBuf], timestamp: &str) -> Vec<SourceReport> {
    let mut seen = HashSet::new();
    sources
        .iter()
        .filter(|path| !is_log_path(path))
        .map(|path| {
            let root_name = path_util::root_folder_name(path);
            let duplicate_name = (!seen.insert(root_name.clone())).then(|| root_name.clone());
            SourceReport {
                path: path.clone(),
                example_name: naming::archive_file_name(&root_name, timestamp),
                duplicate_name,
                samples: sample_children(path, DISCOVERY_SAMPLE_SIZE),
            }
        })
        .collect()
}

/// Logs the discovery banner followed by every report.
pub fn print_reports(reports: &[SourceReport]) {
    info!("PATH DUMP MODE");
    info!("==============");
    for report in reports {
        for line in report.to_string().lines() {
            info!("{line}");
        }
        info!("");
    }
}

/// Unreadable sources simply yield no samples.
fn sample_children(path: &Path, limit: usize) -> Vec<String> {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| !name.starts_with('.'))
        .take(limit)
        .collect()
}
