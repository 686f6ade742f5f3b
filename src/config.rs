//! Configuration for a backup run.
//!
//! The TOML file holds the run flags, the named profiles and the ordered
//! path-to-profile associations. It is read once at startup, merged with the
//! command-line overrides and compiled into an immutable [`Settings`] value
//! plus a [`ProfileRouter`]; nothing here is global state.

use crate::archive::Level;
use crate::constants::{CONFIG_NAME, PKG_NAME};
use crate::error::BackupError;
use crate::matcher::PatternSet;
use crate::path_util;
use crate::profile::{NonRegularPolicy, Profile};
use crate::router::ProfileRouter;
use crate::Result;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// On-disk configuration file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Report what would be archived instead of archiving.
    pub discovery: bool,
    /// Log per-entry decisions.
    pub verbose: bool,
    /// Archive symlinks, devices and other non-regular entries.
    pub include_non_regular: bool,
    /// Send the log stream to a file in the working directory.
    pub log_to_file: bool,
    /// gzip level for every archive.
    pub level: Level,
    /// Parent of the `<machine>/<timestamp>` working directory.
    pub output_root: Option<PathBuf>,
    /// Overrides the host name in the working directory path.
    pub machine_id: Option<String>,
    /// Source paths, in order.
    pub sources: Vec<PathBuf>,
    /// File with one source path per line.
    pub sources_file: Option<PathBuf>,
    pub profiles: Vec<ProfileConfig>,
    pub associations: Vec<AssociationConfig>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            discovery: false,
            verbose: false,
            include_non_regular: false,
            log_to_file: true,
            level: Level::Default,
            output_root: None,
            machine_id: None,
            sources: vec![],
            sources_file: None,
            profiles: vec![],
            associations: vec![],
        }
    }
}

/// One `[[profiles]]` table.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    pub name: String,
    pub allowed_files: Vec<String>,
    pub banned_files: Vec<String>,
    pub allowed_dirs: Vec<String>,
    pub banned_dirs: Vec<String>,
    pub max_size_warn: Option<u64>,
    pub max_size_fail: Option<u64>,
}

/// One `[[associations]]` table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct AssociationConfig {
    /// Searched in the source's absolute path.
    pub pattern: String,
    /// Name of a profile defined in `[[profiles]]`.
    pub profile: String,
}

/// Immutable run settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub discovery: bool,
    pub verbose: bool,
    pub non_regular: NonRegularPolicy,
    pub log_to_file: bool,
    pub level: Level,
    pub output_root: PathBuf,
    pub machine_id: String,
}

impl ConfigFile {
    /// Loads `path`. A missing file is an error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            BackupError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::parse(&text)
            .map_err(|e| BackupError::Config(format!("{}: {e}", path.display())))
    }

    /// Loads the default configuration file, or defaults if there is none.
    pub fn load_default() -> Result<Self> {
        let path = config_file()?;
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn parse(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolves the flags into [`Settings`].
    pub fn settings(&self) -> Result<Settings> {
        let output_root = match &self.output_root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let machine_id = self
            .machine_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(path_util::machine_id);
        Ok(Settings {
            discovery: self.discovery,
            verbose: self.verbose,
            non_regular: NonRegularPolicy::from_include_flag(self.include_non_regular),
            log_to_file: self.log_to_file,
            level: self.level,
            output_root,
            machine_id,
        })
    }

    /// Compiles profiles and associations.
    ///
    /// # Errors
    /// Invalid patterns, empty or duplicate profile names, and associations
    /// naming an unknown profile.
    pub fn router(&self) -> Result<ProfileRouter> {
        let mut router = ProfileRouter::new();
        for profile in &self.profiles {
            router.add_profile(profile.compile()?)?;
        }
        for association in &self.associations {
            router.associate(&association.pattern, &association.profile)?;
        }
        Ok(router)
    }
}

impl ProfileConfig {
    pub fn compile(&self) -> Result<Profile> {
        if let (Some(warn), Some(fail)) = (self.max_size_warn, self.max_size_fail) {
            if fail < warn {
                warn!(
                    "Profile {}: max_size_fail {fail} is below max_size_warn {warn}",
                    self.name
                );
            }
        }
        Ok(Profile::new(self.name.clone())?
            .with_allowed_files(PatternSet::new(&self.allowed_files)?)
            .with_banned_files(PatternSet::new(&self.banned_files)?)
            .with_allowed_dirs(PatternSet::new(&self.allowed_dirs)?)
            .with_banned_dirs(PatternSet::new(&self.banned_dirs)?)
            .with_max_size_warn(self.max_size_warn)
            .with_max_size_fail(self.max_size_fail))
    }
}

/// Returns the absolute path to the default configuration file.
pub fn config_file() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(not(target_os = "macos"))]
fn config_dir() -> Result<PathBuf> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| BackupError::Config("couldn't find the configuration directory".into()))?;
    Ok(config_dir.join(PKG_NAME))
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(target_os = "macos")]
fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| BackupError::Config("couldn't get the home directory".into()))?;
    Ok(home_dir.join(".config").join(PKG_NAME))
}
