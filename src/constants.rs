/// Package name.
pub(crate) const PKG_NAME: &str = env!("CARGO_PKG_NAME");
/// Default configuration file name.
pub(crate) const CONFIG_NAME: &str = "config.toml";
/// Extension of every archive written by a run.
pub const ARCHIVE_EXTENSION: &str = "tar.gz";
/// Prefix of the run log file. Source paths containing it are never archived.
pub const LOG_FILE_PREFIX: &str = "fileBackup_Log";
/// Run timestamp format, shared by the working directory, log and archive names.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
/// Number of child entries listed per source in discovery mode.
pub const DISCOVERY_SAMPLE_SIZE: usize = 5;
