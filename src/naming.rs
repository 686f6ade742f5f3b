//! Archive file naming and per-run collision resolution.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;

use crate::constants::ARCHIVE_EXTENSION;

/// Drops every character outside `[A-Za-z0-9._-]`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// `<sanitized name>_<timestamp>.tar.gz`
pub fn archive_file_name(logical_name: &str, timestamp: &str) -> String {
    sanitize(&format!("{logical_name}_{timestamp}.{ARCHIVE_EXTENSION}"))
}

/// A name handed out by [`NameAllocator::allocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatedName {
    /// Logical name after disambiguation (unsanitized).
    pub logical_name: String,
    pub file_name: String,
}

/// Hands out archive file names that are unique within one run.
#[derive(Debug)]
pub struct NameAllocator {
    timestamp: String,
    used: HashSet<String>,
}

impl NameAllocator {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            used: HashSet::new(),
        }
    }

    /// Whether a name with the same sanitized form was already allocated.
    pub fn is_used(&self, logical_name: &str) -> bool {
        self.used.contains(&sanitize(logical_name))
    }

    /// Allocates a file name for `logical_name`, appending a wall-clock
    /// suffix to the logical name when it collides with an earlier one.
    pub fn allocate(&mut self, logical_name: &str) -> AllocatedName {
        let logical_name = if self.is_used(logical_name) {
            warn!("WARN: Already using backupName {logical_name}");
            self.disambiguate(logical_name)
        } else {
            logical_name.to_string()
        };
        self.used.insert(sanitize(&logical_name));
        AllocatedName {
            file_name: archive_file_name(&logical_name, &self.timestamp),
            logical_name,
        }
    }

    /// Appends `<seconds>.<micros>` and bumps the micros until unused.
    fn disambiguate(&self, logical_name: &str) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        let mut secs = now.as_secs();
        let mut micros = now.subsec_micros();
        loop {
            let candidate = format!("{logical_name}{secs}.{micros:06}");
            if !self.is_used(&candidate) {
                return candidate;
            }
            micros += 1;
            if micros == 1_000_000 {
                micros = 0;
                secs += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("My Projects (old)/ü"), "MyProjectsold");
        assert_eq!(sanitize("a.b_c-d"), "a.b_c-d");
        assert_eq!(sanitize(""), "");
    }

    #[test]
    fn test_sanitize_idempotent() {
        for name in ["NS2 backup!", "Proj.folder", "日本 語-1", "a/b\\c"] {
            let once = sanitize(name);
            assert_eq!(sanitize(&once), once);
        }
    }

    #[test]
    fn test_archive_file_name() {
        assert_eq!(
            archive_file_name("Staff Pad", "20211001-101010"),
            "StaffPad_20211001-101010.tar.gz"
        );
    }

    #[test]
    fn test_allocate_unique_names() {
        let mut names = NameAllocator::new("20211001-101010");
        let first = names.allocate("Projects");
        let second = names.allocate("Projects");
        let third = names.allocate("Projects");
        assert_eq!(first.file_name, "Projects_20211001-101010.tar.gz");
        assert_eq!(first.logical_name, "Projects");
        assert_ne!(first.file_name, second.file_name);
        assert_ne!(second.file_name, third.file_name);
        assert_ne!(first.file_name, third.file_name);
        assert!(second.logical_name.starts_with("Projects"));
        assert!(second.file_name.ends_with("_20211001-101010.tar.gz"));
    }

    #[test]
    fn test_collision_on_sanitized_form() {
        let mut names = NameAllocator::new("t");
        let a = names.allocate("My Files");
        let b = names.allocate("MyFiles");
        assert_ne!(a.file_name, b.file_name);
        assert!(names.is_used("My Files"));
    }
}
