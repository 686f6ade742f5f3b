//! Maps source paths to the profile that governs them.

use std::path::Path;

use log::debug;
use regex::Regex;

use crate::error::BackupError;
use crate::profile::Profile;

/// A pattern searched in a source's absolute path, pointing at a profile.
#[derive(Debug, Clone)]
pub struct Association {
    pattern: Regex,
    profile: usize,
}

/// Outcome of routing one source path.
#[derive(Debug, Clone, Copy)]
pub struct Route<'a> {
    /// Profile name, or the source's root folder name when nothing matched.
    pub logical_name: &'a str,
    /// `None` means unrestricted inclusion.
    pub profile: Option<&'a Profile>,
}

/// Owns the profiles and the ordered associations between path patterns and profiles.
#[derive(Debug, Default)]
pub struct ProfileRouter {
    profiles: Vec<Profile>,
    associations: Vec<Association>,
}

impl ProfileRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a profile. Names must be unique.
    pub fn add_profile(&mut self, profile: Profile) -> Result<(), BackupError> {
        if self.profile(profile.name()).is_some() {
            return Err(BackupError::InvalidProfile {
                reason: format!("duplicate profile name '{}'", profile.name()),
            });
        }
        self.profiles.push(profile);
        Ok(())
    }

    /// Appends an association; later associations override earlier ones.
    pub fn associate(&mut self, pattern: &str, profile: &str) -> Result<(), BackupError> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.name() == profile)
            .ok_or_else(|| BackupError::UnknownProfile {
                profile: profile.to_string(),
            })?;
        let pattern = Regex::new(pattern).map_err(|source| BackupError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        self.associations.push(Association {
            pattern,
            profile: index,
        });
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.name() == name)
    }

    /// Resolves `source` with a linear scan; the last matching association wins.
    ///
    /// `root_name` is the fallback logical name when nothing matches.
    pub fn resolve<'a>(&'a self, source: &Path, root_name: &'a str) -> Route<'a> {
        let text = source.to_string_lossy();
        let mut route = Route {
            logical_name: root_name,
            profile: None,
        };
        for association in &self.associations {
            if association.pattern.is_match(&text) {
                let profile = &self.profiles[association.profile];
                debug!(
                    "Path {text} matches pattern {} so using friendly name {}.",
                    association.pattern,
                    profile.name()
                );
                route = Route {
                    logical_name: profile.name(),
                    profile: Some(profile),
                };
            }
        }
        route
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> ProfileRouter {
        let mut router = ProfileRouter::new();
        router.add_profile(Profile::new("NS2").unwrap()).unwrap();
        router.add_profile(Profile::new("AUM").unwrap()).unwrap();
        router.add_profile(Profile::new("StaffPad").unwrap()).unwrap();
        router.associate(".*ABA9AB34.*/Projects", "NS2").unwrap();
        router.associate(".*90900E45.*/Projects", "NS2").unwrap();
        router.associate(".*A1BD7CE0.*", "AUM").unwrap();
        router.associate(".*StaffPad.*", "StaffPad").unwrap();
        router
    }

    #[test]
    fn test_no_match_falls_back_to_root_name() {
        let router = router();
        let route = router.resolve(Path::new("/data/Documents"), "Documents");
        assert_eq!(route.logical_name, "Documents");
        assert!(route.profile.is_none());
    }

    #[test]
    fn test_shared_profile() {
        let router = router();
        let a = router.resolve(Path::new("/x/ABA9AB34-1/Projects"), "Projects");
        let b = router.resolve(Path::new("/x/90900E45-2/Projects"), "Projects");
        assert_eq!(a.logical_name, "NS2");
        assert_eq!(b.logical_name, "NS2");
        assert!(std::ptr::eq(a.profile.unwrap(), b.profile.unwrap()));
    }

    #[test]
    fn test_last_match_wins() {
        let router = router();
        let route = router.resolve(Path::new("/x/A1BD7CE0/StaffPad"), "StaffPad");
        assert_eq!(route.logical_name, "StaffPad");
        assert_eq!(route.profile.map(Profile::name), Some("StaffPad"));
    }

    #[test]
    fn test_unknown_profile_and_duplicates() {
        let mut router = router();
        assert!(matches!(
            router.associate(".*", "Missing"),
            Err(BackupError::UnknownProfile { .. })
        ));
        assert!(matches!(
            router.associate("(", "NS2"),
            Err(BackupError::InvalidPattern { .. })
        ));
        assert!(matches!(
            router.add_profile(Profile::new("AUM").unwrap()),
            Err(BackupError::InvalidProfile { .. })
        ));
        assert!(router.profile("AUM").is_some());
        assert!(router.profile("Missing").is_none());
    }
}
