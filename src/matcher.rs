//! Allow/deny rule evaluation for a single entry name.
//!
//! Patterns are regular expressions searched anywhere in the name (the same
//! semantics as `Regex::is_match`); a pattern only anchors if it says so itself.

use log::debug;
use regex::Regex;

use crate::error::BackupError;

/// Outcome of evaluating a name against an allow-list and a deny-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Include,
    Exclude,
}

impl Decision {
    pub fn is_include(self) -> bool {
        self == Decision::Include
    }
}

/// An ordered list of compiled patterns.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Regex>,
}

impl PatternSet {
    /// Compiles every pattern, failing on the first invalid one.
    pub fn new<I, S>(patterns: I) -> Result<Self, BackupError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|source| BackupError::InvalidPattern {
                    pattern: p.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the first pattern found anywhere in `name`.
    pub fn first_match(&self, name: &str) -> Option<&Regex> {
        self.patterns.iter().find(|p| p.is_match(name))
    }
}

/// Decides whether `name` belongs in the archive.
///
/// A non-empty `allowed` list makes the decision inclusive-only: the name must
/// match one of its patterns and `banned` is never consulted. With an empty
/// `allowed` list everything is included unless a `banned` pattern matches.
pub fn decide(name: &str, allowed: &PatternSet, banned: &PatternSet) -> Decision {
    if !allowed.is_empty() {
        return match allowed.first_match(name) {
            Some(pattern) => {
                debug!(" INCLUDE: Matches include pattern {pattern}");
                Decision::Include
            }
            None => {
                debug!(" EXCLUDE: Did not match any of the allowed filters");
                Decision::Exclude
            }
        };
    }

    if let Some(pattern) = banned.first_match(name) {
        debug!(" EXCLUDE: Matches exclude pattern {pattern}");
        return Decision::Exclude;
    }

    debug!(" INCLUDE: default rule");
    Decision::Include
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> PatternSet {
        PatternSet::new(patterns).unwrap()
    }

    #[test]
    fn test_empty_lists_include_everything() {
        let empty = PatternSet::default();
        assert_eq!(decide("root/a.txt", &empty, &empty), Decision::Include);
        assert_eq!(decide("", &empty, &empty), Decision::Include);
    }

    #[test]
    fn test_allow_list_is_exclusive() {
        let allowed = set(&[r"\.aumproj"]);
        let banned = set(&[r"\.aumproj"]);
        assert_eq!(decide("root/song.aumproj", &allowed, &banned), Decision::Include);
        assert_eq!(decide("root/notes.txt", &allowed, &PatternSet::default()), Decision::Exclude);
        assert_eq!(decide("root/notes.txt", &allowed, &set(&["nothing"])), Decision::Exclude);
    }

    #[test]
    fn test_ban_list_applies_without_allow_list() {
        let banned = set(&[r"\.jpg", "Templates"]);
        let empty = PatternSet::default();
        assert_eq!(decide("root/photo.jpg", &empty, &banned), Decision::Exclude);
        assert_eq!(decide("root/Templates", &empty, &banned), Decision::Exclude);
        assert_eq!(decide("root/notes.txt", &empty, &banned), Decision::Include);
    }

    #[test]
    fn test_patterns_are_unanchored() {
        let allowed = set(&["Proj"]);
        assert!(decide("root/MyProject/x", &allowed, &PatternSet::default()).is_include());
        let anchored = set(&["^Proj"]);
        assert!(!decide("root/Proj", &anchored, &PatternSet::default()).is_include());
        assert!(decide("Proj", &anchored, &PatternSet::default()).is_include());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let err = PatternSet::new(["(unclosed"]).unwrap_err();
        match err {
            BackupError::InvalidPattern { pattern, .. } => assert_eq!(pattern, "(unclosed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_first_match_follows_definition_order() {
        let patterns = set(&["a", "ab"]);
        assert_eq!(patterns.first_match("xab").map(|r| r.as_str()), Some("a"));
        assert_eq!(patterns.first_match("b").map(|r| r.as_str()), None);
    }
}
