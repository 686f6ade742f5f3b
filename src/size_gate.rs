/// Result of checking a file size against the optional thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeCheck {
    Ok,
    /// Above the warn threshold; counted, the entry is still archived.
    Warn { limit: u64 },
    /// Above the hard threshold; the whole run must stop.
    Fail { limit: u64 },
}

/// Compares `size` with the thresholds. `Fail` takes precedence over `Warn`.
pub fn check(size: u64, warn: Option<u64>, fail: Option<u64>) -> SizeCheck {
    match (warn, fail) {
        (_, Some(limit)) if size > limit => SizeCheck::Fail { limit },
        (Some(limit), _) if size > limit => SizeCheck::Warn { limit },
        _ => SizeCheck::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_thresholds() {
        assert_eq!(check(u64::MAX, None, None), SizeCheck::Ok);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        assert_eq!(check(100, Some(100), Some(100)), SizeCheck::Ok);
        assert_eq!(check(101, Some(100), None), SizeCheck::Warn { limit: 100 });
        assert_eq!(check(101, None, Some(100)), SizeCheck::Fail { limit: 100 });
    }

    #[test]
    fn test_fail_wins_over_warn() {
        assert_eq!(check(2000, Some(300), Some(1000)), SizeCheck::Fail { limit: 1000 });
        assert_eq!(check(500, Some(300), Some(1000)), SizeCheck::Warn { limit: 300 });
    }

    #[test]
    fn test_zero_threshold() {
        assert_eq!(check(0, Some(0), None), SizeCheck::Ok);
        assert_eq!(check(1, Some(0), None), SizeCheck::Warn { limit: 0 });
    }
}
