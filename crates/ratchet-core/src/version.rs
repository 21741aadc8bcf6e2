//! Semantic versions of the system under test.
//!
//! Checks gate behavior on the version the test run started at, so the only
//! capabilities needed here are parsing, total ordering, and display. A
//! prerelease of some version always sorts before the released version
//! itself: `0.48.0-dev < 0.48.0`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CheckError;

/// A parsed `MAJOR.MINOR.PATCH[-PRERELEASE]` version. Immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,

    /// Prerelease marker, e.g. `dev` in `0.47.0-dev`. Compared by presence
    /// only: any prerelease of V sorts before the released V.
    pub prerelease: Option<String>,
}

impl Version {
    /// A released (non-prerelease) version.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            prerelease: None,
        }
    }

    /// Whether this is a prerelease build.
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            // Release sorts after any prerelease of the same triple.
            .then_with(|| self.is_prerelease().cmp(&other.is_prerelease()).reverse())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = |reason: &str| CheckError::MalformedVersion {
            input: s.to_string(),
            reason: reason.to_string(),
        };

        let (triple, prerelease) = match s.split_once('-') {
            Some((triple, pre)) => {
                if pre.is_empty() {
                    return Err(malformed("empty prerelease marker"));
                }
                (triple, Some(pre.to_string()))
            }
            None => (s, None),
        };

        let mut parts = triple.splitn(3, '.');
        let mut next = |name: &str| -> Result<u64, CheckError> {
            parts
                .next()
                .ok_or_else(|| malformed(&format!("missing {name} component")))?
                .parse::<u64>()
                .map_err(|_| malformed(&format!("non-numeric {name} component")))
        };

        let major = next("major")?;
        let minor = next("minor")?;
        let patch = next("patch")?;

        Ok(Self {
            major,
            minor,
            patch,
            prerelease,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().expect("version should parse")
    }

    #[test]
    fn test_parse_release() {
        let version = v("0.47.0");
        assert_eq!(version.major, 0);
        assert_eq!(version.minor, 47);
        assert_eq!(version.patch, 0);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_parse_prerelease() {
        let version = v("0.48.0-dev");
        assert_eq!(version.prerelease.as_deref(), Some("dev"));
        assert!(version.is_prerelease());
    }

    #[test]
    fn test_display_round_trips() {
        for s in ["1.2.3", "0.47.0-dev", "10.0.1"] {
            assert_eq!(v(s).to_string(), s);
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for s in ["", "0.47", "0.47.x", "a.b.c", "0.47.0-", "1..2"] {
            let err = s.parse::<Version>().unwrap_err();
            assert!(
                matches!(err, CheckError::MalformedVersion { .. }),
                "{s:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_ordering_by_triple() {
        assert!(v("0.46.0") < v("0.47.0"));
        assert!(v("0.47.0") < v("0.47.1"));
        assert!(v("0.47.9") < v("1.0.0"));
        assert!(v("0.47.0") == v("0.47.0"));
    }

    #[test]
    fn test_prerelease_sorts_before_release() {
        assert!(v("0.48.0-dev") < v("0.48.0"));
        assert!(v("0.48.0") > v("0.48.0-dev"));
        // But a prerelease of a later triple still sorts after earlier releases.
        assert!(v("0.48.0-dev") > v("0.47.0"));
    }

    #[test]
    fn test_gating_thresholds_from_owners_check() {
        // The eligibility threshold used by the ownership check.
        let threshold = v("0.47.0-dev");
        assert!(v("0.46.0") < threshold);
        assert!(v("0.47.0") >= threshold);
        assert!(v("0.47.0-dev") >= threshold);
    }
}
