//! Version-gated value selection.
//!
//! Behavior that differs across the version axis is expressed as an ordered
//! list of (introduced-version, value) thresholds rather than ad-hoc
//! comparisons scattered through check code. Adding a new threshold is
//! additive: existing selections are unaffected for versions below it.

use serde::{Deserialize, Serialize};

use crate::version::Version;

/// Selects a value based on where a version falls among ordered thresholds.
///
/// `select(v)` returns the value of the highest threshold whose introduction
/// version is `<= v`, falling back to the initial value when `v` predates
/// every threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionGate<T> {
    initial: T,
    thresholds: Vec<(Version, T)>,
}

impl<T> VersionGate<T> {
    /// Gate that yields `initial` for every version until thresholds are added.
    pub fn new(initial: T) -> Self {
        Self {
            initial,
            thresholds: Vec::new(),
        }
    }

    /// Add a threshold: versions `>= introduced` select `value` (until a
    /// later threshold shadows it). Thresholds may be added in any order;
    /// they are kept sorted by introduction version, and adding one at an
    /// already-present version replaces the earlier value.
    pub fn with(mut self, introduced: Version, value: T) -> Self {
        match self
            .thresholds
            .binary_search_by(|(version, _)| version.cmp(&introduced))
        {
            Ok(index) => self.thresholds[index] = (introduced, value),
            Err(index) => self.thresholds.insert(index, (introduced, value)),
        }
        self
    }

    /// The value in effect at `version`.
    pub fn select(&self, version: &Version) -> &T {
        self.thresholds
            .iter()
            .rev()
            .find(|(introduced, _)| version >= introduced)
            .map_or(&self.initial, |(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        s.parse().expect("version should parse")
    }

    #[test]
    fn test_select_initial_below_all_thresholds() {
        let gate = VersionGate::new("old").with(v("0.48.0-dev"), "new");
        assert_eq!(*gate.select(&v("0.47.0")), "old");
        assert_eq!(*gate.select(&v("0.1.0")), "old");
    }

    #[test]
    fn test_select_at_and_above_threshold() {
        let gate = VersionGate::new("old").with(v("0.48.0-dev"), "new");
        assert_eq!(*gate.select(&v("0.48.0-dev")), "new");
        assert_eq!(*gate.select(&v("0.48.0")), "new");
        assert_eq!(*gate.select(&v("1.0.0")), "new");
    }

    #[test]
    fn test_later_threshold_shadows_earlier() {
        let gate = VersionGate::new(1)
            .with(v("0.47.0-dev"), 2)
            .with(v("0.48.0-dev"), 3);
        assert_eq!(*gate.select(&v("0.46.0")), 1);
        assert_eq!(*gate.select(&v("0.47.5")), 2);
        assert_eq!(*gate.select(&v("0.48.0")), 3);
    }

    #[test]
    fn test_no_thresholds_always_initial() {
        let gate: VersionGate<&str> = VersionGate::new("only");
        assert_eq!(*gate.select(&v("99.0.0")), "only");
    }

    #[test]
    fn test_threshold_insertion_order_is_irrelevant() {
        let ascending = VersionGate::new(0)
            .with(v("0.47.0-dev"), 1)
            .with(v("0.48.0-dev"), 2);
        let descending = VersionGate::new(0)
            .with(v("0.48.0-dev"), 2)
            .with(v("0.47.0-dev"), 1);
        for version in ["0.46.0", "0.47.2", "0.48.0", "1.0.0"] {
            assert_eq!(ascending.select(&v(version)), descending.select(&v(version)));
        }
    }

    #[test]
    fn test_repeated_threshold_replaces_value() {
        let gate = VersionGate::new("initial")
            .with(v("0.48.0-dev"), "first")
            .with(v("0.48.0-dev"), "second");
        assert_eq!(*gate.select(&v("0.48.0")), "second");
        assert_eq!(*gate.select(&v("0.47.0")), "initial");
    }
}
