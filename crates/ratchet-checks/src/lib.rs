//! ratchet-checks - concrete upgrade-compatibility checks
//!
//! Each check realizes the three-phase protocol from `ratchet-core` for one
//! area of catalog behavior. Checks are stateless values: a runner pairs one
//! with a base version, a script interpreter and an upgrade driver.

pub mod objects;
pub mod owners;

// Re-export key types
pub use objects::{create_objects, drop_objects};
pub use owners::{Owner, Owners, DEFAULT_OWNER};

use ratchet_core::Check;

/// Every check this crate defines, in registration order.
pub fn all_checks() -> Vec<Box<dyn Check>> {
    vec![Box::new(Owners)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_names_are_unique() {
        let checks = all_checks();
        assert!(!checks.is_empty());
        let mut names: Vec<&str> = checks.iter().map(|c| c.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), checks.len());
    }
}
