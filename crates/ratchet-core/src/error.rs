//! Error taxonomy for check execution.

use crate::check::Phase;

/// Errors produced while parsing versions or executing a check.
///
/// Ineligibility is deliberately absent: a check that declines to run for a
/// given base version is a skip signal ([`crate::runner::CheckOutcome::Skipped`]),
/// never an error.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("malformed version string {input:?}: {reason}")]
    MalformedVersion { input: String, reason: String },

    #[error(
        "assertion mismatch in check {check} during {phase} (script {script_index}): \
         command {command:?} expected {expected:?}, got {actual:?}"
    )]
    AssertionMismatch {
        check: String,
        phase: Phase,
        script_index: usize,
        command: String,
        expected: String,
        actual: String,
    },

    #[error(
        "mutation failure in check {check} during {phase} (script {script_index}): \
         statement {statement:?} failed: {message}"
    )]
    MutationFailure {
        check: String,
        phase: Phase,
        script_index: usize,
        statement: String,
        message: String,
    },

    #[error("invalid phase transition for check {check}: {from} -> {to}")]
    InvalidTransition {
        check: String,
        from: String,
        to: String,
    },

    #[error(
        "check {check} produced {scripts} manipulate script(s) but the driver \
         traverses {boundaries} upgrade boundary(ies)"
    )]
    BoundaryMismatch {
        check: String,
        scripts: usize,
        boundaries: usize,
    },

    #[error("upgrade driver error in check {check} at boundary {boundary}: {message}")]
    DriverFailure {
        check: String,
        boundary: usize,
        message: String,
    },
}

/// Result type for check operations.
pub type Result<T> = std::result::Result<T, CheckError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_version_display() {
        let err = CheckError::MalformedVersion {
            input: "0.47".to_string(),
            reason: "expected MAJOR.MINOR.PATCH".to_string(),
        };
        assert!(err.to_string().contains("malformed version"));
        assert!(err.to_string().contains("0.47"));
    }

    #[test]
    fn test_assertion_mismatch_carries_context() {
        let err = CheckError::AssertionMismatch {
            check: "owners".to_string(),
            phase: Phase::Validate,
            script_index: 0,
            command: "\\l owner_db*".to_string(),
            expected: "owner_db1 | owner_role_01".to_string(),
            actual: "owner_db1 | default_owner".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("owners"));
        assert!(text.contains("validate"));
        assert!(text.contains("default_owner"));
    }

    #[test]
    fn test_boundary_mismatch_display() {
        let err = CheckError::BoundaryMismatch {
            check: "owners".to_string(),
            scripts: 2,
            boundaries: 3,
        };
        assert!(err.to_string().contains('2'));
        assert!(err.to_string().contains('3'));
    }
}
