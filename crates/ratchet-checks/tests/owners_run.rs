//! Integration tests driving the `owners` check end to end through the
//! runner with the in-memory fakes.

use ratchet_checks::Owners;
use ratchet_core::fakes::{RecordingInterpreter, StaticUpgradeDriver};
use ratchet_core::{CheckError, CheckRunner, Phase, ScriptFailure, Version};

fn v(s: &str) -> Version {
    s.parse().expect("version should parse")
}

fn two_boundary_driver() -> StaticUpgradeDriver {
    StaticUpgradeDriver::new(vec![v("0.47.1"), v("0.48.0")])
}

/// Test: full pass at base 0.47.0 across two upgrade boundaries.
#[tokio::test]
async fn test_owners_full_run_passes() {
    let interpreter = RecordingInterpreter::new();
    let report = CheckRunner::run(
        Box::new(Owners),
        v("0.47.0"),
        &interpreter,
        &two_boundary_driver(),
    )
    .await
    .expect("run should pass");

    assert!(report.passed());
    assert_eq!(report.check, "owners");
    // initialize + two manipulate scripts + validate
    assert_eq!(report.scripts_executed(), 4);
    assert!(!report.run_id.is_empty());

    let executed = interpreter.executed();
    assert_eq!(executed.len(), 4);

    // initialize runs before any boundary and carries the expensive set
    assert!(executed[0].contains("CREATE ROLE owner_role_01"));
    assert!(executed[0].contains("CREATE CLUSTER owner_cluster1"));

    // manipulate scripts land in boundary order
    assert!(executed[1].contains("CREATE DATABASE owner_db2"));
    assert!(executed[2].contains("CREATE DATABASE owner_db4"));

    // base 0.47.0 predates ownership tracking: legacy rows use the sentinel
    assert!(executed[3].contains(" owner_db1 | default_owner |"));
    assert!(executed[3].contains("owner_type4 owner_role_02"));
    assert!(executed[3].contains("DROP DATABASE owner_db7"));
}

/// Test: base 0.48.0 flips the gated expected output to the creator role.
#[tokio::test]
async fn test_owners_post_threshold_expected_output() {
    let interpreter = RecordingInterpreter::new();
    CheckRunner::run(
        Box::new(Owners),
        v("0.48.0"),
        &interpreter,
        &two_boundary_driver(),
    )
    .await
    .expect("run should pass");

    let validate = interpreter.executed().pop().unwrap();
    assert!(validate.contains(" owner_db1 | owner_role_01 |"));
    assert!(!validate.contains("default_owner"));
}

/// Test: an ineligible base version produces no scripts at all.
#[tokio::test]
async fn test_owners_ineligible_base_is_a_skip() {
    let interpreter = RecordingInterpreter::new();
    let report = CheckRunner::run(
        Box::new(Owners),
        v("0.46.0"),
        &interpreter,
        &two_boundary_driver(),
    )
    .await
    .expect("skip is not an error");

    assert!(report.skipped());
    assert!(report.phases.is_empty());
    assert!(interpreter.executed().is_empty());
}

/// Test: an assertion mismatch in validate surfaces with full context and
/// halts the run.
#[tokio::test]
async fn test_owners_assertion_mismatch_propagates() {
    let interpreter = RecordingInterpreter::new();
    interpreter.fail_at(
        3,
        ScriptFailure::Assertion {
            command: "\\l owner_db*".to_string(),
            expected: " owner_db1 | default_owner |".to_string(),
            actual: " owner_db1 | owner_role_01 |".to_string(),
        },
    );

    let err = CheckRunner::run(
        Box::new(Owners),
        v("0.47.0"),
        &interpreter,
        &two_boundary_driver(),
    )
    .await
    .unwrap_err();

    match err {
        CheckError::AssertionMismatch {
            check,
            phase,
            script_index,
            expected,
            actual,
            ..
        } => {
            assert_eq!(check, "owners");
            assert_eq!(phase, Phase::Validate);
            assert_eq!(script_index, 0);
            assert_ne!(expected, actual);
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Test: a mutation failure at the first boundary stops the run before the
/// second manipulate script executes.
#[tokio::test]
async fn test_owners_mutation_failure_halts_run() {
    let interpreter = RecordingInterpreter::new();
    interpreter.fail_at(
        1,
        ScriptFailure::Mutation {
            statement: "CREATE DATABASE owner_db2".to_string(),
            message: "database already exists".to_string(),
        },
    );

    let err = CheckRunner::run(
        Box::new(Owners),
        v("0.47.0"),
        &interpreter,
        &two_boundary_driver(),
    )
    .await
    .unwrap_err();

    match err {
        CheckError::MutationFailure {
            phase,
            script_index,
            statement,
            ..
        } => {
            assert_eq!(phase, Phase::Manipulate);
            assert_eq!(script_index, 0);
            assert!(statement.contains("owner_db2"));
        }
        other => panic!("unexpected error: {other}"),
    }

    // initialize + the failed first manipulate attempt only
    assert_eq!(interpreter.executed().len(), 2);
}

/// Test: the driver must traverse exactly as many boundaries as the check
/// produces manipulate scripts.
#[tokio::test]
async fn test_owners_boundary_count_must_match_driver() {
    let interpreter = RecordingInterpreter::new();
    let three_boundaries =
        StaticUpgradeDriver::new(vec![v("0.47.1"), v("0.47.2"), v("0.48.0")]);

    let err = CheckRunner::run(
        Box::new(Owners),
        v("0.47.0"),
        &interpreter,
        &three_boundaries,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        CheckError::BoundaryMismatch {
            scripts: 2,
            boundaries: 3,
            ..
        }
    ));
}
