//! Drives a check's phases across upgrade boundaries.
//!
//! The runner owns the fixed calling order: eligibility, `initialize`
//! before any version transition, one `manipulate` script immediately after
//! each upgrade boundary, the final step, then `validate`. Script execution
//! and version transitions are delegated to the [`ScriptInterpreter`] and
//! [`UpgradeDriver`] seams; everything here is strictly sequential per
//! check. First failure aborts the remaining phases of that check only.

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::check::{Check, CheckLifecycle, Phase};
use crate::error::{CheckError, Result};
use crate::script::Script;
use crate::version::Version;

/// Why a script stopped executing. Produced by the interpreter; the runner
/// wraps it with check name, phase and script index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptFailure {
    /// A mutation statement itself errored. No further blocks in the
    /// script execute.
    Mutation { statement: String, message: String },

    /// An assertion's actual stdout differed from the expected literal.
    Assertion {
        command: String,
        expected: String,
        actual: String,
    },
}

/// Executes one script's blocks in order against the system under test.
#[async_trait]
pub trait ScriptInterpreter: Send + Sync {
    async fn execute(&self, script: &Script) -> std::result::Result<(), ScriptFailure>;
}

/// Performs binary-version transitions between scripts.
#[async_trait]
pub trait UpgradeDriver: Send + Sync {
    /// Number of upgrade boundaries the run will traverse. Must equal the
    /// number of scripts the check's `manipulate` produces.
    fn boundaries(&self) -> usize;

    /// Cross boundary `k` (0-based); returns the version active afterwards.
    async fn upgrade(&self, boundary: usize) -> anyhow::Result<Version>;

    /// Perform the final step after the last boundary; returns the version
    /// `validate` runs against.
    async fn finalize(&self) -> anyhow::Result<Version>;
}

/// Terminal outcome of one check run. Ineligibility is a skip, not a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed,
    Skipped,
}

/// One executed script within a check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseResult {
    /// Phase the script belongs to.
    pub phase: Phase,

    /// Index of the script within its phase (always 0 outside `manipulate`).
    pub script_index: usize,

    /// Number of command blocks executed.
    pub blocks: usize,

    /// Fingerprint of the rendered script text, for manual reproduction.
    pub fingerprint: String,

    /// Version active while the script executed.
    pub version: Version,
}

/// Result of a complete check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckReport {
    /// Unique id for this run.
    pub run_id: String,

    /// Check name.
    pub check: String,

    /// Version the run began at.
    pub base_version: Version,

    /// Terminal outcome.
    pub outcome: CheckOutcome,

    /// Scripts executed, in order. Empty for skipped checks.
    pub phases: Vec<PhaseResult>,

    /// When the run started.
    pub started_at: DateTime<Utc>,

    /// Total duration in milliseconds.
    pub duration_ms: u64,
}

impl CheckReport {
    /// Number of scripts executed.
    pub fn scripts_executed(&self) -> usize {
        self.phases.len()
    }

    pub fn passed(&self) -> bool {
        self.outcome == CheckOutcome::Passed
    }

    pub fn skipped(&self) -> bool {
        self.outcome == CheckOutcome::Skipped
    }
}

/// Sequential check runner.
pub struct CheckRunner;

impl CheckRunner {
    /// Run one check end to end.
    ///
    /// Calling order is fixed: `can_run` gate, `initialize` script, then per
    /// upgrade boundary one version transition followed by the matching
    /// `manipulate` script, the final step, and `validate`. Any script
    /// failure is returned as a [`CheckError`] carrying the check name,
    /// phase and script index; no further scripts execute.
    pub async fn run(
        check: Box<dyn Check>,
        base_version: Version,
        interpreter: &dyn ScriptInterpreter,
        driver: &dyn UpgradeDriver,
    ) -> Result<CheckReport> {
        let start = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4().to_string();

        let mut lifecycle = CheckLifecycle::new(check, base_version.clone());
        let name = lifecycle.name().to_string();

        info!(run_id = %run_id, check = %name, base_version = %base_version, "starting check run");

        if !lifecycle.assess()? {
            info!(check = %name, base_version = %base_version, "check ineligible, skipping");
            return Ok(CheckReport {
                run_id,
                check: name,
                base_version,
                outcome: CheckOutcome::Skipped,
                phases: Vec::new(),
                started_at,
                duration_ms: start.elapsed().as_millis() as u64,
            });
        }

        let mut phases = Vec::new();

        // Pre-upgrade world state, valid against the base version only.
        let script = lifecycle.initialize()?;
        Self::execute(
            interpreter,
            &name,
            Phase::Initialize,
            0,
            &script,
            &base_version,
            &mut phases,
        )
        .await?;

        let scripts = lifecycle.manipulate()?;
        if scripts.len() != driver.boundaries() {
            return Err(CheckError::BoundaryMismatch {
                check: name,
                scripts: scripts.len(),
                boundaries: driver.boundaries(),
            });
        }

        for (boundary, script) in scripts.iter().enumerate() {
            let active = driver
                .upgrade(boundary)
                .await
                .map_err(|e| CheckError::DriverFailure {
                    check: name.clone(),
                    boundary,
                    message: e.to_string(),
                })?;
            info!(check = %name, boundary, version = %active, "crossed upgrade boundary");
            Self::execute(
                interpreter,
                &name,
                Phase::Manipulate,
                boundary,
                script,
                &active,
                &mut phases,
            )
            .await?;
        }

        let final_version = driver
            .finalize()
            .await
            .map_err(|e| CheckError::DriverFailure {
                check: name.clone(),
                boundary: driver.boundaries(),
                message: e.to_string(),
            })?;

        let script = lifecycle.validate()?;
        Self::execute(
            interpreter,
            &name,
            Phase::Validate,
            0,
            &script,
            &final_version,
            &mut phases,
        )
        .await?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(run_id = %run_id, check = %name, duration_ms, "check run passed");

        Ok(CheckReport {
            run_id,
            check: name,
            base_version,
            outcome: CheckOutcome::Passed,
            phases,
            started_at,
            duration_ms,
        })
    }

    async fn execute(
        interpreter: &dyn ScriptInterpreter,
        check: &str,
        phase: Phase,
        script_index: usize,
        script: &Script,
        version: &Version,
        phases: &mut Vec<PhaseResult>,
    ) -> Result<()> {
        info!(check = %check, phase = %phase, script_index, blocks = script.len(), "executing script");

        interpreter
            .execute(script)
            .await
            .map_err(|failure| match failure {
                ScriptFailure::Mutation { statement, message } => CheckError::MutationFailure {
                    check: check.to_string(),
                    phase,
                    script_index,
                    statement,
                    message,
                },
                ScriptFailure::Assertion {
                    command,
                    expected,
                    actual,
                } => CheckError::AssertionMismatch {
                    check: check.to_string(),
                    phase,
                    script_index,
                    command,
                    expected,
                    actual,
                },
            })?;

        phases.push(PhaseResult {
            phase,
            script_index,
            blocks: script.len(),
            fingerprint: script.fingerprint(),
            version: version.clone(),
        });
        Ok(())
    }
}
