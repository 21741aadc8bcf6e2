//! The three-phase check protocol and its lifecycle state machine.
//!
//! A check declares world-state transitions and assertions tied to version
//! ranges. The runner feeds `initialize`'s script before any upgrade step,
//! one `manipulate` script per upgrade boundary, and `validate`'s script
//! after the final step. Checks are stateless beyond their name: per-object
//! state (counters, role names) lives in the generated script text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CheckError, Result};
use crate::script::Script;
use crate::version::Version;

/// The phase a script was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Initialize,
    Manipulate,
    Validate,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initialize => write!(f, "initialize"),
            Phase::Manipulate => write!(f, "manipulate"),
            Phase::Validate => write!(f, "validate"),
        }
    }
}

/// Context handed to every phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckContext {
    /// The version the overall test run began at. Set once by the runner
    /// before any phase executes.
    pub base_version: Version,
}

impl CheckContext {
    pub fn new(base_version: Version) -> Self {
        Self { base_version }
    }
}

/// A named, version-gated, three-phase compatibility check.
///
/// Phase methods are pure script producers: they perform no I/O and hold no
/// mutable state, so the same check value can be replayed against different
/// base versions.
pub trait Check: Send + Sync {
    /// Stable name used in reports and failure context.
    fn name(&self) -> &str;

    /// Whether this check participates for the given base version. Pure;
    /// the runner must skip the check entirely (no scripts, no assertions)
    /// when this returns false.
    fn can_run(&self, base_version: &Version) -> bool;

    /// Script establishing the pre-upgrade world state. Runs against the
    /// base version only.
    fn initialize(&self, ctx: &CheckContext) -> Script;

    /// One script per upgrade boundary the runner will traverse. Script *k*
    /// runs immediately after upgrade step *k* and may assume all prior
    /// scripts' objects exist.
    fn manipulate(&self, ctx: &CheckContext) -> Vec<Script>;

    /// Asserts the cumulative, version-correct end state of every object
    /// created across `initialize` and `manipulate`, then drops every
    /// object it created, restoring a clean namespace.
    fn validate(&self, ctx: &CheckContext) -> Script;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Created,
    Eligible,
    Ineligible,
    Initialized,
    Manipulated,
    Validated,
}

impl LifecycleState {
    fn name(self) -> &'static str {
        match self {
            LifecycleState::Created => "created",
            LifecycleState::Eligible => "eligible",
            LifecycleState::Ineligible => "ineligible",
            LifecycleState::Initialized => "initialized",
            LifecycleState::Manipulated => "manipulated",
            LifecycleState::Validated => "validated",
        }
    }
}

/// Enforces the phase order `Created -> (Eligible | Ineligible) ->
/// Initialized -> Manipulated -> Validated`, each phase exactly once.
///
/// An ineligible lifecycle refuses every phase: the check produces no
/// scripts and runs nothing.
pub struct CheckLifecycle {
    check: Box<dyn Check>,
    context: CheckContext,
    state: LifecycleState,
}

impl CheckLifecycle {
    pub fn new(check: Box<dyn Check>, base_version: Version) -> Self {
        Self {
            check,
            context: CheckContext::new(base_version),
            state: LifecycleState::Created,
        }
    }

    pub fn name(&self) -> &str {
        self.check.name()
    }

    pub fn context(&self) -> &CheckContext {
        &self.context
    }

    /// Resolve eligibility against the base version. Must be called before
    /// any phase. Returns whether the check participates.
    pub fn assess(&mut self) -> Result<bool> {
        self.expect(LifecycleState::Created, "assess")?;
        let eligible = self.check.can_run(&self.context.base_version);
        self.state = if eligible {
            LifecycleState::Eligible
        } else {
            LifecycleState::Ineligible
        };
        Ok(eligible)
    }

    pub fn initialize(&mut self) -> Result<Script> {
        self.expect(LifecycleState::Eligible, "initialize")?;
        self.state = LifecycleState::Initialized;
        Ok(self.check.initialize(&self.context))
    }

    pub fn manipulate(&mut self) -> Result<Vec<Script>> {
        self.expect(LifecycleState::Initialized, "manipulate")?;
        self.state = LifecycleState::Manipulated;
        Ok(self.check.manipulate(&self.context))
    }

    pub fn validate(&mut self) -> Result<Script> {
        self.expect(LifecycleState::Manipulated, "validate")?;
        self.state = LifecycleState::Validated;
        Ok(self.check.validate(&self.context))
    }

    fn expect(&self, required: LifecycleState, requested: &str) -> Result<()> {
        if self.state == required {
            Ok(())
        } else {
            Err(CheckError::InvalidTransition {
                check: self.check.name().to_string(),
                from: self.state.name().to_string(),
                to: requested.to_string(),
            })
        }
    }
}
