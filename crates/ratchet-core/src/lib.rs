//! ratchet-core - the generic upgrade-compatibility check protocol
//!
//! Provides the pieces a version-gated, three-phase check is built from:
//! - A [`Version`] predicate (parse, compare, total order)
//! - An immutable [`Script`] model of mutation/assertion command blocks
//! - The [`Check`] trait and its lifecycle state machine
//! - [`VersionGate`] for version-conditional expected output
//! - A sequential [`CheckRunner`] driving phases across upgrade boundaries

pub mod check;
pub mod error;
pub mod fakes;
pub mod gate;
pub mod runner;
pub mod script;
pub mod version;

// Re-export key types
pub use check::{Check, CheckContext, CheckLifecycle, Phase};
pub use error::{CheckError, Result};
pub use gate::VersionGate;
pub use runner::{
    CheckOutcome, CheckReport, CheckRunner, PhaseResult, ScriptFailure, ScriptInterpreter,
    UpgradeDriver,
};
pub use script::{Block, Script};
pub use version::Version;
