//! In-memory fakes for the runner seams (testing only)
//!
//! Provides `RecordingInterpreter` and `StaticUpgradeDriver` that satisfy
//! the trait contracts without a live system under test.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::runner::{ScriptFailure, ScriptInterpreter, UpgradeDriver};
use crate::script::Script;
use crate::version::Version;

/// Interpreter that records every rendered script and can be armed to fail
/// at a given script ordinal with a scripted [`ScriptFailure`].
#[derive(Debug, Default)]
pub struct RecordingInterpreter {
    executed: Mutex<Vec<String>>,
    failure: Mutex<Option<(usize, ScriptFailure)>>,
}

impl RecordingInterpreter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the `ordinal`-th executed script (0-based) with `failure`. The
    /// script is still recorded before the failure is returned.
    pub fn fail_at(&self, ordinal: usize, failure: ScriptFailure) {
        *self.failure.lock().unwrap() = Some((ordinal, failure));
    }

    /// Rendered text of every script executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScriptInterpreter for RecordingInterpreter {
    async fn execute(&self, script: &Script) -> Result<(), ScriptFailure> {
        let ordinal = {
            let mut executed = self.executed.lock().unwrap();
            executed.push(script.render());
            executed.len() - 1
        };

        let armed = self.failure.lock().unwrap();
        if let Some((fail_ordinal, failure)) = armed.as_ref() {
            if *fail_ordinal == ordinal {
                return Err(failure.clone());
            }
        }
        Ok(())
    }
}

/// Driver that steps through a fixed version sequence, one entry per
/// upgrade boundary. The final step re-reports the last version.
#[derive(Debug)]
pub struct StaticUpgradeDriver {
    steps: Vec<Version>,
}

impl StaticUpgradeDriver {
    pub fn new(steps: Vec<Version>) -> Self {
        Self { steps }
    }
}

#[async_trait]
impl UpgradeDriver for StaticUpgradeDriver {
    fn boundaries(&self) -> usize {
        self.steps.len()
    }

    async fn upgrade(&self, boundary: usize) -> anyhow::Result<Version> {
        self.steps
            .get(boundary)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no version step for boundary {boundary}"))
    }

    async fn finalize(&self) -> anyhow::Result<Version> {
        self.steps
            .last()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("driver has no version steps"))
    }
}
