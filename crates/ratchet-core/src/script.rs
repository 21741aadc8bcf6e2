//! Script model: ordered command blocks executed against the system under test.
//!
//! A script is opaque to the protocol beyond block ordering and
//! concatenation. Each block is either a *mutation* (a statement batch with
//! no verified output, executed as a given session role) or an *assertion*
//! (a command whose stdout must match a literal, whitespace-significant
//! expected table). The external script interpreter consumes the rendered
//! text form.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::ops::Add;

/// A single command block inside a [`Script`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// Statements issued without output verification.
    Mutation {
        /// Role the statements execute as; `None` uses the interpreter's
        /// default session.
        session: Option<String>,

        /// Statements executed in order, one per line.
        statements: Vec<String>,
    },

    /// A command whose stdout must match `expected` exactly.
    Assertion {
        /// The query or meta-command to issue.
        command: String,

        /// Literal expected output, whitespace-significant. Empty means the
        /// command must succeed and produce no output.
        expected: String,
    },
}

impl Block {
    /// Mutation block executed as `role`.
    pub fn mutation_as(role: impl Into<String>, statements: Vec<String>) -> Self {
        Block::Mutation {
            session: Some(role.into()),
            statements,
        }
    }

    /// Assertion that `command` succeeds with no output.
    pub fn statement(command: impl Into<String>) -> Self {
        Block::Assertion {
            command: command.into(),
            expected: String::new(),
        }
    }

    /// Assertion that `command`'s stdout matches `expected` exactly.
    pub fn assertion(command: impl Into<String>, expected: impl Into<String>) -> Self {
        Block::Assertion {
            command: command.into(),
            expected: expected.into(),
        }
    }

    fn render(&self) -> String {
        match self {
            Block::Mutation {
                session,
                statements,
            } => {
                let header = match session {
                    Some(role) => {
                        format!("$ execute connection=postgres://{role}@db:6875/postgres")
                    }
                    None => "$ execute".to_string(),
                };
                let mut out = header;
                for statement in statements {
                    out.push('\n');
                    out.push_str(statement);
                }
                out
            }
            Block::Assertion { command, expected } => {
                let mut out = format!("> {command}");
                if !expected.is_empty() {
                    out.push('\n');
                    out.push_str(expected.trim_end_matches('\n'));
                }
                out
            }
        }
    }
}

/// An ordered, immutable sequence of command blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    blocks: Vec<Block>,
}

impl Script {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Script with no blocks. Concatenation identity.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Concatenate two scripts, preserving block order.
    pub fn concat(mut self, other: Script) -> Script {
        self.blocks.extend(other.blocks);
        self
    }

    /// Render to the interpreter's text form: blocks separated by a blank
    /// line, mutation blocks under the `$` sigil, assertions under `>`.
    pub fn render(&self) -> String {
        let rendered: Vec<String> = self.blocks.iter().map(Block::render).collect();
        rendered.join("\n\n")
    }

    /// Deterministic sha256 fingerprint of the rendered text. Carried in
    /// reports so a failing script can be reproduced byte-for-byte.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.render().as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl Add for Script {
    type Output = Script;

    fn add(self, other: Script) -> Script {
        self.concat(other)
    }
}

impl FromIterator<Block> for Script {
    fn from_iter<I: IntoIterator<Item = Block>>(iter: I) -> Self {
        Script::new(iter.into_iter().collect())
    }
}
