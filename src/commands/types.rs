// src/commands/types.rs
use thiserror::Error;

use super::registry::CommandRegistry;
use crate::fs::{DirectoryTree, FsError, NodeId, NodeKind};

/// Errors reported at the dispatch boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShellError {
    #[error("Unsupported command")]
    UnknownCommand { name: String },

    #[error("{command}: missing operand (expected at least {expected}, got {got})")]
    MalformedInput {
        command: String,
        expected: usize,
        got: usize,
    },

    #[error("{command}: '{target}' is a {kind}, not a directory")]
    InvalidTarget {
        command: String,
        target: String,
        kind: NodeKind,
    },

    #[error("{command}: invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        command: String,
        pattern: String,
        message: String,
    },

    #[error("{command}: cannot remove '{target}': bound to command '{binding}'")]
    CommandInUse {
        command: String,
        target: String,
        binding: String,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Output of a successful action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionOutput {
    pub stdout: String,
}

impl ActionOutput {
    pub fn success(stdout: String) -> Self {
        Self { stdout }
    }
}

/// Everything an action may read or mutate.
pub struct ActionContext<'a> {
    pub args: &'a [String],
    pub cwd: &'a mut NodeId,
    pub tree: &'a mut DirectoryTree,
    pub registry: &'a CommandRegistry,
}

/// An operation bound to an executable file.
pub trait Action: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fewest argument tokens the action accepts.
    fn min_args(&self) -> usize {
        0
    }

    /// Arguments naming existing nodes, checked against the executable's
    /// `applies_broadly` flag before the action runs.
    fn target_args<'a>(&self, args: &'a [String]) -> &'a [String] {
        args
    }

    fn execute(&self, ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError>;
}
