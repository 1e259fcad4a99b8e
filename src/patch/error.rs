//! Failure causes for patch generation.
//!
//! None of these reach the caller of [`super::generate_patch`]; they are
//! collapsed to an empty patch there and kept only for logging and tests.

use super::diff::DiffError;
use thiserror::Error;

/// Reasons a remediation patch could not be produced.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// The expression is not in the unsafe expression catalog.
    #[error("no remediation is known for expression `{0}`")]
    UnknownExpression(String),

    /// The finding points outside the workflow.
    #[error("line {line} is outside the workflow ({total} lines)")]
    LineOutOfRange { line: usize, total: usize },

    /// The required top-level `on:` key is missing.
    #[error("workflow has no `on:` key")]
    MissingTriggers,

    /// No `jobs:` key at the global indentation to place a new `env:` block.
    #[error("workflow has no `jobs:` key at indentation {0}")]
    MissingJobs(usize),

    /// The unified diff could not be rendered.
    #[error("could not render diff: {0}")]
    Render(#[from] DiffError),
}
