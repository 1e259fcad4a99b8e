//! # Unified Diff Rendering
//!
//! @title Diff Renderer
//! @author Ramprasad
//!
//! Turns the original and patched workflow into a unified diff that can be
//! applied with `git apply` or `patch -p1`. Only the `---`/`+++` headers and
//! `@@` hunks are produced; there is no `diff --git` or `index` preamble.

use similar::TextDiff;
use thiserror::Error;

/// Lines of context around each hunk, as in `diff -u`.
const CONTEXT_LINES: usize = 3;

/// Errors raised while rendering a diff.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    /// Both versions are identical, so there is nothing to render.
    #[error("original and patched contents of `{0}` are identical")]
    Unchanged(String),

    /// The document path cannot be used in a diff header.
    #[error("invalid path for diff header: `{0}`")]
    InvalidPath(String),
}

/// Renders the difference between two versions of a file.
pub trait DiffRenderer: Send + Sync {
    /// Returns a unified diff of `before` -> `after` for the file at `path`.
    fn render(&self, path: &str, before: &str, after: &str) -> Result<String, DiffError>;
}

/// Myers line diff with `a/` and `b/` prefixed headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnifiedDiffRenderer;

impl DiffRenderer for UnifiedDiffRenderer {
    fn render(&self, path: &str, before: &str, after: &str) -> Result<String, DiffError> {
        if path.is_empty() || path.contains('\n') {
            return Err(DiffError::InvalidPath(path.to_string()));
        }
        if before == after {
            return Err(DiffError::Unchanged(path.to_string()));
        }

        let path = path.trim_start_matches("./");
        let diff = TextDiff::from_lines(before, after);
        let rendered = diff
            .unified_diff()
            .context_radius(CONTEXT_LINES)
            .header(&format!("a/{path}"), &format!("b/{path}"))
            .to_string();

        Ok(rendered)
    }
}
