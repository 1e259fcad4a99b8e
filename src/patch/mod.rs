//! # Patch Generation Module
//!
//! @title Script Injection Remediation Patches
//! @author Ramprasad
//!
//! Generates a unified diff that fixes a script injection finding by moving
//! the untrusted expression out of the `run:` command and into a
//! workflow-level environment variable.
//!
//! ## Example
//!
//! ```text
//!  on:
//!    issue_comment:
//!
//! +env:
//! +  COMMENT_BODY: ${{ github.event.comment.body }}
//! +
//!  jobs:
//!    ...
//! -      - run: echo "${{ github.event.comment.body }}"
//! +      - run: echo "$COMMENT_BODY"
//! ```
//!
//! ## Submodules
//!
//! - [`injector`] - The two structural edits on the workflow lines
//! - [`diff`] - Unified diff rendering

pub mod diff;
mod error;
pub mod injector;

pub use diff::{DiffError, DiffRenderer, UnifiedDiffRenderer};
pub use error::PatchError;

use crate::catalog;
use crate::report::Finding;
use crate::workflow::Document;

/// Fixes the script injection described by `finding` and returns a unified
/// diff users can apply with `git apply` or `patch -p1`.
///
/// Any failure yields an empty string: remediation is optional and must
/// never interrupt the scan that produced the finding.
pub fn generate_patch(finding: &Finding, content: &str) -> String {
    generate_patch_with(&UnifiedDiffRenderer, finding, content)
}

/// Same as [`generate_patch`] with a caller-supplied diff renderer.
pub fn generate_patch_with(
    renderer: &dyn DiffRenderer,
    finding: &Finding,
    content: &str,
) -> String {
    match try_generate_patch(renderer, finding, content) {
        Ok(patch) => patch,
        Err(e) => {
            log::debug!(
                "No patch for {}:{} ({}): {}",
                finding.file_path,
                finding.line,
                finding.snippet.trim(),
                e
            );
            String::new()
        }
    }
}

/// Generates the patch, keeping the failure cause.
pub fn try_generate_patch(
    renderer: &dyn DiffRenderer,
    finding: &Finding,
    content: &str,
) -> Result<String, PatchError> {
    let patched = patch_workflow(finding, content)?;
    let diff = renderer.render(&finding.file_path, content, &patched)?;
    Ok(diff)
}

/// Returns the patched workflow text without the script injection.
pub fn patch_workflow(finding: &Finding, content: &str) -> Result<String, PatchError> {
    let expression = finding.snippet.trim();
    let pattern = catalog::classify(expression)
        .ok_or_else(|| PatchError::UnknownExpression(expression.to_string()))?;

    let document = Document::parse(content);
    let run_index = finding
        .line
        .checked_sub(1)
        .ok_or(PatchError::LineOutOfRange {
            line: finding.line,
            total: document.len(),
        })?;

    let patched = injector::inject(&document, pattern, expression, run_index)?;
    Ok(patched.to_text())
}

/// Returns true if the patch for `finding` rewrites its `run:` command.
///
/// Detection reads a `run:` script across blank lines but the rewrite stops
/// at the first one, so an expression below such a gap yields a patch that
/// only declares the variable.
pub fn fixes_command(finding: &Finding, content: &str) -> bool {
    let Some(pattern) = catalog::classify(&finding.snippet) else {
        return false;
    };
    let Some(run_index) = finding.line.checked_sub(1) else {
        return false;
    };

    injector::rewrites_command(&Document::parse(content), pattern, run_index)
}
