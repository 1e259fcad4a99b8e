//! # W001 - Script Injection Detector
//!
//! @title Untrusted Input in `run:` Commands
//! @author Ramprasad
//!
//! Detects GitHub context values controlled by outside contributors that are
//! expanded with `${{ }}` directly inside a shell command. The expression is
//! substituted before the shell runs, so a crafted issue title or branch name
//! becomes part of the script.
//!
//! ## Vulnerability Pattern
//!
//! ```yaml
//! # VULNERABLE: the comment body is pasted into the script
//! - run: echo "${{ github.event.comment.body }}"
//! ```
//!
//! ## Secure Pattern
//!
//! ```yaml
//! # SECURE: the shell reads an environment variable
//! env:
//!   COMMENT_BODY: ${{ github.event.comment.body }}
//! ...
//! - run: echo "$COMMENT_BODY"
//! ```
//!
//! ## CWE Reference
//!
//! - CWE-78: Improper Neutralization of Special Elements used in an OS Command

use crate::catalog;
use crate::detectors::{create_finding, VulnerabilityDetector};
use crate::parser::WorkflowContext;
use crate::report::{Finding, Severity};
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static EXPRESSION: OnceLock<Regex> = OnceLock::new();

/// Matches `${{ ... }}` and captures the text between the delimiters.
fn expression() -> &'static Regex {
    EXPRESSION.get_or_init(|| Regex::new(r"\$\{\{([^{}]*)\}\}").expect("valid expression regex"))
}

/// Detector for untrusted expressions in `run:` blocks.
pub struct ScriptInjectionDetector;

impl VulnerabilityDetector for ScriptInjectionDetector {
    fn id(&self) -> &'static str {
        "W001"
    }

    fn name(&self) -> &'static str {
        "Script Injection"
    }

    fn description(&self) -> &'static str {
        "Detects attacker-controlled GitHub context values expanded directly inside run: commands."
    }

    fn severity(&self) -> Severity {
        Severity::Critical
    }

    fn cwe(&self) -> Option<&'static str> {
        Some("CWE-78")
    }

    fn remediation(&self) -> &'static str {
        "Move the expression into an env: variable and reference it as \"$NAME\" in the script."
    }

    fn detect(&self, context: &WorkflowContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for block in &context.run_blocks {
            let mut seen = HashSet::new();

            for (_, text) in &block.lines {
                for capture in expression().captures_iter(text) {
                    let raw = &capture[1];
                    let Some(pattern) = catalog::classify(raw) else {
                        continue;
                    };
                    if !seen.insert(raw.trim().to_string()) {
                        continue;
                    }

                    log::debug!(
                        "{}:{}: untrusted `{}` ({})",
                        context.file_path,
                        block.line,
                        raw.trim(),
                        pattern.env_name
                    );

                    findings.push(create_finding(
                        self,
                        context,
                        "Script injection from untrusted input".to_string(),
                        format!(
                            "`${{{{ {} }}}}` is expanded directly inside a run: command. \
                             Its value can be set by outside contributors and is executed by the shell.",
                            raw.trim()
                        ),
                        block.line,
                        raw.to_string(),
                        Some(text.trim().to_string()),
                    ));
                }
            }
        }

        findings
    }
}
