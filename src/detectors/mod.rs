//! # Vulnerability Detector Module
//!
//! @title Workflow Vulnerability Detection Framework
//! @author Ramprasad
//!
//! This module provides the framework for vulnerability detection in GitHub
//! Actions workflows and contains the detector implementations.
//!
//! ## Architecture
//!
//! All detectors implement the [`VulnerabilityDetector`] trait, which provides
//! a consistent interface for detection, severity classification, and remediation
//! guidance.
//!
//! ## Available Detectors
//!
//! | ID | Name | Severity |
//! |----|------|----------|
//! | W001 | Script Injection | Critical |

mod script_injection;

pub use script_injection::ScriptInjectionDetector;

use crate::parser::WorkflowContext;
use crate::report::{Finding, Severity};

/// Trait for implementing vulnerability detectors.
///
/// All detectors must implement this trait to be registered with the
/// [`DetectorRegistry`].
///
/// # Example Implementation
///
/// ```rust,ignore
/// pub struct MyDetector;
///
/// impl VulnerabilityDetector for MyDetector {
///     fn id(&self) -> &'static str { "W999" }
///     fn name(&self) -> &'static str { "My Vulnerability" }
///     fn description(&self) -> &'static str { "Detects my vulnerability" }
///     fn severity(&self) -> Severity { Severity::High }
///     fn remediation(&self) -> &'static str { "Fix the issue" }
///
///     fn detect(&self, context: &WorkflowContext) -> Vec<Finding> {
///         Vec::new()
///     }
/// }
/// ```
pub trait VulnerabilityDetector: Send + Sync {
    /// Returns the unique identifier for this detector.
    ///
    /// Format: "Wnnn" where nnn is a zero-padded number (e.g., "W001").
    fn id(&self) -> &'static str;

    /// Returns the human-readable name of the vulnerability.
    fn name(&self) -> &'static str;

    /// Returns a detailed description of what this detector looks for.
    fn description(&self) -> &'static str;

    /// Returns the default severity level for findings from this detector.
    fn severity(&self) -> Severity;

    /// Runs the detector against a loaded workflow.
    fn detect(&self, context: &WorkflowContext) -> Vec<Finding>;

    /// Returns the CWE (Common Weakness Enumeration) ID if applicable.
    fn cwe(&self) -> Option<&'static str> {
        None
    }

    /// Returns remediation advice for addressing this vulnerability.
    fn remediation(&self) -> &'static str;
}

/// Registry containing all available vulnerability detectors.
///
/// # Example
///
/// ```rust,ignore
/// let registry = DetectorRegistry::new();
/// let findings = registry.run_all(&context);
/// ```
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn VulnerabilityDetector>>,
}

impl DetectorRegistry {
    /// Creates a new registry with all default detectors.
    pub fn new() -> Self {
        let detectors: Vec<Box<dyn VulnerabilityDetector>> =
            vec![Box::new(ScriptInjectionDetector)];

        Self { detectors }
    }

    /// Returns a reference to all registered detectors.
    pub fn detectors(&self) -> &[Box<dyn VulnerabilityDetector>] {
        &self.detectors
    }

    /// Runs all detectors against the given context.
    ///
    /// Findings are sorted by severity (Critical first), then by line.
    pub fn run_all(&self, context: &WorkflowContext) -> Vec<Finding> {
        let mut all_findings: Vec<Finding> = self
            .detectors
            .iter()
            .flat_map(|detector| detector.detect(context))
            .collect();

        all_findings.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.line.cmp(&b.line)));

        all_findings
    }

    /// Retrieves a detector by its ID.
    pub fn get_detector(&self, id: &str) -> Option<&dyn VulnerabilityDetector> {
        self.detectors
            .iter()
            .find(|detector| detector.id().eq_ignore_ascii_case(id))
            .map(|detector| detector.as_ref())
    }
}

impl Default for DetectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper function to create a finding from a detector.
///
/// Standardizes the creation of findings with consistent formatting.
///
/// # Arguments
///
/// * `detector` - The detector creating the finding
/// * `context` - The workflow being analyzed
/// * `title` - Short title describing the finding
/// * `description` - Detailed description of the vulnerability
/// * `line` - 1-based line of the `run:` block
/// * `snippet` - The dangerous expression as written
/// * `code_snippet` - The source line showing the dangerous use
pub fn create_finding(
    detector: &dyn VulnerabilityDetector,
    context: &WorkflowContext,
    title: String,
    description: String,
    line: usize,
    snippet: String,
    code_snippet: Option<String>,
) -> Finding {
    Finding {
        id: format!("{}-{}-{}", detector.id(), line, fingerprint(&context.file_path, &snippet)),
        detector_id: detector.id().to_string(),
        title,
        description,
        severity: detector.severity(),
        file_path: context.file_path.clone(),
        line,
        location: format!("{}:{}", context.file_path, line),
        code_snippet,
        snippet,
        remediation: detector.remediation().to_string(),
        cwe: detector.cwe().map(|s| s.to_string()),
        patch: None,
    }
}

/// Short hash telling apart findings on the same line.
///
/// Deterministic for a given build of the tool. `DefaultHasher` may change
/// between Rust releases, so IDs are not meant to be stored.
fn fingerprint(path: &str, snippet: &str) -> String {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    path.hash(&mut hasher);
    snippet.trim().hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = DetectorRegistry::new();
        assert!(!registry.detectors().is_empty());
        assert!(registry.get_detector("w001").is_some());
        assert!(registry.get_detector("V001").is_none());
    }

    #[test]
    fn test_detector_ids_unique() {
        let registry = DetectorRegistry::new();
        let mut ids: Vec<_> = registry.detectors().iter().map(|d| d.id()).collect();
        let len_before = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), len_before, "Detector IDs must be unique");
    }

    #[test]
    fn test_finding_ids_are_deterministic() {
        let context = WorkflowContext::from_source("ci.yml", String::new());
        let make = |snippet: &str| {
            create_finding(
                &ScriptInjectionDetector,
                &context,
                "t".to_string(),
                "d".to_string(),
                3,
                snippet.to_string(),
                None,
            )
        };
        assert_eq!(make(" github.head_ref ").id, make("github.head_ref").id);
        assert_ne!(make("github.head_ref").id, make("github.event.issue.title").id);
        assert!(make("github.head_ref").id.starts_with("W001-3-"));
    }
}
