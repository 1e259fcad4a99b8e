//! # Report Module
//!
//! @title Workflow Scan Report
//! @author Ramprasad
//!
//! Collects the findings of one scan, grouped by workflow file, together
//! with how many of them received an automated patch. Rendered as terminal
//! output, JSON, Markdown or GitHub annotations.
//!
//! ## Key Types
//!
//! - [`Report`] - Findings of a scan and their summary
//! - [`Finding`] - One untrusted expression in a `run:` command
//! - [`Severity`] - Severity classification for findings

mod finding;
mod formatter;

pub use finding::{Finding, Severity};
pub use formatter::{to_github_annotations, to_markdown};

use colored::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// Result of scanning a repository's workflows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub findings: Vec<Finding>,
    pub summary: ReportSummary,
}

/// Where and when the scan ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub version: String,

    /// Seconds since the Unix epoch.
    pub timestamp: String,

    pub scanned_path: String,

    /// Workflow files that were read, with or without findings.
    pub files_analyzed: usize,
}

/// Counts over the findings of a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,

    /// Distinct workflow files with at least one finding.
    pub workflows_affected: usize,

    /// Findings carrying an automated patch.
    pub patched: usize,

    /// Findings that need a manual fix.
    pub unpatched: usize,
}

impl Report {
    /// Builds a report and its summary.
    ///
    /// `files_analyzed` counts every workflow read, which is usually more
    /// than the workflows that show up in `findings`.
    pub fn new(findings: Vec<Finding>, scanned_path: PathBuf, files_analyzed: usize) -> Self {
        let summary = ReportSummary::from_findings(&findings);

        let metadata = ReportMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: unix_timestamp(),
            scanned_path: scanned_path.display().to_string(),
            files_analyzed,
        };

        Self {
            metadata,
            findings,
            summary,
        }
    }

    /// Findings keyed by workflow path, in path order.
    pub fn findings_by_workflow(&self) -> BTreeMap<&str, Vec<&Finding>> {
        let mut grouped: BTreeMap<&str, Vec<&Finding>> = BTreeMap::new();
        for finding in &self.findings {
            grouped.entry(finding.file_path.as_str()).or_default().push(finding);
        }
        grouped
    }

    /// Prints every finding under a header for its workflow.
    pub fn print_terminal(&self) {
        if self.findings.is_empty() {
            println!(
                "\n{}",
                format!(
                    "[+] No untrusted expressions in run: commands ({} workflow(s) checked).",
                    self.metadata.files_analyzed
                )
                .green()
                .bold()
            );
            return;
        }

        let mut index = 1;
        for (workflow, findings) in self.findings_by_workflow() {
            println!("\n{} {}", "[!] Workflow:".red().bold(), workflow.yellow().bold());
            println!("{}", "=".repeat(60).cyan());

            for finding in findings {
                finding.print_terminal(index);
                index += 1;
            }
        }
    }

    /// Prints severity counts and patch coverage.
    pub fn print_summary(&self) {
        let summary = &self.summary;

        if summary.total == 0 {
            println!(
                "{}",
                format!("[+] {} workflow(s) clean.", self.metadata.files_analyzed)
                    .green()
                    .bold()
            );
            return;
        }

        let headline = format!(
            "[!] {} injection point(s) in {} of {} workflow(s)",
            summary.total, summary.workflows_affected, self.metadata.files_analyzed
        );
        if summary.critical > 0 {
            println!("{}", headline.red().bold());
        } else if summary.high > 0 {
            println!("{}", headline.yellow().bold());
        } else {
            println!("{}", headline.blue().bold());
        }

        println!(
            "    {} Critical | {} High | {} Medium | {} Low | {} Info",
            summary.critical, summary.high, summary.medium, summary.low, summary.info
        );

        if summary.patched > 0 {
            println!(
                "{}",
                format!("[+] {} with an automated patch", summary.patched).green()
            );
        }
        if summary.unpatched > 0 {
            println!(
                "{}",
                format!("[-] {} to fix by hand", summary.unpatched).yellow()
            );
        }
    }

    pub fn to_markdown(&self) -> String {
        formatter::to_markdown(self)
    }

    pub fn to_github_annotations(&self) -> String {
        formatter::to_github_annotations(self)
    }
}

impl ReportSummary {
    fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = ReportSummary {
            total: findings.len(),
            ..Default::default()
        };

        for finding in findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }

        summary.patched = findings.iter().filter(|f| f.patch.is_some()).count();
        summary.unpatched = summary.total - summary.patched;
        summary.workflows_affected = findings
            .iter()
            .map(|f| f.file_path.as_str())
            .collect::<BTreeSet<_>>()
            .len();

        summary
    }
}

fn unix_timestamp() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let duration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", duration.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings() -> Vec<Finding> {
        let mut patched = Finding::script_injection("b.yml", "github.head_ref", 10);
        patched.patch = Some("--- a/b.yml\n".to_string());
        vec![
            patched,
            Finding::script_injection("b.yml", "github.event.issue.title", 20),
            Finding::script_injection("a.yml", "github.event.issue.body", 4),
        ]
    }

    #[test]
    fn test_summary_counts_patch_coverage() {
        let report = Report::new(findings(), PathBuf::from("./repo"), 5);

        assert_eq!(report.summary.critical, 3);
        assert_eq!(report.summary.total, 3);
        assert_eq!(report.summary.patched, 1);
        assert_eq!(report.summary.unpatched, 2);
        assert_eq!(report.summary.workflows_affected, 2);
        assert_eq!(report.metadata.files_analyzed, 5);
    }

    #[test]
    fn test_findings_grouped_by_workflow() {
        let report = Report::new(findings(), PathBuf::from("."), 2);
        let grouped = report.findings_by_workflow();

        let workflows: Vec<&str> = grouped.keys().copied().collect();
        assert_eq!(workflows, vec!["a.yml", "b.yml"]);
        assert_eq!(grouped["b.yml"].len(), 2);
        assert_eq!(grouped["b.yml"][0].line, 10);
    }

    #[test]
    fn test_empty_report() {
        let report = Report::new(Vec::new(), PathBuf::from("."), 3);
        assert_eq!(report.summary.total, 0);
        assert_eq!(report.summary.workflows_affected, 0);
        assert!(report.findings_by_workflow().is_empty());
    }
}
