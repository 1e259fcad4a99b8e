//! # Finding and Severity Definitions
//!
//! @title Security Finding Data Structures
//! @author Ramprasad
//!
//! Defines the core data structures for representing security findings
//! and their severity classification.

use colored::*;
use serde::{Deserialize, Serialize};

/// Severity level classification for security findings.
///
/// Ordered from lowest to highest severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational finding, no direct security impact.
    Info = 0,

    /// Low severity, minimal security impact.
    Low = 1,

    /// Medium severity, moderate security impact.
    Medium = 2,

    /// High severity, significant security impact.
    High = 3,

    /// Critical severity, severe security impact.
    Critical = 4,
}

impl Severity {
    /// Parses a severity level from a string.
    ///
    /// Unknown values default to `Info`.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Info,
        }
    }

    /// Returns a colored label for terminal output.
    pub fn colored_label(&self) -> ColoredString {
        match self {
            Severity::Critical => "CRITICAL".white().on_red().bold(),
            Severity::High => "HIGH".black().on_yellow().bold(),
            Severity::Medium => "MEDIUM".white().on_bright_blue().bold(),
            Severity::Low => "LOW".black().on_white().bold(),
            Severity::Info => "INFO".black().on_bright_white(),
        }
    }

    /// Returns the GitHub Actions annotation level for the severity.
    pub fn annotation_level(&self) -> &'static str {
        match self {
            Severity::Critical | Severity::High => "error",
            Severity::Medium => "warning",
            Severity::Low | Severity::Info => "notice",
        }
    }

    /// Returns a Markdown badge for the severity.
    pub fn markdown_badge(&self) -> &'static str {
        match self {
            Severity::Critical => {
                "![Critical](https://img.shields.io/badge/severity-CRITICAL-red)"
            }
            Severity::High => "![High](https://img.shields.io/badge/severity-HIGH-orange)",
            Severity::Medium => "![Medium](https://img.shields.io/badge/severity-MEDIUM-yellow)",
            Severity::Low => "![Low](https://img.shields.io/badge/severity-LOW-blue)",
            Severity::Info => "![Info](https://img.shields.io/badge/severity-INFO-lightgrey)",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Critical => write!(f, "Critical"),
            Severity::High => write!(f, "High"),
            Severity::Medium => write!(f, "Medium"),
            Severity::Low => write!(f, "Low"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

/// Represents a security finding in a workflow file.
///
/// Besides reporting metadata, a finding carries everything the patch
/// generator needs: the workflow path, the dangerous expression and the
/// line of the `run:` block that uses it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Unique identifier for this finding instance.
    pub id: String,

    /// ID of the detector that produced this finding (e.g., "W001").
    pub detector_id: String,

    /// Short, descriptive title of the finding.
    pub title: String,

    /// Detailed description of the vulnerability.
    pub description: String,

    /// Severity classification.
    pub severity: Severity,

    /// Repository-relative path of the workflow file.
    pub file_path: String,

    /// 1-based line of the `run:` key containing the dangerous use.
    pub line: usize,

    /// Location identifier (e.g., "path:line").
    pub location: String,

    /// The source line where the expression appears.
    pub code_snippet: Option<String>,

    /// The dangerous expression as written between `${{` and `}}`.
    pub snippet: String,

    /// Remediation guidance for fixing the vulnerability.
    pub remediation: String,

    /// CWE (Common Weakness Enumeration) identifier if applicable.
    pub cwe: Option<String>,

    /// Unified diff fixing the finding, when one could be generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

impl Finding {
    /// Builds a bare script injection finding.
    ///
    /// Used when a finding comes from outside the detectors, e.g. the
    /// `patch` subcommand.
    pub fn script_injection(file_path: &str, snippet: &str, line: usize) -> Self {
        let expression = snippet.trim();
        Self {
            id: format!("W001-{}", line),
            detector_id: "W001".to_string(),
            title: "Script injection from untrusted input".to_string(),
            description: format!("`${{{{ {} }}}}` is expanded directly inside a shell command.", expression),
            severity: Severity::Critical,
            file_path: file_path.to_string(),
            line,
            location: format!("{}:{}", file_path, line),
            code_snippet: None,
            snippet: snippet.to_string(),
            remediation: "Pass the value through an environment variable and quote it.".to_string(),
            cwe: Some("CWE-78".to_string()),
            patch: None,
        }
    }

    /// Prints the finding to terminal with color formatting.
    ///
    /// # Arguments
    ///
    /// * `index` - The finding number for display.
    pub fn print_terminal(&self, index: usize) {
        println!();
        println!(
            "{} {} [{}] {}",
            format!("#{}", index).cyan().bold(),
            self.severity.colored_label(),
            self.detector_id.yellow(),
            self.title.white().bold()
        );

        println!(
            "   {} {}:{}",
            "Location:".dimmed(),
            self.file_path.blue(),
            self.line.to_string().cyan()
        );

        for line in self.description.lines() {
            println!("   {}", line.dimmed());
        }

        if let Some(ref snippet) = self.code_snippet {
            println!("\n   {}", "Code:".yellow());
            for line in snippet.lines() {
                println!("   {}", line.bright_white());
            }
        }

        if let Some(ref cwe) = self.cwe {
            println!("   {} {}", "Reference:".dimmed(), cwe.blue());
        }

        println!("\n   {}", "Remediation:".green());
        for line in self.remediation.lines().take(3) {
            println!("   {}", line.green().dimmed());
        }

        if let Some(ref patch) = self.patch {
            println!("\n   {}", "Suggested patch:".green());
            for line in patch.lines() {
                let colored = if line.starts_with('+') && !line.starts_with("+++") {
                    line.green()
                } else if line.starts_with('-') && !line.starts_with("---") {
                    line.red()
                } else {
                    line.normal()
                };
                println!("   {}", colored);
            }
        }

        println!("{}", "-".repeat(60).dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::Low > Severity::Info);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("critical"), Severity::Critical);
        assert_eq!(Severity::parse("HIGH"), Severity::High);
        assert_eq!(Severity::parse("unknown"), Severity::Info);
    }

    #[test]
    fn test_script_injection_finding() {
        let finding = Finding::script_injection(".github/workflows/ci.yml", " github.head_ref ", 12);
        assert_eq!(finding.location, ".github/workflows/ci.yml:12");
        assert_eq!(finding.description, "`${{ github.head_ref }}` is expanded directly inside a shell command.");
        assert!(finding.patch.is_none());
    }

    #[test]
    fn test_patch_is_omitted_from_json_when_absent() {
        let finding = Finding::script_injection("ci.yml", "github.head_ref", 3);
        let json = serde_json::to_string(&finding).unwrap();
        assert!(!json.contains("\"patch\""));
        assert!(json.contains("\"severity\":\"critical\""));
    }
}
