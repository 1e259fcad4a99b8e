//! Markdown and GitHub annotation output for reports.

use super::Report;
use std::fmt::Write;

/// Renders the report as a Markdown document.
///
/// Patches are embedded as `diff` code blocks below their finding.
pub fn to_markdown(report: &Report) -> String {
    let mut md = String::new();

    let _ = writeln!(md, "# Workflow Security Report\n");
    let _ = writeln!(md, "- **Scanned path:** `{}`", report.metadata.scanned_path);
    let _ = writeln!(md, "- **Workflows analyzed:** {}", report.metadata.files_analyzed);
    let _ = writeln!(md, "- **Tool version:** {}\n", report.metadata.version);

    let _ = writeln!(md, "## Summary\n");
    let _ = writeln!(md, "| Severity | Count |");
    let _ = writeln!(md, "|----------|-------|");
    let _ = writeln!(md, "| Critical | {} |", report.summary.critical);
    let _ = writeln!(md, "| High | {} |", report.summary.high);
    let _ = writeln!(md, "| Medium | {} |", report.summary.medium);
    let _ = writeln!(md, "| Low | {} |", report.summary.low);
    let _ = writeln!(md, "| Info | {} |", report.summary.info);
    let _ = writeln!(md, "| **Total** | **{}** |\n", report.summary.total);
    let _ = writeln!(
        md,
        "Automated patches: **{}**, manual fixes: **{}**\n",
        report.summary.patched, report.summary.unpatched
    );

    if report.findings.is_empty() {
        let _ = writeln!(md, "No vulnerabilities found.");
        return md;
    }

    let _ = writeln!(md, "## Findings\n");
    let mut index = 1;
    for (workflow, findings) in report.findings_by_workflow() {
        let _ = writeln!(md, "### `{}`\n", workflow);

        for finding in findings {
            let _ = writeln!(
                md,
                "#### {}. [{}] {}\n",
                index, finding.detector_id, finding.title
            );
            index += 1;

            let _ = writeln!(md, "{}\n", finding.severity.markdown_badge());
            let _ = writeln!(md, "**Location:** `{}`\n", finding.location);
            let _ = writeln!(md, "{}\n", finding.description);

            if let Some(ref code) = finding.code_snippet {
                let _ = writeln!(md, "```yaml\n{}\n```\n", code);
            }
            if let Some(ref cwe) = finding.cwe {
                let _ = writeln!(md, "**Reference:** {}\n", cwe);
            }

            let _ = writeln!(md, "**Remediation:** {}\n", finding.remediation);

            if let Some(ref patch) = finding.patch {
                let _ = writeln!(md, "```diff\n{}```\n", patch);
            }
        }
    }

    md
}

/// Renders findings as GitHub Actions workflow commands.
///
/// Format: `::error file={path},line={line},title={title}::{message}`
pub fn to_github_annotations(report: &Report) -> String {
    report
        .findings
        .iter()
        .map(|finding| {
            format!(
                "::{} file={},line={},title={}::{}\n",
                finding.severity.annotation_level(),
                escape_property(&finding.file_path),
                finding.line,
                escape_property(&finding.title),
                escape_annotation(&finding.description)
            )
        })
        .collect()
}

/// Escapes characters with special meaning in workflow command messages.
fn escape_annotation(message: &str) -> String {
    message
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escapes a `key=value` property of a workflow command.
///
/// Property values additionally reserve `,` and `:`.
fn escape_property(value: &str) -> String {
    escape_annotation(value)
        .replace(':', "%3A")
        .replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Finding;
    use std::path::PathBuf;

    fn report() -> Report {
        let mut finding = Finding::script_injection(".github/workflows/ci.yml", "github.head_ref", 8);
        finding.patch = Some("--- a/x\n+++ b/x\n".to_string());
        Report::new(vec![finding], PathBuf::from("."), 1)
    }

    #[test]
    fn test_markdown_embeds_patch() {
        let md = to_markdown(&report());
        assert!(md.contains("| Critical | 1 |"));
        assert!(md.contains("```diff\n--- a/x\n+++ b/x\n```"));
        assert!(md.contains("**Location:** `.github/workflows/ci.yml:8`"));
        assert!(md.contains("### `.github/workflows/ci.yml`"));
        assert!(md.contains("Automated patches: **1**, manual fixes: **0**"));
    }

    #[test]
    fn test_github_annotations() {
        let out = to_github_annotations(&report());
        assert!(out.starts_with("::error file=.github/workflows/ci.yml,line=8,title="));
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_escape_annotation() {
        assert_eq!(escape_annotation("50%\nnext"), "50%25%0Anext");
    }

    #[test]
    fn test_escape_property() {
        assert_eq!(escape_property("a,b:c%"), "a%2Cb%3Ac%25");
    }

    #[test]
    fn test_annotation_properties_are_escaped() {
        let mut finding = Finding::script_injection(".github/workflows/a,b.yml", "github.head_ref", 3);
        finding.title = "Injection: head ref".to_string();
        let report = Report::new(vec![finding], PathBuf::from("."), 1);

        let out = to_github_annotations(&report);
        assert!(out.starts_with(
            "::error file=.github/workflows/a%2Cb.yml,line=3,title=Injection%3A head ref::"
        ));
    }
}
