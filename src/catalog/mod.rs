//! # Unsafe Expression Catalog
//!
//! @title Untrusted Input Catalog
//! @author Ramprasad
//!
//! Static table of GitHub Actions expressions that carry attacker-controlled
//! text, each mapped to the environment variable name used when remediating
//! a script injection.
//!
//! ## Ordering
//!
//! Entries are matched in declaration order and the first match wins. Several
//! fragments alias to the same variable (e.g. `commits[0].message` and
//! `head_commit.message` both become `COMMIT_MESSAGE`). Canonical names are
//! part of the generated patches, so existing names must never change.

use regex::Regex;
use std::sync::OnceLock;

/// Wildcard used inside fragments. Never crosses an expression delimiter.
const ANY: &str = r"[^{}]*?";

/// Catalog source: canonical variable name and fragment regex.
///
/// `{any}` in a fragment is expanded to [`ANY`].
const ENTRIES: &[(&str, &str)] = &[
    ("AUTHOR_EMAIL", r"github\.event\.commits{any}\.author\.email"),
    ("AUTHOR_EMAIL", r"github\.event\.head_commit\.author\.email"),
    ("AUTHOR_NAME", r"github\.event\.commits{any}\.author\.name"),
    ("AUTHOR_NAME", r"github\.event\.head_commit\.author\.name"),
    ("COMMENT_BODY", r"github\.event\.comment\.body"),
    ("COMMIT_MESSAGE", r"github\.event\.commits{any}\.message"),
    ("COMMIT_MESSAGE", r"github\.event\.head_commit\.message"),
    ("ISSUE_BODY", r"github\.event\.issue\.body"),
    ("ISSUE_TITLE", r"github\.event\.issue\.title"),
    ("PAGE_NAME", r"github\.event\.pages{any}\.page_name"),
    ("PR_BODY", r"github\.event\.pull_request\.body"),
    ("PR_DEFAULT_BRANCH", r"github\.event\.pull_request\.head\.repo\.default_branch"),
    ("PR_HEAD_LABEL", r"github\.event\.pull_request\.head\.label"),
    ("PR_HEAD_REF", r"github\.event\.pull_request\.head\.ref"),
    ("PR_TITLE", r"github\.event\.pull_request\.title"),
    ("REVIEW_BODY", r"github\.event\.review\.body"),
    ("REVIEW_COMMENT_BODY", r"github\.event\.review_comment\.body"),
    ("HEAD_REF", r"github\.head_ref"),
];

/// A family of untrusted expressions and how to rewrite them.
#[derive(Debug)]
pub struct UnsafePattern {
    /// Environment variable the expression is moved into.
    pub env_name: &'static str,

    /// Fragment regex as declared in the catalog (after wildcard expansion).
    pub fragment: String,

    /// Matches a raw, unwrapped expression such as `github.head_ref`.
    identity: Regex,

    /// Matches the wrapped occurrence `{{ ... github.head_ref ... }}` inside
    /// command text. The leading `$` is left outside the match so the
    /// rewritten command reads `$HEAD_REF`.
    occurrence: Regex,
}

impl UnsafePattern {
    fn new(env_name: &'static str, source: &str) -> Self {
        let fragment = source.replace("{any}", ANY);
        let identity = Regex::new(&fragment).expect("catalog fragment is a valid regex");
        let occurrence = Regex::new(&format!(r"\{{\{{\s*{ANY}{fragment}{ANY}\s*\}}\}}"))
            .expect("catalog occurrence is a valid regex");

        Self {
            env_name,
            fragment,
            identity,
            occurrence,
        }
    }

    /// Human-readable fragment, e.g. `github.event.commits*.message`.
    pub fn display_fragment(&self) -> String {
        self.fragment.replace(ANY, "*").replace('\\', "")
    }

    /// Returns true if the raw expression belongs to this family.
    pub fn identifies(&self, expression: &str) -> bool {
        self.identity.is_match(expression)
    }

    /// Returns true if the line contains a wrapped occurrence of this family.
    pub fn occurs_in(&self, line: &str) -> bool {
        self.occurrence.is_match(line)
    }

    /// Replaces every wrapped occurrence in `line` with the bare variable name.
    pub fn replace_occurrences(&self, line: &str) -> String {
        self.occurrence
            .replace_all(line, regex::NoExpand(self.env_name))
            .into_owned()
    }
}

static CATALOG: OnceLock<Vec<UnsafePattern>> = OnceLock::new();

/// Returns the catalog, compiling it on first use.
pub fn catalog() -> &'static [UnsafePattern] {
    CATALOG.get_or_init(|| {
        ENTRIES
            .iter()
            .map(|(name, source)| UnsafePattern::new(name, source))
            .collect()
    })
}

/// Finds the pattern family for a dangerous expression.
///
/// The snippet is trimmed before matching. Returns `None` when no entry
/// matches, which callers treat as "cannot remediate".
pub fn classify(snippet: &str) -> Option<&'static UnsafePattern> {
    let expression = snippet.trim();
    catalog().iter().find(|p| p.identifies(expression))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_expressions() {
        let cases = [
            ("github.event.comment.body", "COMMENT_BODY"),
            (" github.event.issue.title ", "ISSUE_TITLE"),
            ("github.event.commits[0].author.email", "AUTHOR_EMAIL"),
            ("github.event.head_commit.author.name", "AUTHOR_NAME"),
            ("github.event.commits.*.message", "COMMIT_MESSAGE"),
            ("github.event.pages[1].page_name", "PAGE_NAME"),
            ("github.event.pull_request.head.repo.default_branch", "PR_DEFAULT_BRANCH"),
            ("github.head_ref", "HEAD_REF"),
        ];

        for (snippet, expected) in cases {
            let pattern = classify(snippet).expect(snippet);
            assert_eq!(pattern.env_name, expected, "snippet: {snippet}");
        }
    }

    #[test]
    fn test_classify_unknown_expression() {
        assert!(classify("github.event.repository.name").is_none());
        assert!(classify("").is_none());
    }

    #[test]
    fn test_classify_is_deterministic() {
        let first = classify("github.event.pull_request.body").map(|p| p.fragment.clone());
        let second = classify("github.event.pull_request.body").map(|p| p.fragment.clone());
        assert_eq!(first, second);
    }

    #[test]
    fn test_first_entry_wins() {
        // commits[0].author.email must not be claimed by the later
        // COMMIT_MESSAGE family even though both start with `commits`.
        let pattern = classify("github.event.commits[0].author.email").unwrap();
        assert_eq!(pattern.env_name, "AUTHOR_EMAIL");
        assert!(pattern.fragment.contains("commits"));
    }

    #[test]
    fn test_replace_keeps_dollar_sign() {
        let pattern = classify("github.event.comment.body").unwrap();
        let line = r#"      - run: echo "${{ github.event.comment.body }}""#;
        assert_eq!(
            pattern.replace_occurrences(line),
            r#"      - run: echo "$COMMENT_BODY""#
        );
    }

    #[test]
    fn test_replace_stays_inside_one_expression() {
        let pattern = classify("github.event.comment.body").unwrap();
        let line = r#"echo "${{ github.event.issue.title }}" "${{github.event.comment.body}}""#;
        assert_eq!(
            pattern.replace_occurrences(line),
            r#"echo "${{ github.event.issue.title }}" "$COMMENT_BODY""#
        );
    }

    #[test]
    fn test_display_fragment() {
        let pattern = classify("github.event.commits[0].message").unwrap();
        assert_eq!(pattern.display_fragment(), "github.event.commits*.message");
    }

    #[test]
    fn test_catalog_order() {
        let names: Vec<&str> = catalog().iter().map(|p| p.env_name).collect();
        assert_eq!(names.len(), 18);
        assert_eq!(names[0], "AUTHOR_EMAIL");
        assert_eq!(names[16], "REVIEW_COMMENT_BODY");
        assert_eq!(names[17], "HEAD_REF");
    }
}
