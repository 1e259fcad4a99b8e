//! # Block Locator
//!
//! @title Anchor Key Discovery
//! @author Ramprasad
//!
//! Finds the structural anchors needed to declare a workflow-level
//! environment variable without parsing the YAML:
//!
//! - the global indentation, taken from the required `on:` key
//! - an existing global `env:` block and where it ends
//! - the `jobs:` key, above which a new `env:` block is created
//!
//! All three are heuristics over indentation and anchored regexes. They
//! handle the usual layouts; unusual ones (flow mappings such as
//! `env: {}`, quoted keys) are not recognized.

use super::indent::{indent_of, is_blank, is_comment, spaces};
use regex::Regex;
use std::sync::OnceLock;

/// Indentation added below a newly created `env:` header.
pub const ASSUMED_INDENT: usize = 2;

static TRIGGER_KEY: OnceLock<Regex> = OnceLock::new();

fn trigger_key() -> &'static Regex {
    TRIGGER_KEY.get_or_init(|| Regex::new(r"^\s*on:").expect("valid trigger regex"))
}

/// Builds a regex matching `key:` at exactly `indent` spaces.
///
/// The key may be followed by whitespace or a trailing comment only.
fn key_at(key: &str, indent: usize) -> Regex {
    let pattern = format!(r"^{}{}:\s*(#.*)?$", spaces(indent), regex::escape(key));
    Regex::new(&pattern).expect("anchor key regex is valid")
}

/// Where a declaration goes in the global `env:` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalBlockLocation {
    /// Line index at which the declaration is inserted.
    pub insertion_index: usize,

    /// Indentation of the declared variables.
    pub variable_indent: usize,

    /// Whether the block was already present in the original document.
    pub exists: bool,
}

/// Result of looking for an existing global `env:` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvBlock {
    /// The block exists; new declarations go at `insertion_index`.
    Existing {
        insertion_index: usize,
        variable_indent: usize,
    },

    /// No `env:` key at the global indentation.
    Missing,

    /// The `env:` key is the last line, leaving no room for a declaration.
    NoRoom { label_index: usize },
}

/// Returns the indentation of the first `on:` line.
///
/// Almost always 0. `None` means the document is not a workflow.
pub fn find_global_indent(lines: &[String]) -> Option<usize> {
    lines
        .iter()
        .find(|line| trigger_key().is_match(line))
        .map(|line| indent_of(line))
}

/// Looks for a global `env:` block at `global_indent`.
///
/// The variable indentation is read from the line right after the label.
/// The block ends at the first blank line, comment line, or line that is not
/// indented deeper than `global_indent`.
pub fn find_existing_env(lines: &[String], global_indent: usize) -> EnvBlock {
    let label = key_at("env", global_indent);
    let Some(label_index) = lines.iter().position(|line| label.is_match(line)) else {
        return EnvBlock::Missing;
    };

    if label_index + 1 >= lines.len() {
        return EnvBlock::NoRoom { label_index };
    }

    let first = label_index + 1;
    let variable_indent = indent_of(&lines[first]);

    let mut end = first;
    while end < lines.len() {
        let line = &lines[end];
        if is_blank(line) || is_comment(line) || indent_of(line) <= global_indent {
            break;
        }
        end += 1;
    }

    // An empty block (the next line is a sibling key) has no declaration to
    // copy the indentation from.
    let variable_indent = if end == first || variable_indent <= global_indent {
        global_indent + ASSUMED_INDENT
    } else {
        variable_indent
    };

    EnvBlock::Existing {
        insertion_index: end,
        variable_indent,
    }
}

/// Returns the index of the `jobs:` line at `global_indent`.
pub fn find_jobs_index(lines: &[String], global_indent: usize) -> Option<usize> {
    let label = key_at("jobs", global_indent);
    lines.iter().position(|line| label.is_match(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.split('\n').map(str::to_string).collect()
    }

    #[test]
    fn test_global_indent() {
        assert_eq!(find_global_indent(&lines("name: x\non:\n  push:\n")), Some(0));
        assert_eq!(find_global_indent(&lines("  name: x\n  on: push\n")), Some(2));
        assert_eq!(find_global_indent(&lines("jobs:\n  a:\n")), None);
    }

    #[test]
    fn test_existing_env_block() {
        let doc = lines("on: push\nenv:\n  A: 1\n  B: 2\n\njobs:\n");
        assert_eq!(
            find_existing_env(&doc, 0),
            EnvBlock::Existing {
                insertion_index: 4,
                variable_indent: 2
            }
        );
    }

    #[test]
    fn test_existing_env_block_four_spaces() {
        let doc = lines("on: push\nenv:\n    A: 1\njobs:\n");
        assert_eq!(
            find_existing_env(&doc, 0),
            EnvBlock::Existing {
                insertion_index: 3,
                variable_indent: 4
            }
        );
    }

    #[test]
    fn test_env_block_stops_at_comment() {
        let doc = lines("on: push\nenv:\n  A: 1\n  # later\n  B: 2\njobs:\n");
        assert_eq!(
            find_existing_env(&doc, 0),
            EnvBlock::Existing {
                insertion_index: 3,
                variable_indent: 2
            }
        );
    }

    #[test]
    fn test_job_level_env_is_ignored() {
        let doc = lines("on: push\njobs:\n  a:\n    env:\n      A: 1\n");
        assert_eq!(find_existing_env(&doc, 0), EnvBlock::Missing);
    }

    #[test]
    fn test_env_on_last_line() {
        let doc = lines("on: push\njobs:\n  a: {}\nenv:");
        assert_eq!(find_existing_env(&doc, 0), EnvBlock::NoRoom { label_index: 3 });
    }

    #[test]
    fn test_empty_env_block_gets_default_indent() {
        let doc = lines("on: push\nenv:\njobs:\n");
        assert_eq!(
            find_existing_env(&doc, 0),
            EnvBlock::Existing {
                insertion_index: 2,
                variable_indent: 2
            }
        );
    }

    #[test]
    fn test_jobs_index() {
        let doc = lines("on: push\n\njobs: # all of them\n  a:\n");
        assert_eq!(find_jobs_index(&doc, 0), Some(2));
        assert_eq!(find_jobs_index(&lines("on: push\n  jobs:\n"), 0), None);
    }
}
