//! # Run Block Parser
//!
//! @title `run:` Step Extraction
//! @author Ramprasad
//!
//! Extracts the shell commands of a workflow. A block starts at a `run:` key
//! and continues over every following line indented deeper than the key,
//! which covers both inline commands and `|` / `>` block scalars.

use crate::workflow::indent::{indent_of, is_blank, is_comment};
use regex::Regex;
use std::sync::OnceLock;

static RUN_KEY: OnceLock<Regex> = OnceLock::new();

fn run_key() -> &'static Regex {
    RUN_KEY.get_or_init(|| Regex::new(r"^\s*(?:-\s+)?run:(?:\s|$)").expect("valid run key regex"))
}

/// A `run:` command and the lines that make it up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunBlock {
    /// 1-based line of the `run:` key.
    pub line: usize,

    /// Indentation of the `run:` key, list marker included.
    pub indent: usize,

    /// Lines of the command as `(1-based line, text)`, starting with the
    /// `run:` line itself. Comment lines are left out.
    pub lines: Vec<(usize, String)>,
}

/// Extracts every `run:` block from workflow text.
///
/// # Example
///
/// ```rust,ignore
/// let blocks = extract_run_blocks("steps:\n  - run: echo hi\n");
/// assert_eq!(blocks[0].line, 2);
/// ```
pub fn extract_run_blocks(source: &str) -> Vec<RunBlock> {
    let lines: Vec<&str> = source.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        if is_comment(line) || !run_key().is_match(line) {
            i += 1;
            continue;
        }

        let indent = indent_of(line);
        let mut block = RunBlock {
            line: i + 1,
            indent,
            lines: vec![(i + 1, line.to_string())],
        };

        let mut j = i + 1;
        while j < lines.len() {
            let next = lines[j];
            if is_blank(next) {
                j += 1;
                continue;
            }
            if indent_of(next) <= indent {
                break;
            }
            if !is_comment(next) {
                block.lines.push((j + 1, next.to_string()));
            }
            j += 1;
        }

        blocks.push(block);
        i = j;
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKFLOW: &str = "\
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Greet
        run: echo hello
      - run: |
          echo one

          # echo ${{ github.head_ref }}
          echo two
        shell: bash
      - name: not a run
        with:
          rerun: false
";

    #[test]
    fn test_extract_inline_and_block_scalars() {
        let blocks = extract_run_blocks(WORKFLOW);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].line, 8);
        assert_eq!(blocks[0].indent, 8);
        assert_eq!(blocks[0].lines.len(), 1);

        assert_eq!(blocks[1].line, 9);
        let numbers: Vec<usize> = blocks[1].lines.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![9, 10, 13]);
    }

    #[test]
    fn test_commented_run_is_ignored() {
        let blocks = extract_run_blocks("steps:\n  # - run: echo ${{ github.head_ref }}\n");
        assert!(blocks.is_empty());
    }
}
