//! # Environment Variable Injector
//!
//! @title Script Injection Rewriter
//! @author Ramprasad
//!
//! Performs the two edits of a script injection fix:
//!
//! 1. Inside the `run:` block of the finding, every `${{ <expr> }}` of the
//!    matched family becomes `$ENV_NAME`.
//! 2. `ENV_NAME: ${{ <expr> }}` is declared in the workflow-level `env:`
//!    block, which is created right above `jobs:` when missing.
//!
//! ## Known limitations
//!
//! - The rewritten scope ends at the first blank or comment line, even when
//!   the same `run:` script continues below it.
//! - An existing `env:` block ends at its first comment line, so a new
//!   declaration may land above a commented tail of the block.
//! - Variables already declared under another name, or at job/step level,
//!   are not reused.

use super::PatchError;
use crate::catalog::UnsafePattern;
use crate::workflow::indent::{indent_of, is_at_or_deeper_than, spaces};
use crate::workflow::locator::{
    find_existing_env, find_global_indent, find_jobs_index, EnvBlock, GlobalBlockLocation,
    ASSUMED_INDENT,
};
use crate::workflow::Document;

/// Applies both edits to a copy of `document`.
///
/// `run_index` is the 0-based line of the `run:` key; `expression` is the
/// trimmed dangerous expression. Either both edits succeed or an error is
/// returned and nothing is kept.
pub fn inject(
    document: &Document,
    pattern: &UnsafePattern,
    expression: &str,
    run_index: usize,
) -> Result<Document, PatchError> {
    if run_index >= document.len() {
        return Err(PatchError::LineOutOfRange {
            line: run_index + 1,
            total: document.len(),
        });
    }

    let mut patched = document.clone();
    let rewritten = replace_in_scope(&mut patched, pattern, run_index);
    log::debug!(
        "rewrote {} line(s) of the run block at line {} with ${}",
        rewritten,
        run_index + 1,
        pattern.env_name
    );

    let location = declare_global_env(&mut patched, pattern, expression)?;
    log::debug!(
        "declared {} at line {} in {} env: block",
        pattern.env_name,
        location.insertion_index + 1,
        if location.exists { "the existing" } else { "a new" }
    );

    Ok(patched)
}

/// Returns true if the block at `start` holds an occurrence of `pattern`.
///
/// When it does not (the expression sits past a blank or comment line),
/// [`inject`] only adds the declaration and the command stays vulnerable.
pub fn rewrites_command(document: &Document, pattern: &UnsafePattern, start: usize) -> bool {
    substitution_scope(document, start).any(|index| pattern.occurs_in(&document.lines()[index]))
}

/// Returns the contiguous range of lines belonging to the block at `start`.
///
/// The range covers `start` and every following line indented at least as
/// deep, stopping at the first blank or comment line.
pub fn substitution_scope(document: &Document, start: usize) -> std::ops::Range<usize> {
    let lines = document.lines();
    let Some(first) = lines.get(start) else {
        return start..start;
    };

    let run_indent = indent_of(first);
    let end = lines[start..]
        .iter()
        .position(|line| !is_at_or_deeper_than(line, run_indent))
        .map_or(lines.len(), |offset| start + offset);

    start..end
}

/// Rewrites occurrences of `pattern` inside the scope starting at `start`.
///
/// Returns the number of lines that changed.
fn replace_in_scope(document: &mut Document, pattern: &UnsafePattern, start: usize) -> usize {
    let mut changed = 0;
    for index in substitution_scope(document, start) {
        let line = &document.lines()[index];
        if !pattern.occurs_in(line) {
            continue;
        }
        let replaced = pattern.replace_occurrences(line);
        document.set_line(index, replaced);
        changed += 1;
    }
    changed
}

/// Works out where the declaration goes, creating the `env:` block if needed.
fn resolve_global_env(document: &mut Document) -> Result<GlobalBlockLocation, PatchError> {
    let global_indent = find_global_indent(document.lines()).ok_or(PatchError::MissingTriggers)?;

    match find_existing_env(document.lines(), global_indent) {
        EnvBlock::Existing {
            insertion_index,
            variable_indent,
        } => Ok(GlobalBlockLocation {
            insertion_index,
            variable_indent,
            exists: true,
        }),
        absent => {
            if let EnvBlock::NoRoom { label_index } = absent {
                log::debug!(
                    "env: on line {} has no room for declarations; adding a new block",
                    label_index + 1
                );
            }
            let jobs_index = find_jobs_index(document.lines(), global_indent)
                .ok_or(PatchError::MissingJobs(global_indent))?;

            let eol = document.line_ending_at(jobs_index);
            let header = format!("{}env:{}", spaces(global_indent), eol);
            document.insert_lines(jobs_index, [header, eol.to_string()]);

            Ok(GlobalBlockLocation {
                insertion_index: jobs_index + 1,
                variable_indent: global_indent + ASSUMED_INDENT,
                exists: false,
            })
        }
    }
}

/// Declares the variable in the workflow-level `env:` block.
fn declare_global_env(
    document: &mut Document,
    pattern: &UnsafePattern,
    expression: &str,
) -> Result<GlobalBlockLocation, PatchError> {
    let location = resolve_global_env(document)?;

    let declaration = format!(
        "{}{}: ${{{{ {} }}}}{}",
        spaces(location.variable_indent),
        pattern.env_name,
        expression,
        document.line_ending_at(location.insertion_index)
    );
    document.insert_lines(location.insertion_index, [declaration]);

    Ok(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::classify;

    const NEW_ENV: &str = "\
name: Comment bot
on:
  issue_comment:

jobs:
  echo:
    runs-on: ubuntu-latest
    steps:
      - run: |
          echo \"${{ github.event.comment.body }}\"

          echo \"${{ github.event.comment.body }}\"
";

    const EXISTING_ENV: &str = "\
on: pull_request_target

env:
    GREETING: hello

jobs:
  title:
    runs-on: ubuntu-latest
    steps:
      - run: echo \"${{ github.event.pull_request.title }}\"
";

    fn run(text: &str, snippet: &str, line: usize) -> Result<Document, PatchError> {
        let pattern = classify(snippet).unwrap();
        inject(&Document::parse(text), pattern, snippet.trim(), line - 1)
    }

    #[test]
    fn test_creates_env_block_above_jobs() {
        let patched = run(NEW_ENV, "github.event.comment.body", 9).unwrap();
        let expected = "\
name: Comment bot
on:
  issue_comment:

env:
  COMMENT_BODY: ${{ github.event.comment.body }}

jobs:
  echo:
    runs-on: ubuntu-latest
    steps:
      - run: |
          echo \"$COMMENT_BODY\"

          echo \"${{ github.event.comment.body }}\"
";
        assert_eq!(patched.to_text(), expected);
    }

    #[test]
    fn test_appends_to_existing_env_block() {
        let patched = run(EXISTING_ENV, " github.event.pull_request.title ", 10).unwrap();
        let expected = "\
on: pull_request_target

env:
    GREETING: hello
    PR_TITLE: ${{ github.event.pull_request.title }}

jobs:
  title:
    runs-on: ubuntu-latest
    steps:
      - run: echo \"$PR_TITLE\"
";
        assert_eq!(patched.to_text(), expected);
    }

    #[test]
    fn test_line_count_grows_by_one_or_three() {
        let original = Document::parse(NEW_ENV);
        let patched = run(NEW_ENV, "github.event.comment.body", 9).unwrap();
        assert_eq!(patched.len(), original.len() + 3);

        let original = Document::parse(EXISTING_ENV);
        let patched = run(EXISTING_ENV, "github.event.pull_request.title", 10).unwrap();
        assert_eq!(patched.len(), original.len() + 1);
    }

    #[test]
    fn test_scope_stops_at_blank_line() {
        let document = Document::parse(NEW_ENV);
        assert_eq!(substitution_scope(&document, 8), 8..10);
    }

    #[test]
    fn test_scope_stops_at_comment_line() {
        let document = Document::parse("      - run: |\n          a\n          # c\n          b\n");
        assert_eq!(substitution_scope(&document, 0), 0..2);
    }

    #[test]
    fn test_rewrites_command_only_within_scope() {
        let pattern = classify("github.event.comment.body").unwrap();
        let document = Document::parse(NEW_ENV);
        assert!(rewrites_command(&document, pattern, 8));

        let gap = Document::parse("      - run: |\n          echo start\n\n          echo \"${{ github.event.comment.body }}\"\n");
        assert!(!rewrites_command(&gap, pattern, 0));
    }

    #[test]
    fn test_crlf_lines_stay_crlf() {
        let text = "on: push\r\njobs:\r\n  a:\r\n    steps:\r\n      - run: echo ${{ github.head_ref }}\r\n";
        let patched = run(text, "github.head_ref", 5).unwrap();
        assert_eq!(
            patched.to_text(),
            "on: push\r\nenv:\r\n  HEAD_REF: ${{ github.head_ref }}\r\n\r\njobs:\r\n  a:\r\n    steps:\r\n      - run: echo $HEAD_REF\r\n"
        );

        let text = "on: push\r\nenv:\r\n  A: b\r\n\r\njobs:\r\n  a:\r\n    steps:\r\n      - run: echo ${{ github.head_ref }}\r\n";
        let patched = run(text, "github.head_ref", 8).unwrap();
        assert!(patched.to_text().contains("  A: b\r\n  HEAD_REF: ${{ github.head_ref }}\r\n\r\njobs:"));
    }

    #[test]
    fn test_missing_triggers() {
        let text = "jobs:\n  a:\n    steps:\n      - run: echo ${{ github.head_ref }}\n";
        assert_eq!(
            run(text, "github.head_ref", 4),
            Err(PatchError::MissingTriggers)
        );
    }

    #[test]
    fn test_missing_jobs() {
        let text = "on: push\nsteps:\n  - run: echo ${{ github.head_ref }}\n";
        assert_eq!(run(text, "github.head_ref", 3), Err(PatchError::MissingJobs(0)));
    }

    #[test]
    fn test_line_out_of_range() {
        assert_eq!(
            run(EXISTING_ENV, "github.head_ref", 40),
            Err(PatchError::LineOutOfRange {
                line: 40,
                total: 11
            })
        );
    }
}
