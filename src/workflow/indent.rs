//! # Indentation Model
//!
//! @title Line Classification Helpers
//! @author Ramprasad
//!
//! Block membership in a workflow file is decided by indentation alone.
//! List markers (`-`) count as indentation so that `- run:` and the keys
//! of the same step line up.

/// Returns the indentation of a line: the number of leading spaces and dashes.
pub fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches([' ', '-']).len()
}

/// Returns true for empty or whitespace-only lines.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Returns true for lines whose first non-whitespace character is `#`.
pub fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Returns true if the line is content nested at or below `reference`.
///
/// Blank and comment lines are never considered nested.
pub fn is_at_or_deeper_than(line: &str, reference: usize) -> bool {
    if is_blank(line) || is_comment(line) {
        return false;
    }
    indent_of(line) >= reference
}

/// Returns a string of `width` spaces.
pub fn spaces(width: usize) -> String {
    " ".repeat(width)
}
