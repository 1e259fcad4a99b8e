//! # Workflow Module
//!
//! @title Line-Oriented Workflow Model
//! @author Ramprasad
//!
//! A workflow is handled as an ordered list of lines rather than a YAML
//! tree. Edits are made with indentation arithmetic so untouched lines keep
//! their exact formatting.
//!
//! ## Submodules
//!
//! - [`indent`] - Indentation measurement and line classification
//! - [`locator`] - Discovery of the `on:`, `env:` and `jobs:` anchors

pub mod indent;
pub mod locator;

pub use indent::{indent_of, is_at_or_deeper_than, is_blank, is_comment};
pub use locator::{EnvBlock, GlobalBlockLocation};

/// A workflow document split into lines.
///
/// Splitting happens on `\n` only, so a trailing newline becomes a final
/// empty line and [`Document::to_text`] restores it unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
}

impl Document {
    /// Splits workflow text into a document.
    pub fn parse(text: &str) -> Self {
        Self {
            lines: text.split('\n').map(str::to_string).collect(),
        }
    }

    /// Returns the lines of the document.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of lines, counting the empty line after a trailing newline.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the document has no lines.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Carriage return to append to a line inserted at `index`.
    ///
    /// Follows the line currently at `index` (or the one above it at the end
    /// of the document), so CRLF workflows stay CRLF.
    pub(crate) fn line_ending_at(&self, index: usize) -> &'static str {
        let reference = match self.lines.get(index) {
            Some(line) if !line.is_empty() => Some(line),
            _ => index.checked_sub(1).and_then(|i| self.lines.get(i)),
        };

        match reference {
            Some(line) if line.ends_with('\r') => "\r",
            _ => "",
        }
    }

    /// Replaces the line at `index`.
    pub(crate) fn set_line(&mut self, index: usize, line: String) {
        self.lines[index] = line;
    }

    /// Inserts lines so that the first one ends up at `index`.
    pub(crate) fn insert_lines<I>(&mut self, index: usize, lines: I)
    where
        I: IntoIterator<Item = String>,
    {
        let tail = self.lines.split_off(index);
        self.lines.extend(lines);
        self.lines.extend(tail);
    }

    /// Joins the lines back into text.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_keeps_trailing_newline() {
        let text = "on: push\njobs:\n";
        let doc = Document::parse(text);
        assert_eq!(doc.len(), 3);
        assert_eq!(doc.lines()[2], "");
        assert_eq!(doc.to_text(), text);
    }

    #[test]
    fn test_insert_lines() {
        let mut doc = Document::parse("a\nd");
        doc.insert_lines(1, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(doc.to_text(), "a\nb\nc\nd");

        doc.insert_lines(4, vec!["e".to_string()]);
        assert_eq!(doc.to_text(), "a\nb\nc\nd\ne");
    }

    #[test]
    fn test_line_ending_follows_neighbours() {
        let doc = Document::parse("on: push\r\njobs:\r\n");
        assert_eq!(doc.line_ending_at(1), "\r");
        assert_eq!(doc.line_ending_at(2), "\r");

        let doc = Document::parse("on: push\njobs:\n");
        assert_eq!(doc.line_ending_at(1), "");
        assert_eq!(doc.line_ending_at(2), "");
    }
}
