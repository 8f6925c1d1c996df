//! A single logical line of a [`TextBuffer`](crate::TextBuffer).

use crate::coord::{CharRange, INVALID, NPOS};
use crate::lex::{Lex, LexSpan};

/// One logical line: text (without EOL), lex spans and a stable id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLine {
    id: usize,
    data: String,
    lex_spans: Vec<LexSpan>,
}

impl TextLine {
    /// Create a line with the given id.
    pub fn new(id: usize, data: impl Into<String>) -> Self {
        Self {
            id,
            data: data.into(),
            lex_spans: Vec::new(),
        }
    }

    /// Create a synthetic line (`id == NPOS`).
    pub fn synthetic(data: impl Into<String>) -> Self {
        Self::new(NPOS, data)
    }

    /// Stable id; [`NPOS`] for synthetic lines.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The text of the line.
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.data.chars().count()
    }

    /// Returns `true` if the line has no text.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Character at column `x`.
    pub fn char_at(&self, x: usize) -> Option<char> {
        self.data.chars().nth(x)
    }

    /// Text in `range` (clipped to the line).
    pub fn sub(&self, range: CharRange) -> &str {
        let range = range.clip(self.len());
        let begin = self.byte_index(range.begin);
        let end = self.byte_index(range.end);
        &self.data[begin..end]
    }

    /// Byte offset of column `x`, clamped to the line end.
    pub fn byte_index(&self, x: usize) -> usize {
        self.data
            .char_indices()
            .nth(x)
            .map(|(b, _)| b)
            .unwrap_or(self.data.len())
    }

    /// Column of byte offset `byte`.
    pub fn char_index(&self, byte: usize) -> usize {
        let byte = byte.min(self.data.len());
        self.data[..byte].chars().count()
    }

    /// First column that is not a space or tab, or the line length if there is none.
    pub fn first_non_space_x(&self) -> usize {
        self.data
            .chars()
            .position(|c| c != ' ' && c != '\t')
            .unwrap_or_else(|| self.len())
    }

    /// Leading whitespace of the line.
    pub fn indent_str(&self) -> &str {
        let end = self.byte_index(self.first_non_space_x());
        &self.data[..end]
    }

    /// Returns `true` if the line is empty or all whitespace.
    pub fn is_blank(&self) -> bool {
        self.data.chars().all(char::is_whitespace)
    }

    pub(crate) fn insert_str(&mut self, x: usize, s: &str) {
        let at = self.byte_index(x);
        self.data.insert_str(at, s);
    }

    pub(crate) fn append(&mut self, s: &str) {
        self.data.push_str(s);
    }

    /// Remove the text in `range`, returning it.
    pub(crate) fn delete(&mut self, range: CharRange) -> String {
        let range = range.clip(self.len());
        let begin = self.byte_index(range.begin);
        let end = self.byte_index(range.end);
        self.data.drain(begin..end).collect()
    }

    /// Split the line at column `x`; the tail is returned and removed from this line.
    pub(crate) fn split_off(&mut self, x: usize) -> String {
        let at = self.byte_index(x);
        self.data.split_off(at)
    }

    /// Lex spans assigned by the file-type plugin.
    pub fn lex_spans(&self) -> &[LexSpan] {
        &self.lex_spans
    }

    /// Replace the lex spans.
    pub fn set_lex_spans(&mut self, spans: Vec<LexSpan>) {
        self.lex_spans = spans;
    }

    /// Drop all lex spans.
    pub fn clear_lex(&mut self) {
        self.lex_spans.clear();
    }

    /// Classification at column `x`; normal when no span covers it.
    pub fn lex_at(&self, x: usize) -> Lex {
        self.lex_spans
            .iter()
            .find(|span| span.contains(x))
            .map(|span| span.lex)
            .unwrap_or_default()
    }

    /// Split the line into runs of uniform classification, covering every column once.
    ///
    /// Used by renderers: each run is `(CharRange, Lex)`.
    pub fn lex_runs(&self) -> Vec<(CharRange, Lex)> {
        let len = self.len();
        let mut spans: Vec<LexSpan> = self
            .lex_spans
            .iter()
            .copied()
            .filter(|s| s.len > 0 && s.offset < len)
            .collect();
        spans.sort_by_key(|s| s.offset);

        let mut runs = Vec::new();
        let mut x = 0usize;
        for span in spans {
            if span.offset < x {
                // Overlapping span: the earlier one wins.
                continue;
            }
            if span.offset > x {
                runs.push((CharRange::new(x, span.offset), Lex::default()));
            }
            let end = span.end().min(len);
            runs.push((CharRange::new(span.offset, end), span.lex));
            x = end;
        }
        if x < len || runs.is_empty() {
            runs.push((CharRange::new(x, INVALID), Lex::default()));
        }
        runs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lex::{LexMajor, LexMinor};

    #[test]
    fn test_char_addressing_with_multibyte_text() {
        let mut line = TextLine::new(1, "a你b");
        assert_eq!(line.len(), 3);
        assert_eq!(line.char_at(1), Some('你'));
        assert_eq!(line.sub(CharRange::new(1, INVALID)), "你b");

        line.insert_str(2, "x");
        assert_eq!(line.data(), "a你xb");
        assert_eq!(line.delete(CharRange::new(1, 3)), "你x");
        assert_eq!(line.data(), "ab");
    }

    #[test]
    fn test_split_off_keeps_head() {
        let mut line = TextLine::new(7, "hello world");
        let tail = line.split_off(5);
        assert_eq!(line.data(), "hello");
        assert_eq!(tail, " world");
        assert_eq!(line.id(), 7);
    }

    #[test]
    fn test_indent_helpers() {
        let line = TextLine::synthetic("\t  foo");
        assert_eq!(line.first_non_space_x(), 3);
        assert_eq!(line.indent_str(), "\t  ");
        assert!(TextLine::synthetic(" \t ").is_blank());
        assert_eq!(TextLine::synthetic("").id(), NPOS);
    }

    #[test]
    fn test_lex_runs_fill_gaps() {
        let mut line = TextLine::synthetic("let x = 42;");
        let keyword = Lex::new(LexMajor::Statement, LexMinor::Keyword);
        let number = Lex::new(LexMajor::Constant, LexMinor::Number);
        line.set_lex_spans(vec![LexSpan::new(8, 2, number), LexSpan::new(0, 3, keyword)]);

        let runs = line.lex_runs();
        assert_eq!(
            runs,
            vec![
                (CharRange::new(0, 3), keyword),
                (CharRange::new(3, 8), Lex::default()),
                (CharRange::new(8, 10), number),
                (CharRange::new(10, INVALID), Lex::default()),
            ]
        );
        assert_eq!(line.lex_at(9), number);
        assert_eq!(line.lex_at(5), Lex::default());
    }
}
