//! Caret stepping by grapheme cluster and by word.
//!
//! Steps stay within a line until they hit its start or end; the next step then crosses
//! to the neighbouring line. Columns are char offsets, so a step may move by more than one
//! column (e.g. over `"e\u{301}"`).

use crate::buffer::TextBuffer;
use crate::coord::TextPoint;
use unicode_segmentation::UnicodeSegmentation;

fn grapheme_columns(text: &str) -> Vec<usize> {
    let mut cols = Vec::new();
    let mut x = 0usize;
    for g in text.graphemes(true) {
        cols.push(x);
        x += g.chars().count();
    }
    cols.push(x);
    cols
}

fn word_starts(text: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut x = 0usize;
    for (_, word) in text.split_word_bound_indices() {
        if word.chars().any(|c| !c.is_whitespace()) {
            starts.push(x);
        }
        x += word.chars().count();
    }
    starts
}

fn word_ends(text: &str) -> Vec<usize> {
    let mut ends = Vec::new();
    let mut x = 0usize;
    for (_, word) in text.split_word_bound_indices() {
        x += word.chars().count();
        if word.chars().any(|c| !c.is_whitespace()) {
            ends.push(x);
        }
    }
    ends
}

/// The caret one grapheme to the right, crossing to the next line at line end.
pub fn next_char(buffer: &TextBuffer, point: TextPoint) -> TextPoint {
    let point = buffer.clip_point(point);
    let cols = grapheme_columns(buffer.line_data(point.line));
    match cols.iter().find(|&&c| c > point.x) {
        Some(&x) => TextPoint::new(point.line, x),
        None if point.line < buffer.line_count() => TextPoint::new(point.line + 1, 0),
        None => point,
    }
}

/// The caret one grapheme to the left, crossing to the previous line end at line start.
pub fn prev_char(buffer: &TextBuffer, point: TextPoint) -> TextPoint {
    let point = buffer.clip_point(point);
    let cols = grapheme_columns(buffer.line_data(point.line));
    match cols.iter().rev().find(|&&c| c < point.x) {
        Some(&x) => TextPoint::new(point.line, x),
        None if point.line > 1 => {
            let line = point.line - 1;
            TextPoint::new(line, buffer.line_length(line))
        }
        None => point,
    }
}

/// The end of the current or next word (Ctrl+Right).
pub fn next_word(buffer: &TextBuffer, point: TextPoint) -> TextPoint {
    let point = buffer.clip_point(point);
    let ends = word_ends(buffer.line_data(point.line));
    match ends.into_iter().find(|&e| e > point.x) {
        Some(x) => TextPoint::new(point.line, x),
        None if point.x < buffer.line_length(point.line) => {
            TextPoint::new(point.line, buffer.line_length(point.line))
        }
        None if point.line < buffer.line_count() => TextPoint::new(point.line + 1, 0),
        None => point,
    }
}

/// The start of the current or previous word (Ctrl+Left).
pub fn prev_word(buffer: &TextBuffer, point: TextPoint) -> TextPoint {
    let point = buffer.clip_point(point);
    let starts = word_starts(buffer.line_data(point.line));
    match starts.into_iter().rev().find(|&s| s < point.x) {
        Some(x) => TextPoint::new(point.line, x),
        None if point.x > 0 => TextPoint::new(point.line, 0),
        None if point.line > 1 => {
            let line = point.line - 1;
            TextPoint::new(line, buffer.line_length(line))
        }
        None => point,
    }
}

/// Start of the line's text; toggles to column 0 when already there (Home).
pub fn smart_home(buffer: &TextBuffer, point: TextPoint) -> TextPoint {
    let point = buffer.clip_point(point);
    let indent = buffer.line(point.line).first_non_space_x();
    if point.x == indent {
        TextPoint::new(point.line, 0)
    } else {
        TextPoint::new(point.line, indent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Context;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_text(Context::shared_default(), text)
    }

    #[test]
    fn test_grapheme_steps_skip_combining_marks() {
        let buffer = buffer("e\u{301}x");
        assert_eq!(next_char(&buffer, TextPoint::new(1, 0)), TextPoint::new(1, 2));
        assert_eq!(prev_char(&buffer, TextPoint::new(1, 2)), TextPoint::new(1, 0));
    }

    #[test]
    fn test_char_steps_cross_lines() {
        let buffer = buffer("ab\ncd");
        assert_eq!(next_char(&buffer, TextPoint::new(1, 2)), TextPoint::new(2, 0));
        assert_eq!(prev_char(&buffer, TextPoint::new(2, 0)), TextPoint::new(1, 2));
        assert_eq!(next_char(&buffer, TextPoint::new(2, 2)), TextPoint::new(2, 2));
        assert_eq!(prev_char(&buffer, TextPoint::new(1, 0)), TextPoint::new(1, 0));
    }

    #[test]
    fn test_word_steps() {
        let buffer = buffer("let  value = 42;\nnext");
        assert_eq!(next_word(&buffer, TextPoint::new(1, 0)), TextPoint::new(1, 3));
        assert_eq!(next_word(&buffer, TextPoint::new(1, 3)), TextPoint::new(1, 10));
        assert_eq!(prev_word(&buffer, TextPoint::new(1, 10)), TextPoint::new(1, 5));
        assert_eq!(prev_word(&buffer, TextPoint::new(1, 5)), TextPoint::new(1, 0));
        assert_eq!(next_word(&buffer, TextPoint::new(1, 16)), TextPoint::new(2, 0));
        assert_eq!(prev_word(&buffer, TextPoint::new(2, 0)), TextPoint::new(1, 16));
    }

    #[test]
    fn test_smart_home_toggles() {
        let buffer = buffer("    body");
        assert_eq!(smart_home(&buffer, TextPoint::new(1, 6)), TextPoint::new(1, 4));
        assert_eq!(smart_home(&buffer, TextPoint::new(1, 4)), TextPoint::new(1, 0));
    }
}
