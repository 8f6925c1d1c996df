//! Soft wrap: logical lines to visual sub-lines.
//!
//! A [`WrapHelper`] keeps, per logical line, the char columns where sub-lines 2..N start.
//! It is owned by a viewport and kept in sync through [`WrapHelper::on_line_change`], which
//! only recomputes the lines named by a notification, or [`WrapHelper::apply_events`] for a
//! batch of notifications logged over several edits (a group, or the undo of one).
//!
//! Coordinates:
//! - visual rows are 1-based and count sub-lines across the whole buffer;
//! - a visual column is a char offset within its sub-line;
//! - a column equal to a break offset belongs to the following sub-line.

use crate::buffer::TextBuffer;
use crate::coord::{LineRange, TextPoint};
use crate::listener::{ChangeEvent, LineChange};
use crate::options::Context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use unicode_width::UnicodeWidthChar;

/// Where sub-lines may break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    /// Break before any character that would overflow.
    #[default]
    Char,
    /// Prefer breaking after whitespace; fall back to character breaks for long words.
    Word,
}

/// Visual width of a character in cells (UAX #11): 0, 1 or 2.
pub fn char_width(ch: char) -> usize {
    UnicodeWidthChar::width(ch).unwrap_or(1)
}

/// Measures character advances in device-independent pixels.
pub trait CharMeasure {
    /// Advance of `ch` when it starts at pixel offset `x` from the line start.
    fn advance(&self, ch: char, x: u32) -> u32;
}

/// A monospace measure: cell width times East-Asian width, tabs to the next tab stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonoMeasure {
    /// Width of one cell in pixels.
    pub cell_width: u32,
    /// Tab stop in cells.
    pub tab_stop: usize,
}

impl MonoMeasure {
    /// Create a measure.
    pub fn new(cell_width: u32, tab_stop: usize) -> Self {
        Self {
            cell_width: cell_width.max(1),
            tab_stop: tab_stop.max(1),
        }
    }

    /// A measure using the context's tab stop.
    pub fn from_context(context: &Context, cell_width: u32) -> Self {
        Self::new(cell_width, context.options.tab_stop)
    }
}

impl CharMeasure for MonoMeasure {
    fn advance(&self, ch: char, x: u32) -> u32 {
        if ch == '\t' {
            let tab = self.cell_width.saturating_mul(self.tab_stop as u32);
            tab - x % tab
        } else {
            self.cell_width * char_width(ch) as u32
        }
    }
}

/// A position on screen: 1-based visual row, char column within the sub-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisualPoint {
    /// 1-based visual row.
    pub row: usize,
    /// Char offset within the sub-line.
    pub column: usize,
}

impl VisualPoint {
    /// Create a visual point.
    pub const fn new(row: usize, column: usize) -> Self {
        Self { row, column }
    }
}

/// Break offsets of `text` for `width` pixels.
///
/// Every sub-line holds at least one character, even when that character is wider than
/// `width`. A `width` of zero disables wrapping.
pub fn wrap_line<M: CharMeasure + ?Sized>(
    text: &str,
    width: u32,
    measure: &M,
    mode: WrapMode,
) -> Vec<usize> {
    if width == 0 {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut widths = Vec::with_capacity(chars.len());
    let mut x = 0u32;
    for &ch in &chars {
        let w = measure.advance(ch, x);
        widths.push(w);
        x = x.saturating_add(w);
    }

    let mut breaks = Vec::new();
    let mut seg_start = 0usize;
    let mut seg_width = 0u32;
    let mut last_space: Option<usize> = None;

    for (i, &w) in widths.iter().enumerate() {
        while seg_width.saturating_add(w) > width && i > seg_start {
            let at = match mode {
                WrapMode::Word => last_space.filter(|&b| b > seg_start && b <= i).unwrap_or(i),
                WrapMode::Char => i,
            };
            breaks.push(at);
            seg_start = at;
            seg_width = widths[at..i].iter().sum();
            last_space = None;
        }
        seg_width = seg_width.saturating_add(w);
        if chars[i].is_whitespace() {
            last_space = Some(i + 1);
        }
    }
    breaks
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct LineWrap {
    breaks: Vec<usize>,
    len: usize,
    /// Content changed and has not been re-wrapped yet.
    stale: bool,
}

impl LineWrap {
    fn stale() -> Self {
        Self {
            stale: true,
            ..Self::default()
        }
    }

    fn rows(&self) -> usize {
        self.breaks.len() + 1
    }

    fn sub_start(&self, sub: usize) -> usize {
        if sub == 0 { 0 } else { self.breaks[sub - 1] }
    }
}

/// Logical-to-visual mapping for one viewport.
#[derive(Debug, Clone)]
pub struct WrapHelper<M: CharMeasure = MonoMeasure> {
    context: Arc<Context>,
    measure: M,
    mode: WrapMode,
    client_width: u32,
    lines: Vec<LineWrap>,
    rows: usize,
    /// Number of stale entries in `lines`.
    pending: usize,
}

impl WrapHelper<MonoMeasure> {
    /// A helper measuring with [`MonoMeasure`] and the context's tab stop.
    pub fn mono(context: Arc<Context>, cell_width: u32) -> Self {
        let measure = MonoMeasure::from_context(&context, cell_width);
        Self::new(context, measure)
    }
}

impl<M: CharMeasure> WrapHelper<M> {
    /// Create a helper. Nothing is wrapped until [`set_client_width`](Self::set_client_width).
    pub fn new(context: Arc<Context>, measure: M) -> Self {
        let mode = context.options.wrap.mode;
        Self {
            context,
            measure,
            mode,
            client_width: 0,
            lines: Vec::new(),
            rows: 0,
            pending: 0,
        }
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    /// Current client width in pixels.
    pub fn client_width(&self) -> u32 {
        self.client_width
    }

    /// Current wrap mode.
    pub fn mode(&self) -> WrapMode {
        self.mode
    }

    /// Change the wrap mode and re-wrap everything.
    pub fn set_mode(&mut self, buffer: &TextBuffer, mode: WrapMode) {
        if self.mode != mode {
            self.mode = mode;
            self.rebuild(buffer);
        }
    }

    /// Set the client width; re-wraps every line only when the width actually changed
    /// (or nothing has been wrapped yet). Returns `true` if a re-wrap happened.
    pub fn set_client_width(&mut self, buffer: &TextBuffer, width: u32) -> bool {
        if width == self.client_width && self.lines.len() == buffer.line_count() {
            return false;
        }
        self.client_width = width;
        self.rebuild(buffer);
        true
    }

    fn wrap(&self, buffer: &TextBuffer, n: usize) -> LineWrap {
        let line = buffer.line(n);
        LineWrap {
            breaks: wrap_line(line.data(), self.client_width, &self.measure, self.mode),
            len: line.len(),
            stale: false,
        }
    }

    fn rebuild(&mut self, buffer: &TextBuffer) {
        let lines: Vec<LineWrap> = (1..=buffer.line_count())
            .map(|n| self.wrap(buffer, n))
            .collect();
        self.rows = lines.iter().map(LineWrap::rows).sum();
        self.lines = lines;
        self.pending = 0;
        tracing::trace!(width = self.client_width, rows = self.rows, "wrap rebuilt");
    }

    /// Apply a buffer line notification; returns the change in total visual rows.
    ///
    /// `buffer` must already reflect the change. Lines named by the notification that the
    /// buffer no longer has are left stale and re-wrapped once the line counts agree again.
    pub fn on_line_change(
        &mut self,
        buffer: &TextBuffer,
        change: LineChange,
        lines: LineRange,
    ) -> isize {
        let before = self.rows;
        self.apply(Some(buffer), change, lines);
        self.sync(buffer);
        self.rows as isize - before as isize
    }

    /// Apply notifications logged over several edits; returns the change in total visual
    /// rows.
    ///
    /// Line numbers in the log refer to the buffer as it was at each step, so the lines
    /// they name are only marked stale and re-wrapped from the final `buffer` at the end.
    pub fn apply_events(&mut self, buffer: &TextBuffer, events: &[ChangeEvent]) -> isize {
        let before = self.rows;
        let refresh = events
            .iter()
            .any(|e| matches!(e, ChangeEvent::Line(LineChange::Refresh, _)));
        if refresh {
            self.rebuild(buffer);
        } else {
            for event in events {
                if let ChangeEvent::Line(change, lines) = *event {
                    self.apply(None, change, lines);
                }
            }
            self.sync(buffer);
        }
        self.rows as isize - before as isize
    }

    /// Wrap line `n` now when `buffer` is given and has it, else a stale placeholder.
    fn wrap_or_stale(&self, buffer: Option<&TextBuffer>, n: usize) -> LineWrap {
        match buffer {
            Some(buffer) if n <= buffer.line_count() => self.wrap(buffer, n),
            _ => LineWrap::stale(),
        }
    }

    fn set_slot(&mut self, index: usize, wrapped: LineWrap) {
        let slot = &mut self.lines[index];
        self.pending = self.pending - usize::from(slot.stale) + usize::from(wrapped.stale);
        self.rows = self.rows - slot.rows() + wrapped.rows();
        *slot = wrapped;
    }

    fn apply(&mut self, buffer: Option<&TextBuffer>, change: LineChange, lines: LineRange) {
        match change {
            LineChange::Refresh => {
                if let Some(buffer) = buffer {
                    self.rebuild(buffer);
                }
            }
            LineChange::Updated => {
                for n in lines.lines() {
                    if n > self.lines.len() {
                        continue;
                    }
                    let wrapped = self.wrap_or_stale(buffer, n);
                    self.set_slot(n - 1, wrapped);
                }
            }
            LineChange::Added => {
                let wrapped: Vec<LineWrap> = lines
                    .lines()
                    .map(|n| self.wrap_or_stale(buffer, n))
                    .collect();
                self.rows += wrapped.iter().map(LineWrap::rows).sum::<usize>();
                self.pending += wrapped.iter().filter(|l| l.stale).count();
                let at = (lines.first - 1).min(self.lines.len());
                self.lines.splice(at..at, wrapped);
            }
            LineChange::Deleted => {
                let end = lines.last.min(self.lines.len());
                let start = (lines.first - 1).min(end);
                for removed in self.lines.drain(start..end) {
                    self.rows -= removed.rows();
                    self.pending -= usize::from(removed.stale);
                }
            }
        }
    }

    /// Re-wrap stale lines, once the line count matches `buffer`.
    fn sync(&mut self, buffer: &TextBuffer) {
        if self.pending == 0 || self.lines.len() != buffer.line_count() {
            return;
        }
        for i in 0..self.lines.len() {
            if self.lines[i].stale {
                let wrapped = self.wrap(buffer, i + 1);
                self.set_slot(i, wrapped);
            }
        }
    }

    /// Total visual rows.
    pub fn visual_line_count(&self) -> usize {
        self.rows
    }

    /// Number of sub-lines of logical line `n`.
    pub fn sub_line_count(&self, n: usize) -> usize {
        self.lines.get(n.wrapping_sub(1)).map_or(1, LineWrap::rows)
    }

    /// Break offsets of logical line `n`.
    pub fn breaks(&self, n: usize) -> &[usize] {
        self.lines
            .get(n.wrapping_sub(1))
            .map_or(&[][..], |l| l.breaks.as_slice())
    }

    fn rows_before(&self, n: usize) -> usize {
        self.lines[..(n - 1).min(self.lines.len())]
            .iter()
            .map(LineWrap::rows)
            .sum()
    }

    /// Map a logical point to its visual position.
    pub fn to_visual(&self, point: TextPoint) -> VisualPoint {
        let Some(line) = self.lines.get(point.line.wrapping_sub(1)) else {
            return VisualPoint::new(point.line, point.x);
        };
        let sub = line.breaks.partition_point(|&b| b <= point.x);
        VisualPoint::new(
            self.rows_before(point.line) + sub + 1,
            point.x - line.sub_start(sub),
        )
    }

    /// Map a visual position back to a logical point, clamping to existing text.
    pub fn to_logical(&self, point: VisualPoint) -> TextPoint {
        if self.lines.is_empty() {
            return TextPoint::new(point.row.max(1), point.column);
        }
        let mut row = point.row.max(1) - 1;
        for (i, line) in self.lines.iter().enumerate() {
            let rows = line.rows();
            let last_line = i + 1 == self.lines.len();
            if row < rows || last_line {
                let sub = row.min(rows - 1);
                let start = line.sub_start(sub);
                let max_x = if sub + 1 < rows {
                    line.breaks[sub] - 1
                } else {
                    line.len
                };
                return TextPoint::new(i + 1, (start + point.column).min(max_x));
            }
            row -= rows;
        }
        let last = self.lines.len();
        TextPoint::new(last, self.lines[last - 1].len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::TextRange;
    use pretty_assertions::assert_eq;

    fn mono() -> MonoMeasure {
        MonoMeasure::new(10, 4)
    }

    #[test]
    fn test_char_wrap_exact_fit_and_overflow() {
        assert_eq!(wrap_line("abcd", 40, &mono(), WrapMode::Char), Vec::<usize>::new());
        assert_eq!(wrap_line("abcde", 40, &mono(), WrapMode::Char), vec![4]);
        assert_eq!(wrap_line("abcdefghij", 30, &mono(), WrapMode::Char), vec![3, 6, 9]);
    }

    #[test]
    fn test_wide_chars_do_not_split() {
        // Each CJK char is two cells; three cells fit one wide char per sub-line.
        assert_eq!(wrap_line("你好世", 30, &mono(), WrapMode::Char), vec![1, 2]);
        // A char wider than the client still gets its own sub-line.
        assert_eq!(wrap_line("a你b", 10, &mono(), WrapMode::Char), vec![1, 2]);
    }

    #[test]
    fn test_word_wrap_prefers_whitespace() {
        assert_eq!(wrap_line("hello world", 80, &mono(), WrapMode::Word), vec![6]);
        assert_eq!(wrap_line("abcdefghij", 40, &mono(), WrapMode::Word), vec![4, 8]);
    }

    #[test]
    fn test_tab_advances_to_stop() {
        let m = mono();
        assert_eq!(m.advance('\t', 0), 40);
        assert_eq!(m.advance('\t', 10), 30);
        assert_eq!(wrap_line("a\tb", 50, &m, WrapMode::Char), Vec::<usize>::new());
        assert_eq!(wrap_line("a\tb", 40, &m, WrapMode::Char), vec![2]);
    }

    #[test]
    fn test_break_column_belongs_to_next_sub_line() {
        let buffer = TextBuffer::from_text(Context::shared_default(), "abcdef\nxy");
        let mut wrap = WrapHelper::mono(Context::shared_default(), 10);
        wrap.set_client_width(&buffer, 30);
        assert_eq!(wrap.visual_line_count(), 3);

        assert_eq!(wrap.to_visual(TextPoint::new(1, 2)), VisualPoint::new(1, 2));
        assert_eq!(wrap.to_visual(TextPoint::new(1, 3)), VisualPoint::new(2, 0));
        assert_eq!(wrap.to_visual(TextPoint::new(1, 6)), VisualPoint::new(2, 3));
        assert_eq!(wrap.to_visual(TextPoint::new(2, 1)), VisualPoint::new(3, 1));

        assert_eq!(wrap.to_logical(VisualPoint::new(1, 9)), TextPoint::new(1, 2));
        assert_eq!(wrap.to_logical(VisualPoint::new(9, 9)), TextPoint::new(2, 2));
    }

    #[test]
    fn test_incremental_updates_track_edits() {
        let mut buffer = TextBuffer::from_text(Context::shared_default(), "abc\ndef");
        let mut wrap = WrapHelper::mono(Context::shared_default(), 10);
        wrap.set_client_width(&buffer, 30);
        assert_eq!(wrap.visual_line_count(), 2);

        buffer.insert_text(TextPoint::new(1, 3), "XYZ\n12345");
        assert_eq!(wrap.on_line_change(&buffer, LineChange::Updated, LineRange::single(1)), 1);
        assert_eq!(wrap.on_line_change(&buffer, LineChange::Added, LineRange::single(2)), 2);
        assert_eq!(wrap.visual_line_count(), 5);

        buffer.delete_text(TextRange::new(TextPoint::new(1, 0), TextPoint::new(2, 5)));
        assert_eq!(wrap.on_line_change(&buffer, LineChange::Updated, LineRange::single(1)), -1);
        assert_eq!(wrap.on_line_change(&buffer, LineChange::Deleted, LineRange::single(2)), -2);
        assert_eq!(wrap.visual_line_count(), 2);
        assert_eq!(wrap.breaks(1), &[] as &[usize]);
    }

    #[test]
    fn test_unchanged_width_does_not_rewrap() {
        let buffer = TextBuffer::from_text(Context::shared_default(), "abc");
        let mut wrap = WrapHelper::mono(Context::shared_default(), 10);
        assert!(wrap.set_client_width(&buffer, 20));
        assert!(!wrap.set_client_width(&buffer, 20));
        assert!(wrap.set_client_width(&buffer, 30));
    }
}
