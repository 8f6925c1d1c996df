//! Selections: a [`TextRange`] plus direction and rectangular (column) mode.

use crate::coord::{CharRange, LineRange, TextPoint, TextRange};

/// Which end of a selection carries the live caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectDir {
    /// The caret is at the end of the range.
    #[default]
    Forward,
    /// The caret is at the start of the range.
    Backward,
}

/// A selection.
///
/// The range is always stored ordered (`begin <= end`); `dir` only tells which end moves
/// when the selection is extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// Selected range.
    pub range: TextRange,
    /// Direction (which end is the caret).
    pub dir: SelectDir,
    /// Rectangular (column) selection.
    pub rect: bool,
}

impl Selection {
    /// Create a selection from an ordered range.
    pub fn new(range: TextRange, dir: SelectDir, rect: bool) -> Self {
        Self { range, dir, rect }
    }

    /// Create a selection from an anchor (fixed end) and a caret (moving end).
    pub fn from_points(anchor: TextPoint, caret: TextPoint, rect: bool) -> Self {
        let dir = if anchor <= caret {
            SelectDir::Forward
        } else {
            SelectDir::Backward
        };
        Self::new(TextRange::ordered(anchor, caret), dir, rect)
    }

    /// An empty stream selection at `point`.
    pub fn caret_at(point: TextPoint) -> Self {
        Self::new(TextRange::empty_at(point), SelectDir::Forward, false)
    }

    /// Returns `true` if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The live caret end.
    pub fn caret(&self) -> TextPoint {
        match self.dir {
            SelectDir::Forward => self.range.point_end(),
            SelectDir::Backward => self.range.point_begin(),
        }
    }

    /// The fixed anchor end.
    pub fn anchor(&self) -> TextPoint {
        match self.dir {
            SelectDir::Forward => self.range.point_begin(),
            SelectDir::Backward => self.range.point_end(),
        }
    }

    /// Move the caret end to `point`, keeping the anchor (Shift+Arrow behavior).
    pub fn extend_to(&mut self, point: TextPoint) {
        let rect = self.rect;
        *self = Self::from_points(self.anchor(), point, rect);
    }

    /// Lines covered by the selection.
    pub fn line_range(&self) -> LineRange {
        self.range.line_range()
    }

    /// The columns selected on `line`.
    ///
    /// Stream selections decompose their range (see [`TextRange::char_range`]).
    /// Rect selections return `[min(begin.x, end.x), max(begin.x, end.x))` on every covered
    /// line, independent of the line's actual length.
    pub fn char_range(&self, line: usize) -> Option<CharRange> {
        if !self.rect {
            return self.range.char_range(line);
        }

        if !self.line_range().contains(line) {
            return None;
        }
        let bx = self.range.point_begin().x;
        let ex = self.range.point_end().x;
        Some(CharRange::new(bx.min(ex), bx.max(ex)))
    }

    /// Reset to an empty stream selection at the caret.
    pub fn clear(&mut self) {
        *self = Self::caret_at(self.caret());
    }
}
