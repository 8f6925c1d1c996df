//! Coordinate primitives.
//!
//! Lines are **1-based** (line `0` means "no line"), columns are **0-based** and counted in
//! `char`s (Unicode scalar values), never bytes.

use std::cmp::Ordering;
use std::fmt;

/// Column sentinel meaning "to the end of the line".
pub const INVALID: usize = usize::MAX;

/// Sentinel for "no index"/"no id".
pub const NPOS: usize = usize::MAX;

/// A position in a buffer: `(line, column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextPoint {
    /// 1-based line number.
    pub line: usize,
    /// 0-based column in characters.
    pub x: usize,
}

impl TextPoint {
    /// Create a new point.
    pub const fn new(line: usize, x: usize) -> Self {
        Self { line, x }
    }

    /// Returns `true` if the point refers to a line (`line > 0`).
    pub fn valid(&self) -> bool {
        self.line > 0
    }
}

impl Ord for TextPoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.line.cmp(&other.line).then_with(|| self.x.cmp(&other.x))
    }
}

impl PartialOrd for TextPoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TextPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line, self.x)
    }
}

/// A half-open column range `[begin, end)` within one line.
///
/// `end == INVALID` means "to the end of the line".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CharRange {
    /// Inclusive start column.
    pub begin: usize,
    /// Exclusive end column, or [`INVALID`].
    pub end: usize,
}

impl CharRange {
    /// Create a new char range.
    pub const fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// A range covering the whole line.
    pub const fn whole_line() -> Self {
        Self::new(0, INVALID)
    }

    /// Returns `true` if the range extends to the end of the line.
    pub fn to_line_end(&self) -> bool {
        self.end == INVALID
    }

    /// Returns `true` if the range selects nothing.
    pub fn is_empty(&self) -> bool {
        self.end != INVALID && self.begin >= self.end
    }

    /// Resolve `INVALID` against a concrete line length and clip both ends to it.
    pub fn clip(&self, line_len: usize) -> CharRange {
        let end = if self.end == INVALID {
            line_len
        } else {
            self.end.min(line_len)
        };
        CharRange::new(self.begin.min(end), end)
    }

    /// Length in characters, resolving `INVALID` against `line_len`.
    pub fn count(&self, line_len: usize) -> usize {
        let clipped = self.clip(line_len);
        clipped.end - clipped.begin
    }
}

/// An inclusive line range `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LineRange {
    /// First line (1-based, inclusive).
    pub first: usize,
    /// Last line (1-based, inclusive).
    pub last: usize,
}

impl LineRange {
    /// Create a new line range.
    pub const fn new(first: usize, last: usize) -> Self {
        Self { first, last }
    }

    /// A range covering exactly one line.
    pub const fn single(line: usize) -> Self {
        Self::new(line, line)
    }

    /// Returns `true` if the range covers no line.
    pub fn is_empty(&self) -> bool {
        self.first == 0 || self.last == 0 || self.first > self.last
    }

    /// Number of lines covered.
    pub fn line_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.last - self.first + 1
        }
    }

    /// Returns `true` if `line` lies in the range.
    pub fn contains(&self, line: usize) -> bool {
        !self.is_empty() && self.first <= line && line <= self.last
    }

    /// Iterate over the covered line numbers.
    pub fn lines(&self) -> std::ops::RangeInclusive<usize> {
        if self.is_empty() {
            // An exhausted range; `RangeInclusive` has no `empty()` constructor.
            let mut empty = 1..=1;
            empty.next();
            return empty;
        }
        self.first..=self.last
    }
}

/// A half-open text range `[begin, end)` spanning one or more lines.
///
/// Invariant: `begin <= end`. Constructing a reversed range is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextRange {
    point_begin: TextPoint,
    point_end: TextPoint,
}

impl TextRange {
    /// Create a range. Panics if `begin > end`.
    pub fn new(begin: TextPoint, end: TextPoint) -> Self {
        assert!(begin <= end, "TextRange: begin {begin} is after end {end}");
        Self {
            point_begin: begin,
            point_end: end,
        }
    }

    /// Create a range from two points in any order.
    pub fn ordered(a: TextPoint, b: TextPoint) -> Self {
        if a <= b {
            Self::new(a, b)
        } else {
            Self::new(b, a)
        }
    }

    /// Create an empty range located at `point`.
    pub fn empty_at(point: TextPoint) -> Self {
        Self::new(point, point)
    }

    /// Create a range on a single line from a char range (`INVALID` is kept as is).
    pub fn on_line(line: usize, range: CharRange) -> Self {
        Self::new(TextPoint::new(line, range.begin), TextPoint::new(line, range.end))
    }

    /// Start point (inclusive).
    pub fn point_begin(&self) -> TextPoint {
        self.point_begin
    }

    /// End point (exclusive).
    pub fn point_end(&self) -> TextPoint {
        self.point_end
    }

    /// Set both ends. Panics if `begin > end`.
    pub fn set(&mut self, begin: TextPoint, end: TextPoint) {
        *self = Self::new(begin, end);
    }

    /// Returns `true` if the range selects nothing.
    pub fn is_empty(&self) -> bool {
        self.point_begin == self.point_end
    }

    /// Returns `true` if the range lies on one line.
    pub fn single_line(&self) -> bool {
        self.point_begin.line == self.point_end.line
    }

    /// The lines touched by this range.
    pub fn line_range(&self) -> LineRange {
        LineRange::new(self.point_begin.line, self.point_end.line)
    }

    /// Returns `true` if `point` lies in `[begin, end)`.
    pub fn contains(&self, point: TextPoint) -> bool {
        self.point_begin <= point && point < self.point_end
    }

    /// Decompose the range into the char range it covers on `line`.
    ///
    /// - single line: `[begin.x, end.x)`
    /// - first line: `[begin.x, INVALID)`
    /// - last line: `[0, end.x)`
    /// - middle line: `[0, INVALID)`
    /// - outside: `None`
    pub fn char_range(&self, line: usize) -> Option<CharRange> {
        let (b, e) = (self.point_begin, self.point_end);
        if line < b.line || line > e.line {
            return None;
        }

        let range = if b.line == e.line {
            CharRange::new(b.x, e.x)
        } else if line == b.line {
            CharRange::new(b.x, INVALID)
        } else if line == e.line {
            CharRange::new(0, e.x)
        } else {
            CharRange::whole_line()
        };
        Some(range)
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.point_begin, self.point_end)
    }
}
