//! Find and replace.
//!
//! Search is line-oriented: patterns are compiled once into a [`Matcher`] and applied to
//! one line at a time, so matches never span line breaks. All positions are char columns.
//!
//! Plain patterns are escaped and compiled into a regex as well, so both modes share one
//! code path. A regex that fails to compile is treated as "no match".

use crate::action::{Action, CaretState};
use crate::buffer::TextBuffer;
use crate::coord::{CharRange, INVALID, TextPoint, TextRange};
use crate::selection::Selection;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Search flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindOptions {
    /// Treat the pattern as a regular expression.
    pub use_regex: bool,
    /// Match case exactly.
    pub case_sensitive: bool,
    /// Only match whole words (alphanumerics and `_`).
    pub whole_word: bool,
    /// Search backward. Ignored for regex patterns.
    pub reverse: bool,
    /// Wrap around the buffer boundary once when nothing is found.
    pub cycle: bool,
}

impl Default for FindOptions {
    fn default() -> Self {
        Self {
            use_regex: false,
            case_sensitive: true,
            whole_word: false,
            reverse: false,
            cycle: true,
        }
    }
}

/// A compiled search pattern.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Regex,
    use_regex: bool,
    whole_word: bool,
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

/// Byte offsets of every char boundary in `text`, including the end.
struct CharIndex {
    char_to_byte: Vec<usize>,
}

impl CharIndex {
    fn new(text: &str) -> Self {
        let mut char_to_byte: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        char_to_byte.push(text.len());
        Self { char_to_byte }
    }

    fn char_count(&self) -> usize {
        self.char_to_byte.len() - 1
    }

    fn byte(&self, x: usize) -> usize {
        self.char_to_byte[x.min(self.char_count())]
    }

    fn char(&self, byte: usize) -> usize {
        match self.char_to_byte.binary_search(&byte) {
            Ok(i) | Err(i) => i,
        }
    }
}

impl Matcher {
    /// Compile `pattern`. Returns `None` for an empty pattern or an invalid regex.
    pub fn new(pattern: &str, options: &FindOptions) -> Option<Self> {
        if pattern.is_empty() {
            return None;
        }
        let source = if options.use_regex {
            pattern.to_string()
        } else {
            regex::escape(pattern)
        };
        match RegexBuilder::new(&source)
            .case_insensitive(!options.case_sensitive)
            .build()
        {
            Ok(regex) => Some(Self {
                regex,
                use_regex: options.use_regex,
                whole_word: options.whole_word,
            }),
            Err(err) => {
                tracing::debug!(pattern, error = %err, "pattern does not compile; no match");
                None
            }
        }
    }

    fn accept(&self, text: &str, m: CharRange) -> bool {
        if m.begin >= m.end {
            return false;
        }
        if !self.whole_word {
            return true;
        }
        let mut chars = text.chars();
        let before = m.begin.checked_sub(1).and_then(|i| text.chars().nth(i));
        let after = chars.nth(m.end);
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    }

    /// Iterate accepted matches of `text` inside `range`, in order, non-overlapping.
    fn matches_in<'a>(
        &'a self,
        text: &'a str,
        range: CharRange,
    ) -> impl Iterator<Item = CharRange> + 'a {
        let index = CharIndex::new(text);
        let range = range.clip(index.char_count());
        let limit = index.byte(range.end);
        let mut at = index.byte(range.begin);
        let haystack = &text[..limit];
        std::iter::from_fn(move || {
            while at <= haystack.len() {
                let m = self.regex.find_at(haystack, at)?;
                let found = CharRange::new(index.char(m.start()), index.char(m.end()));
                if m.start() == m.end() {
                    // Skip empty matches by one char.
                    let next = index.byte(found.end + 1);
                    if next <= at {
                        return None;
                    }
                    at = next;
                    continue;
                }
                if self.accept(text, found) {
                    at = m.end();
                    return Some(found);
                }
                at = index.byte(found.begin + 1);
            }
            None
        })
    }

    /// First match in `range` of `text`.
    pub fn find_in_line(&self, text: &str, range: CharRange) -> Option<CharRange> {
        self.matches_in(text, range).next()
    }

    /// Last match in `range` of `text`.
    pub fn rfind_in_line(&self, text: &str, range: CharRange) -> Option<CharRange> {
        self.matches_in(text, range).last()
    }

    /// All non-overlapping matches in `range` of `text`.
    pub fn find_all_in_line(&self, text: &str, range: CharRange) -> Vec<CharRange> {
        self.matches_in(text, range).collect()
    }

    /// The text replacing match `m` of `text`.
    ///
    /// Regex patterns expand capture references (`$1`, `${name}`); plain patterns insert
    /// `replacement` literally.
    pub fn replacement(&self, text: &str, m: CharRange, replacement: &str) -> String {
        if !self.use_regex {
            return replacement.to_string();
        }
        let index = CharIndex::new(text);
        let start = index.byte(m.begin);
        let end = index.byte(m.end);
        match self.regex.captures_at(&text[..end], start) {
            Some(caps) if caps.get(0).is_some_and(|g| g.start() == start) => {
                let mut out = String::new();
                caps.expand(replacement, &mut out);
                out
            }
            _ => replacement.to_string(),
        }
    }

    /// Replace every match in a whole line; returns the new line and the match count.
    pub fn replace_line(&self, text: &str, replacement: &str) -> (String, usize) {
        let found = self.find_all_in_line(text, CharRange::whole_line());
        if found.is_empty() {
            return (text.to_string(), 0);
        }
        let index = CharIndex::new(text);
        let mut out = String::with_capacity(text.len());
        let mut last = 0usize;
        for m in &found {
            let start = index.byte(m.begin);
            out.push_str(&text[last..start]);
            out.push_str(&self.replacement(text, *m, replacement));
            last = index.byte(m.end);
        }
        out.push_str(&text[last..]);
        (out, found.len())
    }
}

/// A single-find result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindResult {
    /// The match.
    pub range: TextRange,
    /// The match was found after wrapping around the buffer boundary.
    pub wrapped: bool,
}

/// Find the next (or previous, with `reverse`) match starting at `from`.
///
/// Forward searches `[from, end)` first; backward searches `[begin, from)`. With
/// `options.cycle`, the complementary part of the buffer is searched once more. At most two
/// passes are made.
pub fn find(
    buffer: &TextBuffer,
    from: TextPoint,
    pattern: &str,
    options: &FindOptions,
) -> Option<FindResult> {
    let whole = buffer.range();
    let from = buffer.clip_point(from);
    let head = TextRange::new(whole.point_begin(), from);
    let tail = TextRange::new(from, whole.point_end());
    let reverse = options.reverse && !options.use_regex;

    let (first, second) = if reverse { (head, tail) } else { (tail, head) };
    if let Some(range) = buffer.find_string(pattern, first, options) {
        return Some(FindResult {
            range,
            wrapped: false,
        });
    }
    if !options.cycle {
        return None;
    }
    buffer
        .find_string(pattern, second, options)
        .map(|range| FindResult {
            range,
            wrapped: true,
        })
}

/// All non-overlapping matches within `range`, in document order.
pub fn find_all(
    buffer: &TextBuffer,
    pattern: &str,
    range: TextRange,
    options: &FindOptions,
) -> Vec<TextRange> {
    buffer.find_string_all(pattern, range, options)
}

/// Replace every match within `range`; returns the number of replacements.
///
/// The whole operation is one undo group. Each line's matches are found once in its text
/// before any replacement, then applied in order, each resuming just past the text inserted
/// for the previous one. Text exposed by a replacement is never matched again, so anchored
/// patterns behave as in [`Matcher::replace_line`].
pub fn replace_all(
    buffer: &mut TextBuffer,
    pattern: &str,
    replacement: &str,
    range: TextRange,
    options: &FindOptions,
) -> usize {
    let Some(matcher) = Matcher::new(pattern, options) else {
        return 0;
    };
    if buffer.read_only() {
        return 0;
    }
    let range = buffer.clip_range(range);
    let mut count = 0usize;
    // Lines added so far by replacements containing line breaks.
    let mut shift = 0usize;

    buffer.begin_group(CaretState::at(range.point_begin()));
    for n in range.line_range().lines() {
        let Some(chars) = range.char_range(n) else {
            continue;
        };
        let line = n + shift;
        let text = buffer.line_data(line).to_string();
        let found = matcher.find_all_in_line(&text, chars);

        // `cursor` is where column `consumed` of the original line now sits.
        let mut cursor = TextPoint::new(line, 0);
        let mut consumed = 0usize;
        for m in found {
            let begin = TextPoint::new(cursor.line, cursor.x + m.begin - consumed);
            let end = TextPoint::new(begin.line, begin.x + (m.end - m.begin));
            let replaced = matcher.replacement(&text, m, replacement);

            buffer.exec(Action::delete_range(TextRange::new(begin, end)));
            cursor = buffer.exec(Action::insert_string(begin, replaced)).unwrap_or(begin);
            consumed = m.end;
            count += 1;
        }
        shift += cursor.line - line;
    }
    buffer.end_group();

    tracing::debug!(pattern, count, "replace all");
    count
}

/// Replace the selected text if it is exactly a match of `pattern`.
///
/// Returns the caret after the replacement, or `None` when the selection is not a match.
pub fn replace_current(
    buffer: &mut TextBuffer,
    selection: &Selection,
    pattern: &str,
    replacement: &str,
    options: &FindOptions,
) -> Option<TextPoint> {
    let range = selection.range;
    if selection.rect || range.is_empty() || !range.single_line() {
        return None;
    }
    let matcher = Matcher::new(pattern, options)?;
    let line = range.point_begin().line;
    let chars = CharRange::new(range.point_begin().x, range.point_end().x);
    let data = buffer.get_line(line)?.data();
    if matcher.find_in_line(data, CharRange::new(chars.begin, INVALID)) != Some(chars) {
        return None;
    }
    let text = matcher.replacement(data, chars, replacement);

    let caret = CaretState::from_selection(*selection);
    let group = Action::Group(vec![
        Action::delete_range(range),
        Action::insert_string(range.point_begin(), text),
    ]);
    buffer.exec(group.with_caret(caret))
}
