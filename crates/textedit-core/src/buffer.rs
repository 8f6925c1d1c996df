//! The line buffer.
//!
//! A [`TextBuffer`] is an ordered, 1-indexed sequence of [`TextLine`]s plus the file state
//! that goes with it (encoding, EOL format, path, flags) and the undo history. Every
//! mutation notifies attached [`BufferListener`]s before it returns.
//!
//! Notification rules:
//! - insert on line `l` adding `k` line breaks: `Updated(l..l)`, then `Added(l+1..l+k)`;
//! - delete of `[b, e)` across lines: `Updated(b.line)`, then `Deleted(b.line+1..e.line)`
//!   in pre-deletion numbering;
//! - whole-buffer replacement: `Refresh(1..count)`.

use crate::coord::{CharRange, INVALID, LineRange, TextPoint, TextRange};
use crate::encoding::Encoding;
use crate::file_format::{FileFormat, split_lines};
use crate::file_type::FileTypePlugin;
use crate::find::{FindOptions, Matcher};
use crate::lex::LexSpan;
use crate::listener::{BufferChange, BufferListener, LineChange, ListenerId, Listeners};
use crate::options::Context;
use crate::text_line::TextLine;
use crate::undo::History;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

/// An editable text document.
///
/// Not thread-safe: the listener list holds `Rc`/`Weak` handles, so a buffer cannot be
/// shared across threads.
#[derive(Debug)]
pub struct TextBuffer {
    context: Arc<Context>,
    lines: Vec<TextLine>,
    next_line_id: usize,
    encoding: Encoding,
    file_format: FileFormat,
    file_path: Option<PathBuf>,
    read_only: bool,
    modified: bool,
    file_type: Option<Arc<dyn FileTypePlugin>>,
    pub(crate) history: History,
    listeners: Listeners,
}

impl TextBuffer {
    /// Create a new, untitled buffer holding one empty line.
    pub fn new(context: Arc<Context>) -> Self {
        let options = &context.options;
        let history = History::new(options.undo_limit);
        let encoding = options.encoding.default;
        let file_format = options.file_format;
        Self {
            context,
            lines: vec![TextLine::new(0, "")],
            next_line_id: 1,
            encoding,
            file_format,
            file_path: None,
            read_only: false,
            modified: false,
            file_type: None,
            history,
            listeners: Listeners::default(),
        }
    }

    /// Create an untitled buffer with initial content. The buffer starts unmodified.
    pub fn from_text(context: Arc<Context>, text: &str) -> Self {
        let mut buffer = Self::new(context);
        buffer.replace_lines(text);
        buffer
    }

    /// The shared context.
    pub fn context(&self) -> &Arc<Context> {
        &self.context
    }

    // ------------------------------------------------------------------
    // Content access
    // ------------------------------------------------------------------

    /// Number of lines; never zero.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line `n` (1-based). Panics if `n` is out of range.
    pub fn line(&self, n: usize) -> &TextLine {
        assert!(
            n >= 1 && n <= self.lines.len(),
            "line {n} out of range 1..={}",
            self.lines.len()
        );
        &self.lines[n - 1]
    }

    /// Line `n` (1-based), or `None` if out of range.
    pub fn get_line(&self, n: usize) -> Option<&TextLine> {
        n.checked_sub(1).and_then(|i| self.lines.get(i))
    }

    /// Iterate over all lines in order.
    pub fn lines(&self) -> impl Iterator<Item = &TextLine> {
        self.lines.iter()
    }

    /// Length of line `n` in characters.
    pub fn line_length(&self, n: usize) -> usize {
        self.line(n).len()
    }

    /// Text of line `n`.
    pub fn line_data(&self, n: usize) -> &str {
        self.line(n).data()
    }

    /// The range covering the whole buffer.
    pub fn range(&self) -> TextRange {
        let last = self.line_count();
        TextRange::new(TextPoint::new(1, 0), TextPoint::new(last, self.line_length(last)))
    }

    /// The line number currently holding the line with stable id `id`.
    pub fn line_by_id(&self, id: usize) -> Option<usize> {
        self.lines.iter().position(|l| l.id() == id).map(|i| i + 1)
    }

    /// The text in `range`, lines joined with `'\n'`.
    pub fn get_text(&self, range: TextRange) -> String {
        let range = self.clip_range(range);
        let (b, e) = (range.point_begin(), range.point_end());
        let mut out = String::new();
        for line in b.line..=e.line {
            if line > b.line {
                out.push('\n');
            }
            if let Some(chars) = range.char_range(line) {
                out.push_str(self.lines[line - 1].sub(chars));
            }
        }
        out
    }

    /// The whole content, lines joined with `'\n'`.
    pub fn text(&self) -> String {
        FileFormat::Unix.join(self.lines.iter().map(TextLine::data))
    }

    /// Clamp `point` to an existing position.
    pub fn clip_point(&self, point: TextPoint) -> TextPoint {
        let line = point.line.clamp(1, self.line_count());
        TextPoint::new(line, point.x.min(self.line_length(line)))
    }

    /// Clamp both ends of `range` to existing positions.
    pub fn clip_range(&self, range: TextRange) -> TextRange {
        TextRange::new(
            self.clip_point(range.point_begin()),
            self.clip_point(range.point_end()),
        )
    }

    fn assert_point(&self, point: TextPoint) {
        assert!(
            point.line >= 1 && point.line <= self.lines.len(),
            "point {point} has no line (buffer has {} lines)",
            self.lines.len()
        );
        assert!(
            point.x <= self.lines[point.line - 1].len(),
            "point {point} is past the end of its line"
        );
    }

    // ------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------

    /// Insert `text` at `point`; returns the point just past the inserted text.
    ///
    /// `text` may contain any mix of CRLF/LF/CR line breaks. The edit is not recorded (use
    /// [`TextBuffer::exec`] for that): recorded positions would no longer be valid, so the
    /// undo history is cleared. Marks the buffer modified. Panics if `point` does not exist.
    pub fn insert_text(&mut self, point: TextPoint, text: &str) -> TextPoint {
        let end = self.insert_raw(point, text);
        if end != point {
            self.history.clear();
            self.mark_dirty();
        }
        end
    }

    /// Delete `[begin, end)`, merging lines when the range spans a line break; returns the
    /// removed text with `'\n'` line separators.
    ///
    /// Like [`TextBuffer::insert_text`], the edit is not recorded and clears the undo
    /// history. Panics if the range has no lines.
    pub fn delete_text(&mut self, range: TextRange) -> String {
        let removed = self.delete_raw(range);
        if !removed.is_empty() {
            self.history.clear();
            self.mark_dirty();
        }
        removed
    }

    /// Replace the whole content. Clears undo history; raises `Refresh`.
    pub fn set_text(&mut self, text: &str) {
        self.replace_lines(text);
        self.history.clear();
        self.listeners
            .notify_line(LineChange::Refresh, LineRange::new(1, self.line_count()));
        self.mark_dirty();
    }

    /// Reset to a single empty line. Clears undo history; raises `Refresh`.
    pub fn clear(&mut self) {
        self.set_text("");
    }

    pub(crate) fn replace_lines(&mut self, text: &str) {
        let lines: Vec<TextLine> = split_lines(text)
            .into_iter()
            .map(|data| TextLine::new(self.alloc_id(), data))
            .collect();
        self.lines = lines;
        self.relex(LineRange::new(1, self.line_count()));
    }

    fn alloc_id(&mut self) -> usize {
        let id = self.next_line_id;
        self.next_line_id += 1;
        id
    }

    pub(crate) fn insert_raw(&mut self, point: TextPoint, text: &str) -> TextPoint {
        self.assert_point(point);
        if text.is_empty() {
            return point;
        }

        let segments = split_lines(text);
        let l = point.line;
        if let [single] = segments.as_slice() {
            self.lines[l - 1].insert_str(point.x, single);
            self.relex(LineRange::single(l));
            self.listeners
                .notify_line(LineChange::Updated, LineRange::single(l));
            return TextPoint::new(l, point.x + single.chars().count());
        }

        let k = segments.len() - 1;
        let end_x = segments[k].chars().count();
        if point.x == 0 {
            // Text pushed down from the line start keeps the line's id.
            let mut added = Vec::with_capacity(k);
            for seg in &segments[..k] {
                let id = self.alloc_id();
                added.push(TextLine::new(id, *seg));
            }
            self.lines[l - 1].insert_str(0, segments[k]);
            self.lines.splice(l - 1..l - 1, added);
            return self.finish_split(l, k, end_x);
        }

        let tail = {
            let line = &mut self.lines[l - 1];
            let tail = line.split_off(point.x);
            line.append(segments[0]);
            tail
        };

        let mut added = Vec::with_capacity(k);
        for seg in &segments[1..] {
            let id = self.alloc_id();
            added.push(TextLine::new(id, *seg));
        }
        if let Some(last) = added.last_mut() {
            last.append(&tail);
        }
        self.lines.splice(l..l, added);
        self.finish_split(l, k, end_x)
    }

    fn finish_split(&mut self, l: usize, k: usize, end_x: usize) -> TextPoint {
        self.relex(LineRange::new(l, l + k));
        self.listeners
            .notify_line(LineChange::Updated, LineRange::single(l));
        self.listeners
            .notify_line(LineChange::Added, LineRange::new(l + 1, l + k));
        TextPoint::new(l + k, end_x)
    }

    pub(crate) fn delete_raw(&mut self, range: TextRange) -> String {
        let (b, e) = (range.point_begin(), range.point_end());
        self.assert_point(TextPoint::new(b.line, 0));
        self.assert_point(TextPoint::new(e.line, 0));
        let range = self.clip_range(range);
        let (b, e) = (range.point_begin(), range.point_end());
        if range.is_empty() {
            return String::new();
        }

        if b.line == e.line {
            let removed = self.lines[b.line - 1].delete(CharRange::new(b.x, e.x));
            self.relex(LineRange::single(b.line));
            self.listeners
                .notify_line(LineChange::Updated, LineRange::single(b.line));
            return removed;
        }

        let mut removed = self.lines[b.line - 1].split_off(b.x);
        for line in &self.lines[b.line..e.line - 1] {
            removed.push('\n');
            removed.push_str(line.data());
        }
        let last = &self.lines[e.line - 1];
        removed.push('\n');
        removed.push_str(last.sub(CharRange::new(0, e.x)));
        let tail = last.sub(CharRange::new(e.x, INVALID)).to_string();

        if b.x == 0 {
            // The merged line is all of line `e`'s tail, so it keeps that line's id.
            self.lines[e.line - 1].delete(CharRange::new(0, e.x));
            self.lines.drain(b.line - 1..e.line - 1);
        } else {
            self.lines[b.line - 1].append(&tail);
            self.lines.drain(b.line..e.line);
        }

        self.relex(LineRange::single(b.line));
        self.listeners
            .notify_line(LineChange::Updated, LineRange::single(b.line));
        self.listeners
            .notify_line(LineChange::Deleted, LineRange::new(b.line + 1, e.line));
        removed
    }

    /// Replace the lex spans of line `n` (bypassing the file-type plugin); raises `Updated`.
    pub fn set_line_lex(&mut self, n: usize, spans: Vec<LexSpan>) {
        assert!(n >= 1 && n <= self.lines.len(), "line {n} out of range");
        self.lines[n - 1].set_lex_spans(spans);
        self.listeners
            .notify_line(LineChange::Updated, LineRange::single(n));
    }

    fn relex(&mut self, range: LineRange) {
        let Some(plugin) = self.file_type.clone() else {
            return;
        };
        for n in range.lines() {
            if let Some(line) = self.lines.get_mut(n - 1) {
                let spans = plugin.lex_line(line.data());
                line.set_lex_spans(spans);
            }
        }
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// First match of `pattern` within `source_range`, or the last match when
    /// `options.reverse` is set. Regex patterns always search forward.
    ///
    /// An empty pattern, a pattern that fails to compile, or no match yields `None`.
    pub fn find_string(
        &self,
        pattern: &str,
        source_range: TextRange,
        options: &FindOptions,
    ) -> Option<TextRange> {
        let matcher = Matcher::new(pattern, options)?;
        let source_range = self.clip_range(source_range);
        let reverse = options.reverse && !options.use_regex;

        let search_line = |n: usize| {
            let chars = source_range.char_range(n)?;
            let data = self.lines[n - 1].data();
            let found = if reverse {
                matcher.rfind_in_line(data, chars)
            } else {
                matcher.find_in_line(data, chars)
            };
            found.map(|m| TextRange::on_line(n, m))
        };

        let lines = source_range.line_range().lines();
        if reverse {
            lines.rev().find_map(search_line)
        } else {
            lines.into_iter().find_map(search_line)
        }
    }

    /// All non-overlapping matches of `pattern` within `source_range`, in document order.
    pub fn find_string_all(
        &self,
        pattern: &str,
        source_range: TextRange,
        options: &FindOptions,
    ) -> Vec<TextRange> {
        let Some(matcher) = Matcher::new(pattern, options) else {
            return Vec::new();
        };
        let source_range = self.clip_range(source_range);
        let mut found = Vec::new();
        for n in source_range.line_range().lines() {
            let Some(chars) = source_range.char_range(n) else {
                continue;
            };
            let data = self.lines[n - 1].data();
            found.extend(
                matcher
                    .find_all_in_line(data, chars)
                    .into_iter()
                    .map(|m| TextRange::on_line(n, m)),
            );
        }
        found
    }

    // ------------------------------------------------------------------
    // File state and flags
    // ------------------------------------------------------------------

    /// Returns `true` for an untitled buffer that has never been loaded or saved.
    pub fn is_new(&self) -> bool {
        self.file_path.is_none()
    }

    /// The file path, if any.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub(crate) fn set_file_path(&mut self, path: PathBuf) {
        if self.file_path.as_deref() != Some(path.as_path()) {
            self.file_path = Some(path);
            self.listeners.notify_buffer(BufferChange::FileName);
        }
    }

    /// Returns `true` if edits are rejected.
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Set the read-only flag.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Returns `true` if the content differs from the last load/save.
    pub fn modified(&self) -> bool {
        self.modified
    }

    pub(crate) fn set_modified(&mut self, modified: bool) {
        if self.modified != modified {
            self.modified = modified;
            self.listeners.notify_buffer(BufferChange::Modified);
        }
    }

    fn mark_dirty(&mut self) {
        self.history.forget_save_point();
        self.set_modified(true);
    }

    /// The file encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Change the encoding used when saving.
    pub fn set_encoding(&mut self, encoding: Encoding) {
        if self.encoding != encoding {
            self.encoding = encoding;
            self.listeners.notify_buffer(BufferChange::Encoding);
            self.mark_dirty();
        }
    }

    pub(crate) fn load_encoding(&mut self, encoding: Encoding) {
        if self.encoding != encoding {
            self.encoding = encoding;
            self.listeners.notify_buffer(BufferChange::Encoding);
        }
    }

    /// The EOL format.
    pub fn file_format(&self) -> FileFormat {
        self.file_format
    }

    /// Change the EOL format used when saving.
    pub fn set_file_format(&mut self, format: FileFormat) {
        if self.file_format != format {
            self.file_format = format;
            self.listeners.notify_buffer(BufferChange::FileFormat);
            self.mark_dirty();
        }
    }

    pub(crate) fn load_file_format(&mut self, format: FileFormat) {
        if self.file_format != format {
            self.file_format = format;
            self.listeners.notify_buffer(BufferChange::FileFormat);
        }
    }

    /// The attached file-type plugin.
    pub fn file_type(&self) -> Option<&Arc<dyn FileTypePlugin>> {
        self.file_type.as_ref()
    }

    /// Swap the plugin without re-lexing; the caller replaces the content next.
    pub(crate) fn set_file_type_silently(&mut self, plugin: Option<Arc<dyn FileTypePlugin>>) {
        let old = self.file_type.as_ref().map(|p| p.id().to_string());
        let new = plugin.as_ref().map(|p| p.id().to_string());
        self.file_type = plugin;
        if old != new {
            self.listeners.notify_buffer(BufferChange::FileType);
        }
    }

    /// Attach (or detach with `None`) a file-type plugin and re-lex every line.
    pub fn set_file_type(&mut self, plugin: Option<Arc<dyn FileTypePlugin>>) {
        self.file_type = plugin;
        if self.file_type.is_none() {
            self.lines.iter_mut().for_each(TextLine::clear_lex);
        }
        self.relex(LineRange::new(1, self.line_count()));
        self.listeners.notify_buffer(BufferChange::FileType);
        self.listeners
            .notify_line(LineChange::Updated, LineRange::new(1, self.line_count()));
    }

    // ------------------------------------------------------------------
    // Listeners
    // ------------------------------------------------------------------

    /// Attach a listener. Only a weak reference is kept; dropping the listener detaches it.
    pub fn attach_listener<L: BufferListener + 'static>(&mut self, listener: &Rc<L>) -> ListenerId {
        self.listeners.attach(listener)
    }

    /// Detach a listener. Returns `false` if it was not attached.
    pub fn detach_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.detach(id)
    }

    pub(crate) fn notify_line(&self, change: LineChange, lines: LineRange) {
        self.listeners.notify_line(change, lines);
    }
}
