//! Undo/redo history and action execution.
//!
//! The history is a pair of owned stacks of entries; each entry is a flat list of applied
//! edits plus the caret state to restore. Groups collect edits until the outermost
//! [`TextBuffer::end_group`], then land on the undo stack as a single entry.
//!
//! The modified flag is derived from a save point: the undo depth at the last load/save.
//! Evicting the entry at the save point, or starting a new branch while the save point is
//! in the redo stack, makes it unreachable.

use crate::action::{Action, Applied, CaretAction, CaretState};
use crate::buffer::TextBuffer;
use crate::coord::{TextPoint, TextRange};
use crate::selection::Selection;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UndoState {
    Idle,
    Executing,
    Undoing,
    Redoing,
}

#[derive(Debug)]
struct Entry {
    edits: Vec<Applied>,
    caret: CaretState,
    /// Typed word characters; later adjacent typing may extend this entry.
    coalesce: bool,
}

#[derive(Debug)]
struct OpenGroup {
    depth: usize,
    caret: CaretState,
    edits: Vec<Applied>,
}

#[derive(Debug)]
pub(crate) struct History {
    undo: VecDeque<Entry>,
    redo: Vec<Entry>,
    group: Option<OpenGroup>,
    state: UndoState,
    /// `0` means unlimited.
    limit: usize,
    save_point: Option<usize>,
}

impl History {
    pub(crate) fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            group: None,
            state: UndoState::Idle,
            limit,
            save_point: Some(0),
        }
    }

    pub(crate) fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.group = None;
        self.save_point = Some(0);
    }

    fn enter(&mut self, state: UndoState) -> bool {
        if self.state != UndoState::Idle {
            tracing::error!(
                current = ?self.state,
                requested = ?state,
                "re-entrant history operation ignored"
            );
            debug_assert!(
                false,
                "re-entrant history operation: {:?} during {:?}",
                state, self.state
            );
            return false;
        }
        self.state = state;
        true
    }

    fn leave(&mut self) {
        self.state = UndoState::Idle;
    }

    pub(crate) fn at_save_point(&self) -> bool {
        let group_clean = self.group.as_ref().is_none_or(|g| g.edits.is_empty());
        group_clean && self.save_point == Some(self.undo.len())
    }

    pub(crate) fn mark_save_point(&mut self) {
        self.close_group();
        self.save_point = Some(self.undo.len());
    }

    pub(crate) fn forget_save_point(&mut self) {
        self.save_point = None;
    }

    fn clear_redo(&mut self) {
        if self.redo.is_empty() {
            return;
        }
        if self.save_point.is_some_and(|p| p > self.undo.len()) {
            self.save_point = None;
        }
        self.redo.clear();
    }

    fn push(&mut self, entry: Entry) {
        self.undo.push_back(entry);
        if self.limit > 0 && self.undo.len() > self.limit {
            self.undo.pop_front();
            self.save_point = match self.save_point {
                Some(0) | None => None,
                Some(p) => Some(p - 1),
            };
        }
    }

    fn record(&mut self, edit: Applied, caret: CaretState, coalesce: bool) {
        self.clear_redo();
        if let Some(group) = &mut self.group {
            group.edits.push(edit);
            return;
        }
        if coalesce && self.try_coalesce(&edit) {
            return;
        }
        self.push(Entry {
            edits: vec![edit],
            caret,
            coalesce,
        });
    }

    fn try_coalesce(&mut self, edit: &Applied) -> bool {
        if self.save_point == Some(self.undo.len()) {
            return false;
        }
        let Some(top) = self.undo.back_mut() else {
            return false;
        };
        if !top.coalesce {
            return false;
        }
        match (top.edits.as_mut_slice(), edit) {
            (
                [Applied::Insert { end, text, .. }],
                Applied::Insert {
                    begin: next_begin,
                    end: next_end,
                    text: next_text,
                },
            ) if *end == *next_begin && next_begin.line == next_end.line => {
                *end = *next_end;
                text.push_str(next_text);
                true
            }
            _ => false,
        }
    }

    fn begin_group(&mut self, caret: CaretState) {
        match &mut self.group {
            Some(group) => group.depth += 1,
            None => {
                self.group = Some(OpenGroup {
                    depth: 1,
                    caret,
                    edits: Vec::new(),
                })
            }
        }
    }

    fn end_group(&mut self) {
        let Some(group) = &mut self.group else {
            return;
        };
        group.depth -= 1;
        if group.depth == 0 {
            self.close_group();
        }
    }

    fn close_group(&mut self) {
        if let Some(group) = self.group.take()
            && !group.edits.is_empty()
        {
            self.push(Entry {
                edits: group.edits,
                caret: group.caret,
                coalesce: false,
            });
        }
    }
}

fn is_word_char(ch: char) -> bool {
    ch == '_' || ch.is_alphanumeric()
}

impl TextBuffer {
    /// Execute an action and record it in the undo history.
    ///
    /// Returns the caret position after the edit, or `None` if the buffer is read-only.
    /// Clears the redo stack. Edits that change nothing are not recorded.
    pub fn exec(&mut self, action: impl Into<CaretAction>) -> Option<TextPoint> {
        let CaretAction { action, caret } = action.into();
        if self.read_only() {
            tracing::debug!("exec rejected: buffer is read-only");
            return None;
        }
        if !self.history.enter(UndoState::Executing) {
            return None;
        }
        let after = self.exec_inner(action, caret);
        self.history.leave();
        self.sync_modified();
        Some(after.unwrap_or(caret.caret))
    }

    fn exec_inner(&mut self, action: Action, caret: CaretState) -> Option<TextPoint> {
        match action {
            Action::Group(actions) => {
                self.history.begin_group(caret);
                let mut last = None;
                for action in actions {
                    if let Some(point) = self.exec_inner(action, caret) {
                        last = Some(point);
                    }
                }
                self.history.end_group();
                last
            }
            Action::InsertChar { point, ch } => {
                let mut buf = [0u8; 4];
                let text = ch.encode_utf8(&mut buf);
                let end = self.insert_raw(point, text);
                let edit = Applied::Insert {
                    begin: point,
                    end,
                    text: text.to_string(),
                };
                self.history.record(edit, caret, is_word_char(ch));
                Some(end)
            }
            Action::InsertString { point, text } => {
                if text.is_empty() {
                    return Some(point);
                }
                let end = self.insert_raw(point, &text);
                self.history
                    .record(Applied::Insert { begin: point, end, text }, caret, false);
                Some(end)
            }
            Action::DeleteRange { range } => {
                let range = self.clip_range(range);
                let begin = range.point_begin();
                if range.is_empty() {
                    return Some(begin);
                }
                let text = self.delete_raw(range);
                let edit = Applied::Delete {
                    begin,
                    end: range.point_end(),
                    text,
                };
                self.history.record(edit, caret, false);
                Some(begin)
            }
        }
    }

    /// Undo the most recent entry; returns the caret state captured when it was recorded.
    ///
    /// An open group is closed first. No-op (`None`) when there is nothing to undo.
    pub fn undo(&mut self) -> Option<CaretState> {
        if self.read_only() || !self.history.enter(UndoState::Undoing) {
            return None;
        }
        self.history.close_group();
        let result = self.history.undo.pop_back().map(|entry| {
            for edit in entry.edits.iter().rev() {
                self.revert(edit);
            }
            let caret = entry.caret;
            self.history.redo.push(entry);
            caret
        });
        self.history.leave();
        self.sync_modified();
        result
    }

    /// Re-apply the most recently undone entry; returns the caret just past the re-applied
    /// edit with an empty selection. No-op (`None`) when there is nothing to redo.
    pub fn redo(&mut self) -> Option<CaretState> {
        if self.read_only() || !self.history.enter(UndoState::Redoing) {
            return None;
        }
        self.history.close_group();
        let result = self.history.redo.pop().map(|entry| {
            let mut caret = entry.caret.caret;
            for edit in &entry.edits {
                self.reapply(edit);
                caret = edit.caret_after();
            }
            self.history.undo.push_back(entry);
            CaretState::at(caret)
        });
        self.history.leave();
        self.sync_modified();
        result
    }

    fn revert(&mut self, edit: &Applied) {
        match edit {
            Applied::Insert { begin, end, .. } => {
                self.delete_raw(TextRange::new(*begin, *end));
            }
            Applied::Delete { begin, text, .. } => {
                self.insert_raw(*begin, text);
            }
        }
    }

    fn reapply(&mut self, edit: &Applied) {
        match edit {
            Applied::Insert { begin, text, .. } => {
                self.insert_raw(*begin, text);
            }
            Applied::Delete { begin, end, .. } => {
                self.delete_raw(TextRange::new(*begin, *end));
            }
        }
    }

    fn sync_modified(&mut self) {
        let dirty = !self.history.at_save_point();
        self.set_modified(dirty);
    }

    /// Returns `true` if there is something to undo (including an open, non-empty group).
    pub fn can_undo(&self) -> bool {
        !self.history.undo.is_empty()
            || self.history.group.as_ref().is_some_and(|g| !g.edits.is_empty())
    }

    /// Returns `true` if there is something to redo.
    pub fn can_redo(&self) -> bool {
        !self.history.redo.is_empty()
    }

    /// Number of entries on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.history.undo.len()
    }

    /// Number of entries on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.history.redo.len()
    }

    /// Open a group; `caret` is restored when the whole group is undone.
    ///
    /// Groups nest: only the outermost [`end_group`](Self::end_group) closes.
    pub fn begin_group(&mut self, caret: CaretState) {
        self.history.begin_group(caret);
    }

    /// Close the innermost group level. Empty groups leave no history entry.
    pub fn end_group(&mut self) {
        self.history.end_group();
        self.sync_modified();
    }

    /// Returns `true` while a group is open.
    pub fn in_group(&self) -> bool {
        self.history.group.is_some()
    }

    /// Drop all undo/redo history.
    pub fn clear_history(&mut self) {
        self.history.clear();
        if self.modified() {
            self.history.forget_save_point();
        }
    }

    pub(crate) fn mark_saved(&mut self) {
        self.history.mark_save_point();
        self.set_modified(false);
    }

    /// Delete the selected text as one undo step; returns the resulting caret.
    ///
    /// Rect selections delete the column span on every covered line without merging
    /// lines; lines shorter than the span lose only what they have.
    pub fn delete_selection(&mut self, selection: &Selection) -> Option<TextPoint> {
        if selection.is_empty() {
            return None;
        }
        let caret = CaretState::from_selection(*selection);
        if !selection.rect {
            return self.exec(Action::delete_range(selection.range).with_caret(caret));
        }

        let lines = selection.line_range();
        let mut actions = Vec::with_capacity(lines.line_count());
        for line in lines.lines() {
            let Some(chars) = selection.char_range(line) else {
                continue;
            };
            let chars = chars.clip(self.line_length(line));
            if !chars.is_empty() {
                actions.push(Action::delete_range(TextRange::on_line(line, chars)));
            }
        }
        self.exec(Action::Group(actions).with_caret(caret))?;

        let first = lines.first;
        let b = selection.range.point_begin().x;
        let e = selection.range.point_end().x;
        Some(TextPoint::new(first, b.min(e).min(self.line_length(first))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{Context, Options};
    use crate::style::Style;
    use pretty_assertions::assert_eq;

    fn buffer(text: &str) -> TextBuffer {
        TextBuffer::from_text(Context::shared_default(), text)
    }

    fn type_text(buffer: &mut TextBuffer, mut at: TextPoint, text: &str) -> TextPoint {
        for ch in text.chars() {
            at = buffer.exec(Action::insert_char(at, ch)).unwrap();
        }
        at
    }

    #[test]
    fn test_exec_clears_redo() {
        let mut buffer = buffer("abc");
        buffer.exec(Action::insert_string(TextPoint::new(1, 3), "!"));
        buffer.undo();
        assert!(buffer.can_redo());

        buffer.exec(Action::insert_string(TextPoint::new(1, 0), "?"));
        assert!(!buffer.can_redo());
        assert_eq!(buffer.text(), "?abc");
    }

    #[test]
    fn test_typed_word_coalesces_into_one_step() {
        let mut buffer = buffer("");
        let end = type_text(&mut buffer, TextPoint::new(1, 0), "hello");
        assert_eq!(end, TextPoint::new(1, 5));
        assert_eq!(buffer.undo_depth(), 1);

        type_text(&mut buffer, end, " x");
        // The space does not coalesce; "x" starts a new word step.
        assert_eq!(buffer.undo_depth(), 3);

        buffer.undo();
        buffer.undo();
        assert_eq!(buffer.text(), "hello");
        let caret = buffer.undo().unwrap();
        assert_eq!(caret.caret, TextPoint::new(1, 0));
        assert_eq!(buffer.text(), "");
    }

    #[test]
    fn test_undo_returns_captured_caret_and_redo_places_caret_after_edit() {
        let mut buffer = buffer("one two");
        let sel = Selection::from_points(TextPoint::new(1, 7), TextPoint::new(1, 4), false);
        let range = sel.range;
        buffer.exec(Action::delete_range(range).with_caret(CaretState::from_selection(sel)));
        assert_eq!(buffer.text(), "one ");

        let undone = buffer.undo().unwrap();
        assert_eq!(undone.selection, sel);
        assert_eq!(undone.caret, TextPoint::new(1, 4));
        assert_eq!(buffer.text(), "one two");

        let redone = buffer.redo().unwrap();
        assert_eq!(redone, CaretState::at(TextPoint::new(1, 4)));
        assert_eq!(buffer.text(), "one ");
    }

    #[test]
    fn test_nested_groups_close_at_outermost() {
        let mut buffer = buffer("abc");
        buffer.begin_group(CaretState::at(TextPoint::new(1, 0)));
        buffer.exec(Action::insert_char(TextPoint::new(1, 0), '1'));
        buffer.begin_group(CaretState::at(TextPoint::new(1, 1)));
        buffer.exec(Action::insert_char(TextPoint::new(1, 1), '2'));
        buffer.end_group();
        assert!(buffer.in_group());
        buffer.exec(Action::insert_char(TextPoint::new(1, 2), '3'));
        buffer.end_group();
        assert!(!buffer.in_group());

        assert_eq!(buffer.text(), "123abc");
        assert_eq!(buffer.undo_depth(), 1);
        buffer.undo();
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_empty_group_leaves_no_entry() {
        let mut buffer = buffer("abc");
        buffer.begin_group(CaretState::default());
        buffer.end_group();
        buffer.exec(Action::delete_range(TextRange::empty_at(TextPoint::new(1, 1))));
        assert!(!buffer.can_undo());
        assert!(!buffer.modified());
    }

    #[test]
    fn test_read_only_rejects_edits() {
        let mut buffer = buffer("abc");
        buffer.set_read_only(true);
        assert_eq!(buffer.exec(Action::insert_char(TextPoint::new(1, 0), 'x')), None);
        assert_eq!(buffer.text(), "abc");
        assert!(!buffer.can_undo());
    }

    #[test]
    fn test_modified_follows_save_point() {
        let mut buffer = buffer("abc");
        assert!(!buffer.modified());
        buffer.exec(Action::insert_string(TextPoint::new(1, 3), "d"));
        assert!(buffer.modified());
        buffer.undo();
        assert!(!buffer.modified());
        buffer.redo();
        assert!(buffer.modified());

        buffer.mark_saved();
        assert!(!buffer.modified());
        buffer.undo();
        assert!(buffer.modified());

        // Branching away from a save point held in the redo stack loses it.
        buffer.exec(Action::insert_string(TextPoint::new(1, 0), "x"));
        buffer.undo();
        assert!(buffer.modified());
    }

    #[test]
    fn test_undo_limit_evicts_oldest() {
        let options = Options {
            undo_limit: 2,
            ..Options::default()
        };
        let mut buffer = TextBuffer::from_text(Context::new(options, Style::default()), "");
        for (i, s) in ["a", "b", "c"].into_iter().enumerate() {
            buffer.exec(Action::insert_string(TextPoint::new(1, i), s));
        }
        assert_eq!(buffer.undo_depth(), 2);
        buffer.undo();
        buffer.undo();
        assert_eq!(buffer.undo(), None);
        assert_eq!(buffer.text(), "a");
        // The save point was evicted, so the buffer stays modified.
        assert!(buffer.modified());
    }

    #[test]
    fn test_undo_on_empty_stack_is_noop() {
        let mut buffer = buffer("abc");
        assert_eq!(buffer.undo(), None);
        assert_eq!(buffer.redo(), None);
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_rect_delete_keeps_lines() {
        let mut buffer = buffer("foo\nbar\nbaz");
        let sel = Selection::from_points(TextPoint::new(1, 2), TextPoint::new(3, 1), true);
        let caret = buffer.delete_selection(&sel);
        assert_eq!(caret, Some(TextPoint::new(1, 1)));
        assert_eq!(buffer.text(), "fo\nbr\nbz");

        buffer.undo();
        assert_eq!(buffer.text(), "foo\nbar\nbaz");
    }
}
