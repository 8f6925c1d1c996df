//! Edit actions executed through the undo history.

use crate::coord::{TextPoint, TextRange};
use crate::selection::Selection;

/// An atomic (or grouped) edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Insert one character. Consecutive word characters typed in sequence coalesce into
    /// one undo step.
    InsertChar {
        /// Insertion point.
        point: TextPoint,
        /// The character.
        ch: char,
    },
    /// Insert a string, possibly spanning lines.
    InsertString {
        /// Insertion point.
        point: TextPoint,
        /// The text.
        text: String,
    },
    /// Delete a range.
    DeleteRange {
        /// The range to delete.
        range: TextRange,
    },
    /// A sequence of actions undone as one step. Nested groups are flattened.
    Group(Vec<Action>),
}

impl Action {
    /// Insert `ch` at `point`.
    pub fn insert_char(point: TextPoint, ch: char) -> Self {
        Self::InsertChar { point, ch }
    }

    /// Insert `text` at `point`.
    pub fn insert_string(point: TextPoint, text: impl Into<String>) -> Self {
        Self::InsertString {
            point,
            text: text.into(),
        }
    }

    /// Delete `range`.
    pub fn delete_range(range: TextRange) -> Self {
        Self::DeleteRange { range }
    }

    /// Where the edit starts; `None` for an empty group.
    pub fn start(&self) -> Option<TextPoint> {
        match self {
            Self::InsertChar { point, .. } | Self::InsertString { point, .. } => Some(*point),
            Self::DeleteRange { range } => Some(range.point_begin()),
            Self::Group(actions) => actions.first().and_then(Action::start),
        }
    }

    /// Attach the caret state to restore when this action is undone.
    pub fn with_caret(self, caret: CaretState) -> CaretAction {
        CaretAction {
            action: self,
            caret,
        }
    }
}

/// Caret and selection captured when an action is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaretState {
    /// Caret position.
    pub caret: TextPoint,
    /// Selection at that time (empty when nothing was selected).
    pub selection: Selection,
}

impl CaretState {
    /// A caret at `point` with an empty selection.
    pub fn at(point: TextPoint) -> Self {
        Self {
            caret: point,
            selection: Selection::caret_at(point),
        }
    }

    /// The state of `selection`: its live end is the caret.
    pub fn from_selection(selection: Selection) -> Self {
        Self {
            caret: selection.caret(),
            selection,
        }
    }
}

/// An action paired with the caret state it restores on undo.
///
/// Converting a bare [`Action`] captures a caret at the action's start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaretAction {
    /// The edit.
    pub action: Action,
    /// Caret state restored on undo.
    pub caret: CaretState,
}

impl From<Action> for CaretAction {
    fn from(action: Action) -> Self {
        let caret = CaretState::at(action.start().unwrap_or_default());
        Self { action, caret }
    }
}

/// An edit as it was applied, with enough data to revert and re-apply it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Applied {
    Insert {
        begin: TextPoint,
        end: TextPoint,
        text: String,
    },
    Delete {
        begin: TextPoint,
        end: TextPoint,
        text: String,
    },
}

impl Applied {
    /// Caret position right after applying the edit forward.
    pub(crate) fn caret_after(&self) -> TextPoint {
        match self {
            Self::Insert { end, .. } => *end,
            Self::Delete { begin, .. } => *begin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_action_captures_caret_at_start() {
        let range = TextRange::new(TextPoint::new(2, 1), TextPoint::new(3, 0));
        let recorded: CaretAction = Action::delete_range(range).into();
        assert_eq!(recorded.caret.caret, TextPoint::new(2, 1));
        assert!(recorded.caret.selection.is_empty());

        let group = Action::Group(vec![
            Action::insert_char(TextPoint::new(4, 0), 'x'),
            Action::insert_char(TextPoint::new(4, 1), 'y'),
        ]);
        assert_eq!(group.start(), Some(TextPoint::new(4, 0)));
        assert_eq!(Action::Group(Vec::new()).start(), None);
    }

    #[test]
    fn test_caret_state_from_backward_selection() {
        let sel = Selection::from_points(TextPoint::new(3, 0), TextPoint::new(1, 4), false);
        let state = CaretState::from_selection(sel);
        assert_eq!(state.caret, TextPoint::new(1, 4));
        assert_eq!(state.selection, sel);
    }
}
