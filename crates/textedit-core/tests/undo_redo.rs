mod common;

use common::{buffer, init_tracing, lines};
use pretty_assertions::assert_eq;
use textedit_core::{
    Action, CaretState, ChangeLog, CharRange, Context, Options, SelectDir, Selection, Style,
    TextBuffer, TextPoint, TextRange,
};

fn type_text(buffer: &mut TextBuffer, mut at: TextPoint, text: &str) -> TextPoint {
    for ch in text.chars() {
        at = buffer.exec(Action::insert_char(at, ch)).unwrap();
    }
    at
}

#[test]
fn test_undo_redo_insert_string() {
    init_tracing();
    let mut buffer = buffer("");

    let end = buffer.exec(Action::insert_string(TextPoint::new(1, 0), "ab\ncd"));
    assert_eq!(end, Some(TextPoint::new(2, 2)));
    assert_eq!(buffer.text(), "ab\ncd");
    assert!(buffer.can_undo());
    assert!(!buffer.can_redo());

    let caret = buffer.undo().unwrap();
    assert_eq!(caret.caret, TextPoint::new(1, 0));
    assert_eq!(buffer.text(), "");
    assert!(!buffer.can_undo());
    assert!(buffer.can_redo());

    let caret = buffer.redo().unwrap();
    assert_eq!(caret.caret, TextPoint::new(2, 2));
    assert_eq!(buffer.text(), "ab\ncd");
    assert!(!buffer.can_redo());
}

#[test]
fn test_undo_on_empty_history_is_noop() {
    let mut buffer = buffer("text");
    assert!(buffer.undo().is_none());
    assert!(buffer.redo().is_none());
    assert_eq!(buffer.text(), "text");
    assert!(!buffer.modified());
}

#[test]
fn test_typing_coalesces_per_word() {
    let mut buffer = buffer("");
    let end = type_text(&mut buffer, TextPoint::new(1, 0), "let value");
    assert_eq!(buffer.text(), "let value");
    // "let", " ", "value"
    assert_eq!(buffer.undo_depth(), 3);

    buffer.undo();
    assert_eq!(buffer.text(), "let ");
    assert_eq!(buffer.redo_depth(), 1);

    buffer.redo();
    assert_eq!(buffer.text(), "let value");
    assert_eq!(buffer.redo().map(|c| c.caret), None);
    assert_eq!(end, TextPoint::new(1, 9));
}

#[test]
fn test_group_is_one_step_and_restores_caret() {
    let mut buffer = buffer("one\ntwo\nthree");
    let selection = Selection::from_points(TextPoint::new(1, 0), TextPoint::new(3, 5), false);
    let caret = CaretState::from_selection(selection);

    buffer.begin_group(caret);
    for line in 1..=3 {
        buffer.exec(Action::insert_string(TextPoint::new(line, 0), "// "));
    }
    assert!(buffer.in_group());
    buffer.end_group();
    assert!(!buffer.in_group());

    assert_eq!(lines(&buffer), vec!["// one", "// two", "// three"]);
    assert_eq!(buffer.undo_depth(), 1);

    let restored = buffer.undo().unwrap();
    assert_eq!(restored, caret);
    assert_eq!(restored.selection.dir, SelectDir::Forward);
    assert_eq!(buffer.text(), "one\ntwo\nthree");
}

#[test]
fn test_action_group_value_undoes_as_one() {
    let mut buffer = buffer("hello world");
    let group = Action::Group(vec![
        Action::delete_range(TextRange::on_line(1, CharRange::new(6, 11))),
        Action::insert_string(TextPoint::new(1, 6), "there"),
        Action::Group(vec![Action::insert_char(TextPoint::new(1, 11), '!')]),
    ]);
    assert_eq!(buffer.exec(group), Some(TextPoint::new(1, 12)));
    assert_eq!(buffer.text(), "hello there!");
    assert_eq!(buffer.undo_depth(), 1);

    buffer.undo();
    assert_eq!(buffer.text(), "hello world");
    buffer.redo();
    assert_eq!(buffer.text(), "hello there!");
}

#[test]
fn test_modified_tracks_save_point_through_undo() {
    let mut buffer = buffer("abc");
    assert!(!buffer.modified());

    buffer.exec(Action::insert_string(TextPoint::new(1, 3), "d"));
    assert!(buffer.modified());
    buffer.undo();
    assert!(!buffer.modified());
    buffer.redo();
    assert!(buffer.modified());

    buffer.undo();
    buffer.exec(Action::insert_string(TextPoint::new(1, 0), "z"));
    assert!(buffer.modified());
    buffer.undo();
    assert!(!buffer.modified());
}

#[test]
fn test_read_only_rejects_edits_and_history() {
    let mut buffer = buffer("fixed");
    buffer.exec(Action::insert_string(TextPoint::new(1, 0), "x"));
    buffer.set_read_only(true);

    assert_eq!(buffer.exec(Action::insert_char(TextPoint::new(1, 0), 'y')), None);
    assert!(buffer.undo().is_none());
    assert_eq!(buffer.text(), "xfixed");

    buffer.set_read_only(false);
    buffer.undo();
    assert_eq!(buffer.text(), "fixed");
}

#[test]
fn test_undo_limit_drops_oldest() {
    let options = Options {
        undo_limit: 2,
        ..Options::default()
    };
    let mut buffer = TextBuffer::new(Context::new(options, Style::default()));
    for (i, s) in ["a", "b", "c"].iter().enumerate() {
        buffer.exec(Action::insert_string(TextPoint::new(1, i), *s));
    }
    assert_eq!(buffer.undo_depth(), 2);
    buffer.undo();
    buffer.undo();
    assert!(buffer.undo().is_none());
    assert_eq!(buffer.text(), "a");
    // The save point was evicted with the oldest entry.
    assert!(buffer.modified());
}

#[test]
fn test_rect_delete_selection() {
    let mut buffer = buffer("foo\nbar\nbaz");
    let selection = Selection::from_points(TextPoint::new(1, 2), TextPoint::new(3, 1), true);
    assert_eq!(selection.char_range(2), Some(CharRange::new(1, 2)));

    let log = ChangeLog::new();
    buffer.attach_listener(&log);
    let caret = buffer.delete_selection(&selection);

    assert_eq!(caret, Some(TextPoint::new(1, 1)));
    assert_eq!(lines(&buffer), vec!["fo", "br", "bz"]);
    assert_eq!(log.take().len(), 3 + 1);

    buffer.undo();
    assert_eq!(buffer.text(), "foo\nbar\nbaz");
}

#[test]
fn test_backward_selection_delete_restores_selection() {
    let mut buffer = buffer("alpha\nbeta");
    let selection = Selection::from_points(TextPoint::new(2, 2), TextPoint::new(1, 3), false);
    assert_eq!(selection.dir, SelectDir::Backward);

    assert_eq!(buffer.delete_selection(&selection), Some(TextPoint::new(1, 3)));
    assert_eq!(buffer.text(), "alpta");

    let restored = buffer.undo().unwrap();
    assert_eq!(restored.caret, TextPoint::new(1, 3));
    assert_eq!(restored.selection, selection);
    assert_eq!(buffer.text(), "alpha\nbeta");
}

#[test]
fn test_direct_edit_drops_history() {
    init_tracing();
    let mut buffer = buffer("abc");
    buffer.exec(Action::delete_range(TextRange::on_line(1, CharRange::new(1, 3))));
    assert!(buffer.can_undo());

    buffer.delete_text(TextRange::on_line(1, CharRange::new(0, 1)));
    assert!(!buffer.can_undo());
    assert!(!buffer.can_redo());
    assert!(buffer.undo().is_none());
    assert_eq!(buffer.text(), "");
    assert!(buffer.modified());

    buffer.insert_text(TextPoint::new(1, 0), "xy");
    buffer.exec(Action::insert_string(TextPoint::new(1, 2), "z"));
    buffer.undo();
    buffer.insert_text(TextPoint::new(1, 0), "w");
    assert!(buffer.redo().is_none());
    assert_eq!(buffer.text(), "wxy");
}
