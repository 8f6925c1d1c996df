mod common;

use common::{buffer, init_tracing, lines};
use pretty_assertions::assert_eq;
use textedit_core::find::{find, find_all, replace_all, replace_current};
use textedit_core::{CharRange, FindOptions, Selection, TextPoint, TextRange};

fn on_line(line: usize, b: usize, e: usize) -> TextRange {
    TextRange::on_line(line, CharRange::new(b, e))
}

#[test]
fn test_find_next_wraps_once() {
    init_tracing();
    let buffer = buffer("foo bar\nbar foo");
    let opts = FindOptions::default();

    let hit = find(&buffer, TextPoint::new(1, 1), "foo", &opts).unwrap();
    assert_eq!(hit.range, on_line(2, 4, 7));
    assert!(!hit.wrapped);

    let hit = find(&buffer, hit.range.point_end(), "foo", &opts).unwrap();
    assert_eq!(hit.range, on_line(1, 0, 3));
    assert!(hit.wrapped);

    let no_cycle = FindOptions {
        cycle: false,
        ..opts
    };
    assert!(find(&buffer, TextPoint::new(2, 7), "foo", &no_cycle).is_none());
}

#[test]
fn test_find_previous() {
    let buffer = buffer("ab ab\nab");
    let opts = FindOptions {
        reverse: true,
        ..FindOptions::default()
    };
    let hit = find(&buffer, TextPoint::new(1, 4), "ab", &opts).unwrap();
    assert_eq!(hit.range, on_line(1, 0, 2));

    let hit = find(&buffer, TextPoint::new(1, 0), "ab", &opts).unwrap();
    assert_eq!(hit.range, on_line(2, 0, 2));
    assert!(hit.wrapped);
}

#[test]
fn test_case_and_whole_word_flags() {
    let buffer = buffer("Cat cat concat CAT");
    let insensitive = FindOptions {
        case_sensitive: false,
        ..FindOptions::default()
    };
    assert_eq!(find_all(&buffer, "cat", buffer.range(), &insensitive).len(), 4);

    let words = FindOptions {
        whole_word: true,
        ..insensitive
    };
    assert_eq!(
        find_all(&buffer, "cat", buffer.range(), &words),
        vec![on_line(1, 0, 3), on_line(1, 4, 7), on_line(1, 15, 18)]
    );
}

#[test]
fn test_bad_pattern_finds_nothing() {
    let buffer = buffer("a(b");
    let regex = FindOptions {
        use_regex: true,
        ..FindOptions::default()
    };
    assert!(find(&buffer, TextPoint::new(1, 0), "(", &regex).is_none());
    assert!(find(&buffer, TextPoint::new(1, 0), "", &FindOptions::default()).is_none());
    // The same text as a plain pattern is escaped.
    assert!(find(&buffer, TextPoint::new(1, 0), "(", &FindOptions::default()).is_some());
}

#[test]
fn test_replace_all_is_one_undo_step() {
    let mut buffer = buffer("aXaXaX\nnone\naa");
    let full = buffer.range();
    let count = replace_all(&mut buffer, "a", "bb", full, &FindOptions::default());
    assert_eq!(count, 5);
    assert_eq!(lines(&buffer), vec!["bbXbbXbbX", "none", "bbbb"]);
    assert_eq!(buffer.undo_depth(), 1);

    buffer.undo();
    assert_eq!(buffer.text(), "aXaXaX\nnone\naa");
}

#[test]
fn test_replace_all_respects_range_end() {
    let mut buffer = buffer("aaaa");
    let range = on_line(1, 1, 3);
    let count = replace_all(&mut buffer, "a", "long", range, &FindOptions::default());
    assert_eq!(count, 2);
    assert_eq!(buffer.text(), "alonglonga");
}

#[test]
fn test_regex_replace_with_captures() {
    let mut buffer = buffer("key=value\nother=thing");
    let regex = FindOptions {
        use_regex: true,
        ..FindOptions::default()
    };
    let full = buffer.range();
    let count = replace_all(&mut buffer, r"(\w+)=(\w+)", "$2: $1", full, &regex);
    assert_eq!(count, 2);
    assert_eq!(lines(&buffer), vec!["value: key", "thing: other"]);
}

#[test]
fn test_replace_with_multiline_text() {
    let mut buffer = buffer("a;b;c");
    let full = buffer.range();
    let count = replace_all(&mut buffer, ";", "\n", full, &FindOptions::default());
    assert_eq!(count, 2);
    assert_eq!(lines(&buffer), vec!["a", "b", "c"]);
}

#[test]
fn test_replace_current_requires_exact_match() {
    let mut buffer = buffer("hello world");
    let opts = FindOptions::default();

    let partial = Selection::from_points(TextPoint::new(1, 6), TextPoint::new(1, 9), false);
    assert!(replace_current(&mut buffer, &partial, "world", "there", &opts).is_none());

    let exact = Selection::from_points(TextPoint::new(1, 6), TextPoint::new(1, 11), false);
    let caret = replace_current(&mut buffer, &exact, "world", "there", &opts);
    assert_eq!(caret, Some(TextPoint::new(1, 11)));
    assert_eq!(buffer.text(), "hello there");

    let restored = buffer.undo().unwrap();
    assert_eq!(restored.selection, exact);
    assert_eq!(buffer.text(), "hello world");
}

#[test]
fn test_unicode_columns_are_chars() {
    let buffer = buffer("héllo wörld wörld");
    let found = find_all(&buffer, "wörld", buffer.range(), &FindOptions::default());
    assert_eq!(found, vec![on_line(1, 6, 11), on_line(1, 12, 17)]);
}
