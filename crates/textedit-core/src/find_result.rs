//! The find-results view model.
//!
//! Results are written into a read-only [`TextBuffer`]: a header per search, one line per
//! file and one line per match, formatted as `"  {line}: {text}"`. Lines carry lex spans
//! (file path, line number, matched text) so the view styles them like any other buffer.
//!
//! Each match line remembers where it came from. Matches taken from an open buffer keep
//! the source line's stable id, so the location survives edits to that buffer.

use crate::buffer::TextBuffer;
use crate::coord::{CharRange, NPOS, TextPoint, TextRange};
use crate::find::FindOptions;
use crate::find_worker::{FileMatch, FindEvent};
use crate::lex::{Lex, LexMajor, LexMinor, LexSpan};
use crate::options::Context;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const HEADER: Lex = Lex::major(LexMajor::Special);
const FILE_PATH: Lex = Lex::new(LexMajor::Special, LexMinor::FilePath);
const LINE_NUMBER: Lex = Lex::new(LexMajor::Special, LexMinor::LineNumber);
const MATCH: Lex = Lex::new(LexMajor::Special, LexMinor::Match);
const FAILURE: Lex = Lex::major(LexMajor::Error);

/// Where a result line points to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultLocation {
    /// Source file; `None` for an untitled buffer.
    pub path: Option<PathBuf>,
    /// Stable id of the source line, or [`NPOS`] for matches read from disk.
    pub line_id: usize,
    /// Line number at search time.
    pub line: usize,
    /// Matched columns.
    pub range: CharRange,
}

impl ResultLocation {
    /// The current position of the match in `source`.
    ///
    /// Uses the stable line id when there is one; `None` if that line no longer exists.
    pub fn resolve(&self, source: &TextBuffer) -> Option<TextRange> {
        let line = if self.line_id == NPOS {
            self.line
        } else {
            source.line_by_id(self.line_id)?
        };
        let len = source.get_line(line)?.len();
        Some(TextRange::on_line(line, self.range.clip(len)))
    }
}

/// Accumulates search results into a read-only buffer.
#[derive(Debug)]
pub struct FindResults {
    buffer: TextBuffer,
    locations: HashMap<usize, ResultLocation>,
    pristine: bool,
    files: usize,
    matches: usize,
}

impl FindResults {
    /// Create an empty results view.
    pub fn new(context: Arc<Context>) -> Self {
        let mut buffer = TextBuffer::new(context);
        buffer.set_read_only(true);
        Self {
            buffer,
            locations: HashMap::new(),
            pristine: true,
            files: 0,
            matches: 0,
        }
    }

    /// The results buffer.
    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    /// The results buffer, e.g. to attach listeners.
    pub fn buffer_mut(&mut self) -> &mut TextBuffer {
        &mut self.buffer
    }

    /// Files with at least one match since the last header.
    pub fn file_count(&self) -> usize {
        self.files
    }

    /// Matches since the last header.
    pub fn match_count(&self) -> usize {
        self.matches
    }

    /// Source location of result line `n`, if it is a match line.
    pub fn location(&self, n: usize) -> Option<&ResultLocation> {
        let id = self.buffer.get_line(n)?.id();
        self.locations.get(&id)
    }

    // Appends bypass history and the modified flag: the view is never saved.
    fn push_line(&mut self, text: &str, spans: Vec<LexSpan>) -> usize {
        let n = if self.pristine {
            self.pristine = false;
            self.buffer.insert_raw(TextPoint::new(1, 0), text);
            1
        } else {
            let last = self.buffer.line_count();
            let end = TextPoint::new(last, self.buffer.line_length(last));
            self.buffer.insert_raw(end, &format!("\n{text}"));
            last + 1
        };
        self.buffer.set_line_lex(n, spans);
        n
    }

    /// Start a new search section.
    pub fn begin_search(&mut self, pattern: &str, options: &FindOptions) {
        let mut flags = Vec::new();
        if options.use_regex {
            flags.push("regex");
        }
        if options.case_sensitive {
            flags.push("case");
        }
        if options.whole_word {
            flags.push("word");
        }
        let text = if flags.is_empty() {
            format!("Find \"{pattern}\"")
        } else {
            format!("Find \"{pattern}\" ({})", flags.join(", "))
        };
        let len = text.chars().count();
        self.push_line(&text, vec![LexSpan::new(0, len, HEADER)]);
        self.files = 0;
        self.matches = 0;
    }

    fn push_file(&mut self, name: &str) {
        let len = name.chars().count();
        self.push_line(name, vec![LexSpan::new(0, len, FILE_PATH)]);
        self.files += 1;
    }

    fn push_match(&mut self, location: ResultLocation, text: &str) {
        let number = location.line.to_string();
        let prefix = format!("  {number}: ");
        let offset = prefix.chars().count();
        let spans = vec![
            LexSpan::new(2, number.chars().count(), LINE_NUMBER),
            LexSpan::new(
                offset + location.range.begin,
                location.range.count(text.chars().count()),
                MATCH,
            ),
        ];
        let n = self.push_line(&format!("{prefix}{text}"), spans);
        let id = self.buffer.line(n).id();
        self.locations.insert(id, location);
        self.matches += 1;
    }

    /// Add matches found in an open buffer. Locations keep the source lines' ids.
    pub fn add_buffer_matches(&mut self, name: &str, source: &TextBuffer, matches: &[TextRange]) {
        if matches.is_empty() {
            return;
        }
        let path = source.file_path().map(Path::to_path_buf);
        self.push_file(name);
        for m in matches {
            let line = m.point_begin().line;
            let Some(source_line) = source.get_line(line) else {
                continue;
            };
            let Some(range) = m.char_range(line) else {
                continue;
            };
            let location = ResultLocation {
                path: path.clone(),
                line_id: source_line.id(),
                line,
                range,
            };
            let text = source_line.data().to_string();
            self.push_match(location, &text);
        }
    }

    /// Add matches read from a file on disk.
    pub fn add_file_matches(&mut self, path: &Path, matches: &[FileMatch]) {
        if matches.is_empty() {
            return;
        }
        self.push_file(&path.display().to_string());
        for m in matches {
            let location = ResultLocation {
                path: Some(path.to_path_buf()),
                line_id: NPOS,
                line: m.line,
                range: m.range,
            };
            self.push_match(location, &m.text);
        }
    }

    /// Append whatever a find worker event contributes to the view.
    pub fn add_event(&mut self, event: &FindEvent) {
        match event {
            FindEvent::File { path, matches, .. } => self.add_file_matches(path, matches),
            FindEvent::Failed { path, error } => {
                let text = format!("{}: {error}", path.display());
                let len = text.chars().count();
                self.push_line(&text, vec![LexSpan::new(0, len, FAILURE)]);
            }
            FindEvent::Finished { cancelled } => {
                let mut text = format!("{} matches in {} files", self.matches, self.files);
                if *cancelled {
                    text.push_str(" (cancelled)");
                }
                let len = text.chars().count();
                self.push_line(&text, vec![LexSpan::new(0, len, HEADER)]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::listener::{BufferChange, ChangeEvent, ChangeLog};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout_and_lex_of_result_lines() {
        let context = Context::shared_default();
        let source = TextBuffer::from_text(context.clone(), "alpha\nbeta alpha");
        let opts = FindOptions::default();
        let found = source.find_string_all("alpha", source.range(), &opts);

        let mut results = FindResults::new(context);
        results.begin_search("alpha", &opts);
        results.add_buffer_matches("untitled", &source, &found);

        let lines: Vec<&str> = results.buffer().lines().map(|l| l.data()).collect();
        assert_eq!(
            lines,
            vec!["Find \"alpha\" (case)", "untitled", "  1: alpha", "  2: beta alpha"]
        );
        assert_eq!(results.match_count(), 2);
        assert_eq!(results.file_count(), 1);

        let line = results.buffer().line(4);
        assert_eq!(line.lex_at(2), LINE_NUMBER);
        assert_eq!(line.lex_at(5), Lex::default());
        assert_eq!(line.lex_at(10), MATCH);
        assert_eq!(line.lex_at(14), MATCH);
        assert_eq!(line.lex_at(15), Lex::default());
        assert!(results.buffer().read_only());
        assert!(!results.buffer().modified());
    }

    #[test]
    fn test_appending_results_does_not_dirty_the_view() {
        let mut results = FindResults::new(Context::shared_default());
        let log = ChangeLog::new();
        results.buffer_mut().attach_listener(&log);

        results.begin_search("x", &FindOptions::default());
        results.add_event(&FindEvent::Finished { cancelled: false });

        assert!(!results.buffer().modified());
        assert!(!results.buffer().can_undo());
        assert!(
            log.take()
                .iter()
                .all(|event| !matches!(event, ChangeEvent::Buffer(BufferChange::Modified)))
        );
    }

    #[test]
    fn test_location_follows_source_edits() {
        let context = Context::shared_default();
        let mut source = TextBuffer::from_text(context.clone(), "x\nneedle");
        let found = source.find_string_all("needle", source.range(), &FindOptions::default());

        let mut results = FindResults::new(context);
        results.add_buffer_matches("doc", &source, &found);
        let location = results.location(2).unwrap().clone();
        assert_eq!(location.line, 2);
        assert!(results.location(1).is_none());

        source.insert_text(TextPoint::new(1, 0), "new\n");
        assert_eq!(
            location.resolve(&source),
            Some(TextRange::on_line(3, CharRange::new(0, 6)))
        );

        // Enter at the start of the matched line pushes it down with its id.
        source.exec(Action::insert_char(TextPoint::new(3, 0), '\n'));
        assert_eq!(
            location.resolve(&source),
            Some(TextRange::on_line(4, CharRange::new(0, 6)))
        );
        source.undo();
        assert_eq!(
            location.resolve(&source),
            Some(TextRange::on_line(3, CharRange::new(0, 6)))
        );
    }

    #[test]
    fn test_worker_events_render_summary() {
        let mut results = FindResults::new(Context::shared_default());
        results.add_event(&FindEvent::File {
            path: PathBuf::from("a.txt"),
            new_match_count: 1,
            matches: vec![FileMatch {
                line: 7,
                range: CharRange::new(0, 2),
                text: "hi there".into(),
            }],
        });
        results.add_event(&FindEvent::File {
            path: PathBuf::from("b.txt"),
            new_match_count: 0,
            matches: Vec::new(),
        });
        results.add_event(&FindEvent::Finished { cancelled: true });

        let lines: Vec<&str> = results.buffer().lines().map(|l| l.data()).collect();
        assert_eq!(lines, vec!["a.txt", "  7: hi there", "1 matches in 1 files (cancelled)"]);
        assert_eq!(results.location(2).unwrap().line_id, NPOS);
    }
}
