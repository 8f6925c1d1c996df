#![warn(missing_docs)]
//! Textedit Core - the text-editing core of a desktop editor
//!
//! # Overview
//!
//! `textedit-core` holds everything between the keyboard and the pixels that does not
//! depend on a GUI toolkit: the line buffer, undoable edit actions, soft wrap, the style
//! table and find/replace (in a buffer and across files on a worker thread).
//!
//! # Quick Start
//!
//! ```rust
//! use textedit_core::{Action, Context, TextBuffer, TextPoint};
//!
//! let mut buffer = TextBuffer::new(Context::shared_default());
//! buffer.exec(Action::insert_string(TextPoint::new(1, 0), "hello\nworld"));
//! assert_eq!(buffer.line_count(), 2);
//!
//! buffer.undo();
//! assert_eq!(buffer.text(), "");
//! ```
//!
//! # Coordinates
//!
//! Lines are 1-based, columns are 0-based `char` offsets. See [`coord`].
//!
//! # Module Description
//!
//! - [`buffer`] - line buffer, notifications and in-buffer search
//! - [`action`] - edit actions executed through the undo history
//! - [`wrap`] - soft wrap and visual/logical coordinate mapping
//! - [`style`] - lex-to-style table
//! - [`find`] / [`find_worker`] / [`find_result`] - find and replace
//! - [`file_io`] - loading and saving with encoding and EOL detection
//! - [`options`] - TOML options and the shared [`Context`]

pub mod action;
pub mod buffer;
pub mod coord;
pub mod encoding;
pub mod error;
pub mod file_format;
pub mod file_io;
pub mod file_type;
pub mod find;
pub mod find_result;
pub mod find_worker;
pub mod lex;
pub mod listener;
pub mod options;
pub mod seek;
pub mod selection;
pub mod style;
pub mod text_line;
mod undo;
pub mod wrap;

pub use action::{Action, CaretAction, CaretState};
pub use buffer::TextBuffer;
pub use coord::{CharRange, INVALID, LineRange, NPOS, TextPoint, TextRange};
pub use encoding::{Encoding, EncodingOptions};
pub use error::{FileError, OptionsError};
pub use file_format::FileFormat;
pub use file_io::{TextFile, read_text_file, write_text_file};
pub use file_type::FileTypePlugin;
pub use find::{FindOptions, FindResult, Matcher};
pub use find_result::{FindResults, ResultLocation};
pub use find_worker::{FileMatch, FindEvent, FindRequest, FindTarget, FindWorker, WakeupSignal};
pub use lex::{Lex, LexMajor, LexMinor, LexSpan};
pub use listener::{BufferChange, BufferListener, ChangeEvent, ChangeLog, LineChange, ListenerId};
pub use options::{Context, FindWorkerOptions, Options, WrapOptions};
pub use selection::{SelectDir, Selection};
pub use style::{Color, FontFlags, Style, StyleEntry, StyleItem, StyleValue};
pub use text_line::TextLine;
pub use wrap::{CharMeasure, MonoMeasure, VisualPoint, WrapHelper, WrapMode};
