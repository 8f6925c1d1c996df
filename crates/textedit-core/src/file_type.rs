//! The file-type plugin seam.
//!
//! A file-type plugin classifies line content and supplies per-type defaults. The core
//! never lexes on its own: it stores whatever spans the plugin returns.

use crate::file_format::FileFormat;
use crate::lex::LexSpan;

/// A file type: lexer plus defaults.
///
/// Lexing is per line. A plugin that needs state across lines (block comments, heredocs)
/// has to recover it from the line text alone.
pub trait FileTypePlugin: Send + Sync {
    /// Stable identifier, e.g. `"json"`.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str {
        self.id()
    }

    /// Classify one line (without its terminator).
    fn lex_line(&self, text: &str) -> Vec<LexSpan>;

    /// Preferred EOL format for new files of this type.
    fn file_format(&self) -> Option<FileFormat> {
        None
    }
}

impl std::fmt::Debug for dyn FileTypePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTypePlugin").field("id", &self.id()).finish()
    }
}
