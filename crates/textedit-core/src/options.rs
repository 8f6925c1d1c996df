//! Editor options and the shared [`Context`].
//!
//! Options are plain serde data. Every field has a default, so a TOML file only needs to
//! name what it changes:
//!
//! ```toml
//! tab_stop = 8
//! undo_limit = 200
//!
//! [wrap]
//! mode = "word"
//!
//! [encoding]
//! fallback = "latin1"
//! ```

use crate::encoding::EncodingOptions;
use crate::error::OptionsError;
use crate::file_format::FileFormat;
use crate::style::Style;
use crate::wrap::WrapMode;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Soft-wrap settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapOptions {
    /// Where sub-lines may break.
    pub mode: WrapMode,
}

/// Background find-in-files settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FindWorkerOptions {
    /// Files larger than this many bytes are skipped.
    pub max_file_size: u64,
    /// Descend into hidden files and directories.
    pub hidden: bool,
    /// Follow symbolic links while walking folders.
    pub follow_links: bool,
    /// Honor `.gitignore`/`.ignore` files while walking folders.
    pub respect_ignore_files: bool,
}

impl Default for FindWorkerOptions {
    fn default() -> Self {
        Self {
            max_file_size: 16 * 1024 * 1024,
            hidden: false,
            follow_links: false,
            respect_ignore_files: true,
        }
    }
}

/// Editor options consulted by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Tab stop in cells.
    pub tab_stop: usize,
    /// Soft-wrap settings.
    pub wrap: WrapOptions,
    /// Maximum undo entries per buffer; `0` means unlimited.
    pub undo_limit: usize,
    /// Encoding detection.
    pub encoding: EncodingOptions,
    /// EOL format of new buffers and of files without any line break.
    pub file_format: FileFormat,
    /// Find-in-files settings.
    pub find_worker: FindWorkerOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tab_stop: 4,
            wrap: WrapOptions::default(),
            undo_limit: 1000,
            encoding: EncodingOptions::default(),
            file_format: FileFormat::default(),
            find_worker: FindWorkerOptions::default(),
        }
    }
}

impl Options {
    /// Parse options from a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(text)?)
    }

    /// Read options from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let options = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.as_ref().display(), "loaded options");
        Ok(options)
    }
}

/// Options and style shared by buffers, views and workers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Editor options.
    pub options: Options,
    /// Style table.
    pub style: Style,
}

impl Context {
    /// Bundle options and style into a shareable context.
    pub fn new(options: Options, style: Style) -> Arc<Self> {
        Arc::new(Self { options, style })
    }

    /// A context with default options and style.
    pub fn shared_default() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let options = Options::from_toml_str(
            r#"
            undo_limit = 5

            [wrap]
            mode = "word"

            [encoding]
            fallback = "utf8"
            "#,
        )
        .unwrap();

        assert_eq!(options.undo_limit, 5);
        assert_eq!(options.wrap.mode, WrapMode::Word);
        assert_eq!(options.encoding.fallback, Encoding::Utf8);
        assert!(options.encoding.detect_bom);
        assert_eq!(options.tab_stop, 4);
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = Options::from_toml_str("tab_stop = \"wide\"").unwrap_err();
        assert!(matches!(err, OptionsError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Options::load("/definitely/not/here/textedit.toml").unwrap_err();
        assert!(matches!(err, OptionsError::Io(_)));
    }
}
