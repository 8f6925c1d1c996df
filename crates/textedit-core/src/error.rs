//! Error types.

use thiserror::Error;

#[derive(Debug, Error)]
/// Errors produced when loading or saving a [`TextBuffer`](crate::TextBuffer).
///
/// A successful operation is `Ok(())`; there is no "no error" variant.
pub enum FileError {
    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("file is empty")]
    /// The file has no content. The buffer is still reset to a single empty line.
    Empty,

    #[error("encoding error: {0}")]
    /// The content could not be decoded from (or encoded to) the buffer's encoding.
    Encoding(String),
}

#[derive(Debug, Error)]
/// Errors produced when reading an options file.
pub enum OptionsError {
    #[error("I/O error: {0}")]
    /// Filesystem I/O failed.
    Io(#[from] std::io::Error),

    #[error("options parse error: {0}")]
    /// The TOML document is malformed or has wrongly typed values.
    Parse(#[from] toml::de::Error),
}
