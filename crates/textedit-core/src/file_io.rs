//! Loading and saving buffers.

use crate::buffer::TextBuffer;
use crate::coord::LineRange;
use crate::encoding::{Encoding, EncodingOptions};
use crate::error::FileError;
use crate::file_format::FileFormat;
use crate::file_type::FileTypePlugin;
use crate::listener::LineChange;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A decoded text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFile {
    /// Decoded content, terminators preserved.
    pub text: String,
    /// Detected encoding.
    pub encoding: Encoding,
    /// Detected EOL format, `None` if the file has no line break.
    pub file_format: Option<FileFormat>,
}

/// Read and decode a text file.
///
/// An empty file decodes to an empty [`TextFile`]; deciding whether that is an error is
/// left to the caller.
pub fn read_text_file(path: &Path, options: &EncodingOptions) -> Result<TextFile, FileError> {
    let bytes = std::fs::read(path)?;
    let encoding = Encoding::detect(&bytes, options);
    let text = encoding.decode(&bytes)?;
    let file_format = FileFormat::detect_in_text(&text);
    Ok(TextFile {
        text,
        encoding,
        file_format,
    })
}

/// Encode and write text to a file.
pub fn write_text_file(path: &Path, text: &str, encoding: Encoding) -> Result<(), FileError> {
    let bytes = encoding.encode(text)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

impl TextBuffer {
    /// Load `path` into this buffer, replacing its content and history.
    ///
    /// The encoding is detected per `options`; the EOL format is detected from the content,
    /// falling back to the plugin's preference and then the configured default. An empty
    /// file leaves the buffer with one empty line and returns [`FileError::Empty`].
    pub fn load(
        &mut self,
        path: impl AsRef<Path>,
        plugin: Option<Arc<dyn FileTypePlugin>>,
        options: &EncodingOptions,
    ) -> Result<(), FileError> {
        let path = path.as_ref();
        let file = match read_text_file(path, options) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "load failed");
                return Err(err);
            }
        };

        let default_format = plugin
            .as_ref()
            .and_then(|p| p.file_format())
            .unwrap_or(self.context().options.file_format);
        let format = file.file_format.unwrap_or(default_format);

        self.set_file_type_silently(plugin);
        self.replace_lines(&file.text);
        self.history.clear();
        self.load_encoding(file.encoding);
        self.load_file_format(format);
        self.set_file_path(path.to_path_buf());
        self.set_modified(false);
        self.notify_refresh();

        tracing::info!(
            path = %path.display(),
            encoding = file.encoding.name(),
            format = format.name(),
            lines = self.line_count(),
            "loaded"
        );

        if file.text.is_empty() {
            return Err(FileError::Empty);
        }
        Ok(())
    }

    /// Save to the current path. Untitled buffers have no path and report an I/O error.
    pub fn save(&mut self) -> Result<(), FileError> {
        let Some(path) = self.file_path().map(Path::to_path_buf) else {
            return Err(FileError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "buffer has no file path",
            )));
        };
        self.write_to(path)
    }

    /// Save to `path` and make it the buffer's path.
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), FileError> {
        self.write_to(path.as_ref().to_path_buf())
    }

    fn write_to(&mut self, path: PathBuf) -> Result<(), FileError> {
        let format = self.file_format();
        let text = format.join(self.lines().map(|l| l.data()));
        if let Err(err) = write_text_file(&path, &text, self.encoding()) {
            tracing::warn!(path = %path.display(), error = %err, "save failed");
            return Err(err);
        }
        tracing::info!(
            path = %path.display(),
            encoding = self.encoding().name(),
            format = format.name(),
            lines = self.line_count(),
            "saved"
        );
        self.set_file_path(path);
        self.mark_saved();
        Ok(())
    }

    fn notify_refresh(&self) {
        self.notify_line(LineChange::Refresh, LineRange::new(1, self.line_count()));
    }
}
