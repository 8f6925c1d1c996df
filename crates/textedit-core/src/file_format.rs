//! End-of-line conventions.
//!
//! Lines are stored without their terminators. The file format records which terminator
//! a file used so saving writes it back the same way.

use serde::{Deserialize, Serialize};

/// The newline sequence of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    /// Windows-style CRLF (`"\r\n"`).
    Win,
    /// Unix-style LF (`'\n'`).
    #[default]
    Unix,
    /// Classic Mac CR (`'\r'`).
    Mac,
}

impl FileFormat {
    /// The terminator written when saving.
    pub fn eol(self) -> &'static str {
        match self {
            Self::Win => "\r\n",
            Self::Unix => "\n",
            Self::Mac => "\r",
        }
    }

    /// Short display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Win => "CRLF",
            Self::Unix => "LF",
            Self::Mac => "CR",
        }
    }

    /// Detect the format from the first line terminator in `text`.
    ///
    /// Returns `None` if the text has no line break.
    pub fn detect_in_text(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        let pos = bytes.iter().position(|&b| b == b'\n' || b == b'\r')?;
        match bytes[pos] {
            b'\n' => Some(Self::Unix),
            _ if bytes.get(pos + 1) == Some(&b'\n') => Some(Self::Win),
            _ => Some(Self::Mac),
        }
    }

    /// Join `lines` with this terminator.
    pub fn join<'a, I>(self, lines: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        let eol = self.eol();
        let mut out = String::new();
        for (i, line) in lines.into_iter().enumerate() {
            if i > 0 {
                out.push_str(eol);
            }
            out.push_str(line);
        }
        out
    }
}

/// Split text into lines, accepting any mix of CRLF, LF and CR terminators.
///
/// N terminators yield N+1 lines, so a trailing newline produces a trailing empty line.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&text[start..i]);
                if bytes.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    lines.push(&text[start..]);
    lines
}
