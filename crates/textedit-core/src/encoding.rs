//! File encodings.
//!
//! Detection policy is supplied by the caller through [`EncodingOptions`]: a byte-order mark
//! decides when present (and BOM detection is enabled), valid UTF-8 is taken as UTF-8, and
//! anything else is decoded with the configured fallback.

use crate::error::FileError;
use serde::{Deserialize, Serialize};

/// Supported file encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Encoding {
    /// UTF-8 without BOM.
    #[default]
    Utf8,
    /// UTF-8 with a BOM.
    Utf8Bom,
    /// UTF-16 little endian (with BOM).
    Utf16Le,
    /// UTF-16 big endian (with BOM).
    Utf16Be,
    /// ISO-8859-1.
    Latin1,
}

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];

/// Encoding detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingOptions {
    /// Encoding of new (untitled) buffers.
    pub default: Encoding,
    /// Honor byte-order marks.
    pub detect_bom: bool,
    /// Encoding used when the content is not valid UTF-8.
    pub fallback: Encoding,
}

impl Default for EncodingOptions {
    fn default() -> Self {
        Self {
            default: Encoding::Utf8,
            detect_bom: true,
            fallback: Encoding::Latin1,
        }
    }
}

impl Encoding {
    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf8Bom => "UTF-8 BOM",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
            Self::Latin1 => "ISO-8859-1",
        }
    }

    fn bom(self) -> &'static [u8] {
        match self {
            Self::Utf8Bom => UTF8_BOM,
            Self::Utf16Le => UTF16LE_BOM,
            Self::Utf16Be => UTF16BE_BOM,
            Self::Utf8 | Self::Latin1 => &[],
        }
    }

    /// Detect the encoding of `bytes`.
    pub fn detect(bytes: &[u8], options: &EncodingOptions) -> Self {
        if options.detect_bom {
            if bytes.starts_with(UTF8_BOM) {
                return Self::Utf8Bom;
            }
            if bytes.starts_with(UTF16LE_BOM) {
                return Self::Utf16Le;
            }
            if bytes.starts_with(UTF16BE_BOM) {
                return Self::Utf16Be;
            }
        }
        if std::str::from_utf8(bytes).is_ok() {
            Self::Utf8
        } else {
            options.fallback
        }
    }

    /// Decode `bytes`, skipping this encoding's BOM if present.
    pub fn decode(self, bytes: &[u8]) -> Result<String, FileError> {
        let bytes = bytes.strip_prefix(self.bom()).unwrap_or(bytes);
        match self {
            Self::Utf8 | Self::Utf8Bom => String::from_utf8(bytes.to_vec())
                .map_err(|err| FileError::Encoding(err.to_string())),
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Utf16Le | Self::Utf16Be => {
                if bytes.len() % 2 != 0 {
                    return Err(FileError::Encoding(format!(
                        "odd byte count {} for {}",
                        bytes.len(),
                        self.name()
                    )));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|pair| match self {
                        Self::Utf16Le => u16::from_le_bytes([pair[0], pair[1]]),
                        _ => u16::from_be_bytes([pair[0], pair[1]]),
                    })
                    .collect();
                String::from_utf16(&units).map_err(|err| FileError::Encoding(err.to_string()))
            }
        }
    }

    /// Encode `text`, writing this encoding's BOM first.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, FileError> {
        let mut out = self.bom().to_vec();
        match self {
            Self::Utf8 | Self::Utf8Bom => out.extend_from_slice(text.as_bytes()),
            Self::Latin1 => {
                for ch in text.chars() {
                    let byte = u8::try_from(u32::from(ch)).map_err(|_| {
                        FileError::Encoding(format!("'{ch}' cannot be encoded as {}", self.name()))
                    })?;
                    out.push(byte);
                }
            }
            Self::Utf16Le => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_le_bytes())),
            Self::Utf16Be => text
                .encode_utf16()
                .for_each(|unit| out.extend_from_slice(&unit.to_be_bytes())),
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_prefers_bom() {
        let opts = EncodingOptions::default();
        assert_eq!(Encoding::detect(b"\xEF\xBB\xBFabc", &opts), Encoding::Utf8Bom);
        assert_eq!(Encoding::detect(b"\xFF\xFEa\x00", &opts), Encoding::Utf16Le);
        assert_eq!(Encoding::detect(b"plain", &opts), Encoding::Utf8);
        assert_eq!(Encoding::detect(b"caf\xE9", &opts), Encoding::Latin1);
    }

    #[test]
    fn test_detect_without_bom_detection() {
        let opts = EncodingOptions {
            detect_bom: false,
            ..EncodingOptions::default()
        };
        assert_eq!(Encoding::detect(b"\xEF\xBB\xBFabc", &opts), Encoding::Utf8);
    }

    #[test]
    fn test_utf16_round_trip() {
        for enc in [Encoding::Utf16Le, Encoding::Utf16Be] {
            let bytes = enc.encode("h\u{e9}llo \u{1F980}").unwrap();
            assert_eq!(enc.decode(&bytes).unwrap(), "h\u{e9}llo \u{1F980}");
        }
    }

    #[test]
    fn test_invalid_input_is_encoding_error() {
        assert!(matches!(
            Encoding::Utf8.decode(b"caf\xE9"),
            Err(FileError::Encoding(_))
        ));
        assert!(matches!(
            Encoding::Latin1.encode("\u{4F60}"),
            Err(FileError::Encoding(_))
        ));
        assert_eq!(Encoding::Latin1.decode(b"caf\xE9").unwrap(), "caf\u{e9}");
    }
}
