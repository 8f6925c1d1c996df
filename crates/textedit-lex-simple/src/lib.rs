//! `textedit-lex-simple` - Simple (regex-based) file-type plugins for `textedit-core`.
//!
//! This crate is intended for lightweight formats (JSON/INI/C-like sources) where a real
//! parser is unnecessary. Lexing is per line, so constructs spanning lines (block comments)
//! are only recognised on the lines where they open and close.

use regex::Regex;
use std::path::Path;
use std::sync::Arc;
use textedit_core::{FileFormat, FileTypePlugin, Lex, LexMajor, LexMinor, LexSpan};

/// A single regex lexing rule.
#[derive(Debug, Clone)]
pub struct RegexRule {
    regex: Regex,
    lex: Lex,
    capture_group: Option<usize>,
}

impl RegexRule {
    pub fn new(pattern: &str, lex: Lex) -> Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            lex,
            capture_group: None,
        })
    }

    /// Classify only a capture group of each match.
    ///
    /// Example (INI key):
    /// - pattern: `^\\s*([^=\\s]+)\\s*=`
    /// - capture_group: `1` (the key)
    pub fn with_capture_group(mut self, group: usize) -> Self {
        self.capture_group = Some(group);
        self
    }

    pub fn lex(&self) -> Lex {
        self.lex
    }

    fn byte_ranges(&self, text: &str) -> Vec<(usize, usize)> {
        match self.capture_group {
            Some(group) => self
                .regex
                .captures_iter(text)
                .filter_map(|caps| caps.get(group))
                .map(|m| (m.start(), m.end()))
                .collect(),
            None => self
                .regex
                .find_iter(text)
                .map(|m| (m.start(), m.end()))
                .collect(),
        }
    }
}

/// An ordered rule list. Earlier rules win where matches overlap.
#[derive(Debug, Clone)]
pub struct RegexLexer {
    rules: Vec<RegexRule>,
}

impl RegexLexer {
    pub fn new(rules: Vec<RegexRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RegexRule] {
        &self.rules
    }

    /// Lex one line into non-overlapping spans sorted by column.
    pub fn lex_line(&self, text: &str) -> Vec<LexSpan> {
        let mut claimed = vec![false; text.len()];
        let mut spans = Vec::new();

        for rule in &self.rules {
            for (start, end) in rule.byte_ranges(text) {
                if start >= end || claimed[start..end].iter().any(|&c| c) {
                    continue;
                }
                claimed[start..end].iter_mut().for_each(|c| *c = true);
                if let Some(span) = span_from_match(text, start, end, rule.lex) {
                    spans.push(span);
                }
            }
        }

        spans.sort_by_key(|s| s.offset);
        spans
    }

    /// A small default JSON grammar (strings, numbers, booleans, null).
    pub fn json_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // Object key: "key":
            RegexRule::new(r#"("(?:\\.|[^"\\])*")\s*:"#, LEX_KEY)?.with_capture_group(1),
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, LEX_STRING)?,
            RegexRule::new(r#"-?(?:0|[1-9]\d*)(?:\.\d+)?(?:[eE][+-]?\d+)?"#, LEX_NUMBER)?,
            RegexRule::new(r#"\b(?:true|false)\b"#, LEX_BOOL)?,
            RegexRule::new(r#"\bnull\b"#, LEX_NULL)?,
        ]))
    }

    /// A small default INI grammar (section, key, comment).
    pub fn ini_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            // Comment: ;... or #...
            RegexRule::new(r#"^\s*[;#].*$"#, LEX_COMMENT)?,
            // Section header: [section]
            RegexRule::new(r#"^\s*\[([^\]]+)\]\s*$"#, LEX_SECTION)?.with_capture_group(1),
            // Key: key = value
            RegexRule::new(r#"^\s*([^=\s]+)\s*="#, LEX_KEY)?.with_capture_group(1),
        ]))
    }

    /// A C-like grammar: comments, strings, preprocessor lines, keywords, types, numbers.
    pub fn c_default() -> Result<Self, regex::Error> {
        Ok(Self::new(vec![
            RegexRule::new(r#"//.*$"#, LEX_COMMENT)?,
            RegexRule::new(r#"/\*.*?(?:\*/|$)"#, LEX_COMMENT)?,
            RegexRule::new(r#"^(?:.*?\*/)"#, LEX_COMMENT)?,
            RegexRule::new(r#""(?:\\.|[^"\\])*""#, LEX_STRING)?,
            RegexRule::new(r#"'(?:\\.|[^'\\])'"#, LEX_CHAR)?,
            RegexRule::new(r#"^\s*#\s*\w+"#, Lex::major(LexMajor::PreProc))?,
            RegexRule::new(
                r#"\b(?:if|else|for|while|do|switch|case|default|break|continue|return|goto)\b"#,
                Lex::new(LexMajor::Statement, LexMinor::Keyword),
            )?,
            RegexRule::new(
                r#"\b(?:void|char|short|int|long|float|double|signed|unsigned|bool|struct|union|enum|typedef|const|static|extern)\b"#,
                Lex::major(LexMajor::Type),
            )?,
            RegexRule::new(r#"\b(?:true|false)\b"#, LEX_BOOL)?,
            RegexRule::new(r#"\b(?:0[xX][0-9a-fA-F]+|\d+(?:\.\d+)?)[uUlLfF]*\b"#, LEX_NUMBER)?,
            RegexRule::new(r#"\b([A-Za-z_]\w*)\s*\("#, LEX_FUNCTION)?.with_capture_group(1),
        ]))
    }
}

/// Default lex pairs produced by the bundled grammars.
pub const LEX_STRING: Lex = Lex::new(LexMajor::Constant, LexMinor::Str);
pub const LEX_CHAR: Lex = Lex::new(LexMajor::Constant, LexMinor::Char);
pub const LEX_NUMBER: Lex = Lex::new(LexMajor::Constant, LexMinor::Number);
pub const LEX_BOOL: Lex = Lex::new(LexMajor::Constant, LexMinor::Bool);
pub const LEX_NULL: Lex = Lex::new(LexMajor::Constant, LexMinor::Keyword);
pub const LEX_KEY: Lex = Lex::major(LexMajor::Identifier);
pub const LEX_FUNCTION: Lex = Lex::new(LexMajor::Identifier, LexMinor::Function);
pub const LEX_SECTION: Lex = Lex::new(LexMajor::Special, LexMinor::Tag);
pub const LEX_COMMENT: Lex = Lex::major(LexMajor::Comment);

/// A [`FileTypePlugin`] backed by a [`RegexLexer`].
#[derive(Debug, Clone)]
pub struct SimpleFileType {
    id: String,
    name: String,
    extensions: Vec<String>,
    lexer: RegexLexer,
    file_format: Option<FileFormat>,
}

impl SimpleFileType {
    pub fn new(id: &str, name: &str, lexer: RegexLexer) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            extensions: Vec::new(),
            lexer,
            file_format: None,
        }
    }

    /// File extensions (without the dot) this type claims.
    pub fn with_extensions(mut self, extensions: &[&str]) -> Self {
        self.extensions = extensions.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Preferred EOL format for new files.
    pub fn with_file_format(mut self, format: FileFormat) -> Self {
        self.file_format = Some(format);
        self
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    pub fn lexer(&self) -> &RegexLexer {
        &self.lexer
    }

    /// Returns `true` if the path's extension is one of ours (ASCII case-insensitive).
    pub fn matches_path(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }

    pub fn json() -> Result<Self, regex::Error> {
        Ok(Self::new("json", "JSON", RegexLexer::json_default()?).with_extensions(&["json"]))
    }

    pub fn ini() -> Result<Self, regex::Error> {
        Ok(Self::new("ini", "INI", RegexLexer::ini_default()?).with_extensions(&["ini", "cfg"]))
    }

    pub fn c() -> Result<Self, regex::Error> {
        Ok(Self::new("c", "C", RegexLexer::c_default()?).with_extensions(&["c", "h"]))
    }
}

impl FileTypePlugin for SimpleFileType {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn lex_line(&self, text: &str) -> Vec<LexSpan> {
        self.lexer.lex_line(text)
    }

    fn file_format(&self) -> Option<FileFormat> {
        self.file_format
    }
}

/// The bundled file types.
pub fn builtin_file_types() -> Result<Vec<Arc<SimpleFileType>>, regex::Error> {
    Ok(vec![
        Arc::new(SimpleFileType::json()?),
        Arc::new(SimpleFileType::ini()?),
        Arc::new(SimpleFileType::c()?),
    ])
}

/// Pick the file type for `path` by extension.
pub fn file_type_for_path(
    types: &[Arc<SimpleFileType>],
    path: &Path,
) -> Option<Arc<dyn FileTypePlugin>> {
    types
        .iter()
        .find(|t| t.matches_path(path))
        .map(|t| Arc::clone(t) as Arc<dyn FileTypePlugin>)
}

fn span_from_match(text: &str, start_byte: usize, end_byte: usize, lex: Lex) -> Option<LexSpan> {
    if start_byte >= end_byte || end_byte > text.len() {
        return None;
    }

    let start_col = text[..start_byte].chars().count();
    let len = text[start_byte..end_byte].chars().count();
    Some(LexSpan::new(start_col, len, lex))
}
