//! Lexical classification tags attached to lines by file-type plugins.

/// Major classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LexMajor {
    /// Plain text.
    #[default]
    Normal,
    /// Comments.
    Comment,
    /// Literals: strings, characters, numbers, booleans.
    Constant,
    /// Identifiers (variables, functions).
    Identifier,
    /// Statement keywords (`if`, `for`, `return`).
    Statement,
    /// Module/package keywords (`use`, `import`, `namespace`).
    Package,
    /// Preprocessor directives.
    PreProc,
    /// Type names and type keywords.
    Type,
    /// Special symbols and markup (also used by the find-results view).
    Special,
    /// Errors.
    Error,
}

/// Minor classification, refining a [`LexMajor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LexMinor {
    /// No refinement.
    #[default]
    None,
    /// Character literal.
    Char,
    /// String literal.
    Str,
    /// Numeric literal.
    Number,
    /// Boolean literal.
    Bool,
    /// Function name.
    Function,
    /// Keyword.
    Keyword,
    /// Operator.
    Operator,
    /// Documentation comment.
    Doc,
    /// Markup tag / attribute name.
    Tag,
    /// Find results: file path line.
    FilePath,
    /// Find results: source line number.
    LineNumber,
    /// Find results: matched text.
    Match,
}

/// A `(major, minor)` classification pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Lex {
    /// Major classification.
    pub major: LexMajor,
    /// Minor classification.
    pub minor: LexMinor,
}

impl Lex {
    /// Create a lex pair.
    pub const fn new(major: LexMajor, minor: LexMinor) -> Self {
        Self { major, minor }
    }

    /// A lex with only a major classification.
    pub const fn major(major: LexMajor) -> Self {
        Self::new(major, LexMinor::None)
    }

    /// Returns `true` for [`LexMajor::Normal`] without refinement.
    pub fn is_normal(&self) -> bool {
        self.major == LexMajor::Normal && self.minor == LexMinor::None
    }
}

/// A classified span within one line, in char columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexSpan {
    /// Start column.
    pub offset: usize,
    /// Length in characters.
    pub len: usize,
    /// Classification.
    pub lex: Lex,
}

impl LexSpan {
    /// Create a span.
    pub const fn new(offset: usize, len: usize, lex: Lex) -> Self {
        Self { offset, len, lex }
    }

    /// Exclusive end column.
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    /// Returns `true` if the span covers column `x`.
    pub fn contains(&self, x: usize) -> bool {
        self.offset <= x && x < self.end()
    }
}
