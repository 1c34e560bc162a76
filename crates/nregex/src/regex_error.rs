use std::fmt;

/// What went wrong while turning a pattern (or a serialized program) into
/// a usable `Regex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegexErrorKind {
    /// The pattern violates the grammar: unbalanced parentheses, bad
    /// escapes, misplaced or nested quantifiers, invalid ranges.
    Syntax,
    /// The pattern is well formed but exceeds an engine limit.
    Limit,
    /// A serialized program failed validation.
    Program,
}

impl fmt::Display for RegexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexErrorKind::Syntax => write!(f, "syntax error"),
            RegexErrorKind::Limit => write!(f, "limit exceeded"),
            RegexErrorKind::Program => write!(f, "invalid program"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexError {
    pub kind: RegexErrorKind,
    pub message: String,
    /// Byte offset into the pattern where the problem was detected.
    pub position: Option<usize>,
}

impl RegexError {
    pub fn syntax(message: impl Into<String>, position: usize) -> Self {
        RegexError {
            kind: RegexErrorKind::Syntax,
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn limit(message: impl Into<String>, position: usize) -> Self {
        RegexError {
            kind: RegexErrorKind::Limit,
            message: message.into(),
            position: Some(position),
        }
    }

    pub fn program(message: impl Into<String>) -> Self {
        RegexError {
            kind: RegexErrorKind::Program,
            message: message.into(),
            position: None,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for RegexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for RegexError {}

pub type RegexResult<T> = Result<T, RegexError>;
