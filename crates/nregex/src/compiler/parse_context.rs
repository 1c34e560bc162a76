use super::CompileFlags;
use crate::program::Node;
use crate::regex_error::RegexError;
use crate::regex_limits::META_CHARS;

/// Compiler state for one pass over one pattern.
///
/// A fresh context is built for each pass, so nothing leaks between
/// compiles. In the sizing pass `code` stays empty and emission only bumps
/// `reg_size`; node indices handed out during that pass are placeholders
/// that are never dereferenced.
pub struct ParseContext<'a> {
    pub pattern: &'a [u8],
    /// Scan cursor into `pattern`.
    pub pos: usize,
    pub code: Vec<Node>,
    pub sizing: bool,
    /// Nodes counted so far in the sizing pass.
    pub reg_size: usize,

    /// Group n has seen its closing parenthesis.
    pub closed_parens: Vec<bool>,
    /// Group n can never match the empty string.
    pub paren_has_width: Vec<bool>,
    /// Next capturing group number; starts at 1.
    pub total_paren: usize,
    /// General {m,n} constructs emitted so far.
    pub num_braces: usize,
    pub max_groups: usize,

    // Scoped by (?i) (?I) (?n) (?N); restored when a group closes.
    pub case_insensitive: bool,
    pub match_newline: bool,

    /// `{` when counting quantifiers are enabled, otherwise `*` so that the
    /// brace test never fires.
    pub brace_char: u8,
    pub meta_chars: &'static [u8],
}

impl<'a> ParseContext<'a> {
    pub fn new(pattern: &'a [u8], flags: &CompileFlags, capacity: Option<usize>) -> Self {
        let (brace_char, meta_chars) = if flags.counting_quantifier {
            (b'{', META_CHARS)
        } else {
            (b'*', &META_CHARS[1..])
        };

        ParseContext {
            pattern,
            pos: 0,
            code: capacity.map(Vec::with_capacity).unwrap_or_default(),
            sizing: capacity.is_none(),
            reg_size: 0,
            closed_parens: vec![false],
            paren_has_width: vec![false],
            total_paren: 1,
            num_braces: 0,
            max_groups: flags.effective_max_groups(),
            case_insensitive: flags.case_insensitive,
            match_newline: flags.match_newline,
            brace_char,
            meta_chars,
        }
    }

    #[inline]
    pub fn at_end(&self) -> bool {
        self.pos >= self.pattern.len()
    }

    /// Current pattern byte, NUL past the end.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.peek_at(0)
    }

    #[inline]
    pub fn peek_at(&self, offset: usize) -> u8 {
        self.pattern.get(self.pos + offset).copied().unwrap_or(0)
    }

    #[inline]
    pub fn is_quantifier(&self, c: u8) -> bool {
        c == b'*' || c == b'+' || c == b'?' || c == self.brace_char
    }

    #[inline]
    pub fn is_meta(&self, c: u8) -> bool {
        self.meta_chars.contains(&c)
    }

    pub fn is_paren_closed(&self, n: usize) -> bool {
        self.closed_parens.get(n).copied().unwrap_or(false)
    }

    pub fn paren_has_width(&self, n: usize) -> bool {
        self.paren_has_width.get(n).copied().unwrap_or(false)
    }

    /// Allocate the next capturing group number.
    pub fn open_paren(&mut self) -> usize {
        let n = self.total_paren;
        self.total_paren += 1;
        self.closed_parens.resize(self.total_paren, false);
        self.paren_has_width.resize(self.total_paren, false);
        n
    }

    pub fn syntax_error(&self, message: impl Into<String>) -> RegexError {
        RegexError::syntax(message, self.pos)
    }

    pub fn limit_error(&self, message: impl Into<String>) -> RegexError {
        RegexError::limit(message, self.pos)
    }
}
