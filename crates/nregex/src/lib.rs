// NEdit-style regular expressions
// A backtracking regex engine with a two-pass node compiler, look-around,
// counted repetition and capture-aware substitution

#[cfg(test)]
mod test;

pub mod classes;
pub mod compiler;
pub mod exec;
pub mod program;
pub mod regex;
pub mod regex_error;
pub mod regex_limits;
pub mod search;
pub mod substitute;

pub use classes::{default_word_delimiters, set_default_word_delimiters, ByteSet, DelimiterTable};
pub use compiler::CompileFlags;
pub use exec::{ExecOptions, MatchResult};
pub use program::{Node, OpCode, Operand, Program};
pub use regex::Regex;
pub use regex_error::{RegexError, RegexErrorKind, RegexResult};
pub use search::{
    replace_all_in_string, search_string, split, SearchDirection, SearchOptions, SearchType,
};
