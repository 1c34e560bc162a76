// String-level search, replace and split helpers
//
// These drive either a plain-text scan or a compiled Regex over a whole
// string, the way an editor's macro layer searches a string value rather
// than a buffer.
use crate::classes::DelimiterTable;
use crate::compiler::CompileFlags;
use crate::exec::ExecOptions;
use crate::regex::Regex;
use crate::regex_error::{RegexError, RegexResult};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchType {
    /// Plain text, ignoring case.
    #[default]
    Literal,
    /// Plain text, exact case.
    CaseSensitive,
    Regex,
    RegexNoCase,
}

impl SearchType {
    pub fn is_regex(self) -> bool {
        matches!(self, SearchType::Regex | SearchType::RegexNoCase)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSearchTypeError(String);

impl fmt::Display for ParseSearchTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized search type \"{}\"", self.0)
    }
}

impl std::error::Error for ParseSearchTypeError {}

impl FromStr for SearchType {
    type Err = ParseSearchTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" => Ok(SearchType::Literal),
            "case" => Ok(SearchType::CaseSensitive),
            "regex" => Ok(SearchType::Regex),
            "regexNoCase" => Ok(SearchType::RegexNoCase),
            other => Err(ParseSearchTypeError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub search_type: SearchType,
    pub direction: SearchDirection,
    pub wrap: bool,
    /// Word delimiters for `<`, `>`, `\y` and friends.
    pub delimiters: Option<DelimiterTable>,
}

impl SearchOptions {
    pub fn new(search_type: SearchType) -> Self {
        SearchOptions {
            search_type,
            ..Default::default()
        }
    }
}

enum Searcher {
    Literal { needle: Vec<u8>, ignore_case: bool },
    Regex(Box<Regex>),
}

impl Searcher {
    fn new(pattern: &[u8], search_type: SearchType) -> RegexResult<Self> {
        let searcher = match search_type {
            SearchType::Literal | SearchType::CaseSensitive => Searcher::Literal {
                needle: pattern.to_vec(),
                ignore_case: search_type == SearchType::Literal,
            },
            SearchType::Regex => {
                Searcher::Regex(Box::new(Regex::with_flags(pattern, CompileFlags::default())?))
            }
            SearchType::RegexNoCase => {
                Searcher::Regex(Box::new(Regex::with_flags(pattern, CompileFlags::case_insensitive())?))
            }
        };
        Ok(searcher)
    }

    /// First match starting in `[from, until)`; `until = None` allows a
    /// match starting at the very end.
    fn forward(
        &mut self,
        text: &[u8],
        from: usize,
        until: Option<usize>,
        delimiters: Option<&DelimiterTable>,
    ) -> Option<Range<usize>> {
        match self {
            Searcher::Literal { needle, ignore_case } => {
                let last = until.unwrap_or(text.len() + 1);
                (from..last.min(text.len() + 1))
                    .find(|&s| literal_at(text, s, needle, *ignore_case))
                    .map(|s| s..s + needle.len())
            }
            Searcher::Regex(regex) => {
                let options = ExecOptions {
                    start: from,
                    end: until,
                    delimiters,
                    ..Default::default()
                };
                if regex.execute(text, &options) {
                    regex.span()
                } else {
                    None
                }
            }
        }
    }

    /// Last match starting in `[from, until]`.
    fn backward(
        &mut self,
        text: &[u8],
        from: usize,
        until: usize,
        delimiters: Option<&DelimiterTable>,
    ) -> Option<Range<usize>> {
        match self {
            Searcher::Literal { needle, ignore_case } => (from..=until.min(text.len()))
                .rev()
                .find(|&s| literal_at(text, s, needle, *ignore_case))
                .map(|s| s..s + needle.len()),
            Searcher::Regex(regex) => {
                let options = ExecOptions {
                    start: from,
                    end: Some(until),
                    reverse: true,
                    delimiters,
                    ..Default::default()
                };
                if regex.execute(text, &options) {
                    regex.span()
                } else {
                    None
                }
            }
        }
    }
}

fn literal_at(text: &[u8], at: usize, needle: &[u8], ignore_case: bool) -> bool {
    if needle.is_empty() {
        return false;
    }
    let Some(candidate) = text.get(at..at + needle.len()) else {
        return false;
    };
    if ignore_case {
        candidate.eq_ignore_ascii_case(needle)
    } else {
        candidate == needle
    }
}

/// Find `pattern` in `text` starting from `begin_pos`.
///
/// Forward finds the first match starting at or after `begin_pos`;
/// backward the last one starting at or before it. With `wrap`, a failed
/// search continues from the other end of the text.
pub fn search_string(
    text: &[u8],
    pattern: &[u8],
    begin_pos: usize,
    options: &SearchOptions,
) -> RegexResult<Option<Range<usize>>> {
    let mut searcher = Searcher::new(pattern, options.search_type)?;
    let delimiters = options.delimiters.as_ref();
    let len = text.len();

    let found = match options.direction {
        SearchDirection::Forward => {
            if begin_pos > len {
                if options.wrap {
                    searcher.forward(text, 0, None, delimiters)
                } else {
                    None
                }
            } else {
                searcher
                    .forward(text, begin_pos, None, delimiters)
                    .or_else(|| {
                        if options.wrap && begin_pos > 0 {
                            searcher.forward(text, 0, Some(begin_pos), delimiters)
                        } else {
                            None
                        }
                    })
            }
        }
        SearchDirection::Backward => {
            let begin_pos = begin_pos.min(len);
            searcher
                .backward(text, 0, begin_pos, delimiters)
                .or_else(|| {
                    if options.wrap && begin_pos < len {
                        searcher.backward(text, begin_pos + 1, len, delimiters)
                    } else {
                        None
                    }
                })
        }
    };

    Ok(found)
}

/// Replace every non-overlapping match of `pattern`. Regex search types
/// expand `replacement` as a substitution template; literal types insert it
/// as is. `None` when nothing matched.
pub fn replace_all_in_string(
    text: &[u8],
    pattern: &[u8],
    replacement: &[u8],
    options: &SearchOptions,
) -> RegexResult<Option<Vec<u8>>> {
    let mut searcher = Searcher::new(pattern, options.search_type)?;
    let delimiters = options.delimiters.as_ref();
    let len = text.len();

    let mut out = Vec::with_capacity(len);
    let mut pos = 0;
    let mut copy_from = 0;
    let mut any = false;

    while pos <= len {
        let Some(found) = searcher.forward(text, pos, None, delimiters) else {
            break;
        };
        any = true;
        out.extend_from_slice(&text[copy_from..found.start]);

        match &searcher {
            Searcher::Regex(regex) => {
                regex.substitute(text, replacement, &mut out);
            }
            Searcher::Literal { .. } => out.extend_from_slice(replacement),
        }

        if found.start == found.end {
            // Empty match: keep one character and move past it
            if let Some(&c) = text.get(found.end) {
                out.push(c);
            }
            pos = found.end + 1;
            copy_from = pos.min(len);
        } else {
            pos = found.end;
            copy_from = found.end;
        }
    }

    if !any {
        return Ok(None);
    }
    out.extend_from_slice(&text[copy_from..]);
    Ok(Some(out))
}

/// Split `text` around matches of `separator`.
///
/// A match that ends at the end of the text produces a trailing empty
/// piece. A zero-width match steps over one character; when that leaves a
/// final character behind it becomes its own piece, followed by an empty
/// piece if the separator also matches at the very end.
pub fn split(text: &[u8], separator: &[u8], options: &SearchOptions) -> RegexResult<Vec<Vec<u8>>> {
    if separator.is_empty() {
        return Err(RegexError::syntax("split separator must be a non-empty string", 0));
    }
    let mut searcher = Searcher::new(separator, options.search_type)?;
    let delimiters = options.delimiters.as_ref();
    let len = text.len();

    let mut pieces = Vec::new();
    let mut begin_pos = 0;
    let mut last_end = 0;
    let mut found = true;

    while found && begin_pos < len {
        let hit = searcher.forward(text, begin_pos, None, delimiters);
        found = hit.is_some();
        let element_end = hit.as_ref().map_or(len, |r| r.start);
        pieces.push(text[last_end..element_end].to_vec());

        match hit {
            Some(r) => {
                begin_pos = if r.start == r.end { r.end + 1 } else { r.end };
                last_end = r.end;
            }
            None => begin_pos = len,
        }
    }

    if found {
        if last_end == len {
            pieces.push(Vec::new());
        } else {
            pieces.push(text[last_end..].to_vec());
            if searcher.forward(text, len, None, delimiters).is_some() {
                pieces.push(Vec::new());
            }
        }
    }

    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_type_from_str() {
        assert_eq!("regexNoCase".parse::<SearchType>(), Ok(SearchType::RegexNoCase));
        assert_eq!("case".parse::<SearchType>(), Ok(SearchType::CaseSensitive));
        assert!("fuzzy".parse::<SearchType>().is_err());
        assert!(SearchType::Regex.is_regex());
        assert!(!SearchType::Literal.is_regex());
    }

    #[test]
    fn test_literal_at_bounds() {
        assert!(literal_at(b"abc", 1, b"BC", true));
        assert!(!literal_at(b"abc", 1, b"BC", false));
        assert!(!literal_at(b"abc", 2, b"cd", false));
        assert!(!literal_at(b"abc", 0, b"", false));
    }
}
