// Search driver
//
// Picks candidate start positions (forward or backward, using the anchor
// and first-character hints) and runs one match attempt at each until one
// succeeds or the recursion ceiling trips.
mod exec_context;
mod greedy;
mod matcher;

pub(crate) use exec_context::{reg_error, ExecContext};
pub use greedy::single_char_matches;

use crate::classes::DelimiterTable;
use crate::program::Program;

/// Per-call execute options. `Default` searches forward from offset 0
/// over the whole text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecOptions<'a> {
    /// Offset where the search starts; also the logical start of string
    /// for `^`, `<` and friends.
    pub start: usize,
    /// Matches may not begin at or past this offset (forward) or after it
    /// (backward), but may extend beyond it.
    pub end: Option<usize>,
    pub reverse: bool,
    /// Character before `start`; defaults to the byte at `start - 1`.
    pub prev_char: Option<u8>,
    /// Character after `match_to`; defaults to the byte at `match_to`.
    pub succ_char: Option<u8>,
    /// Word delimiters; defaults to the process-wide set.
    pub delimiters: Option<&'a DelimiterTable>,
    /// Look-behind never reaches before this offset.
    pub look_behind_to: Option<usize>,
    /// Logical end of the text for matching.
    pub match_to: Option<usize>,
    pub recursion_limit: Option<usize>,
}

impl<'a> ExecOptions<'a> {
    pub fn starting_at(start: usize) -> Self {
        ExecOptions {
            start,
            ..Default::default()
        }
    }

    pub fn reverse_from(start: usize, end: usize) -> Self {
        ExecOptions {
            start,
            end: Some(end),
            reverse: true,
            ..Default::default()
        }
    }
}

/// Captures and extents of a successful search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub startp: Vec<Option<usize>>,
    pub endp: Vec<Option<usize>>,
    pub extent_bw: Option<usize>,
    pub extent_fw: Option<usize>,
    pub top_branch: usize,
}

/// Search `text` with `program`.
pub fn execute(
    program: &Program,
    match_start: Option<u8>,
    anchor: bool,
    text: &[u8],
    options: &ExecOptions,
) -> Option<MatchResult> {
    if !program.is_valid() {
        reg_error("corrupted program");
        return None;
    }
    if options.start > text.len() {
        return None;
    }

    let mut ctx = ExecContext::new(program, text, options);
    let found = if options.reverse {
        search_backward(&mut ctx, match_start, anchor, options)
    } else {
        search_forward(&mut ctx, match_start, anchor, options)
    };

    if ctx.recursion_limit_exceeded || !found {
        return None;
    }

    Some(MatchResult {
        startp: ctx.startp,
        endp: ctx.endp,
        extent_bw: ctx.extent_bw,
        extent_fw: ctx.extent_fw,
        top_branch: ctx.top_branch,
    })
}

fn search_forward(
    ctx: &mut ExecContext,
    match_start: Option<u8>,
    anchor: bool,
    options: &ExecOptions,
) -> bool {
    let end = options.end;
    let mut s = options.start;
    let before_end = |s: usize| end.is_none_or(|e| s < e);
    if !before_end(s) {
        return false;
    }

    // Anchored at line starts: the start offset, then after each newline
    if anchor {
        if ctx.attempt(s) {
            return true;
        }
        while !ctx.at_end(s) && before_end(s) && !ctx.recursion_limit_exceeded {
            if ctx.text[s] == b'\n' && before_end(s + 1) && ctx.attempt(s + 1) {
                return true;
            }
            s += 1;
        }
        return false;
    }

    if let Some(c) = match_start {
        while !ctx.at_end(s) && before_end(s) && !ctx.recursion_limit_exceeded {
            if ctx.text[s] == c && ctx.attempt(s) {
                return true;
            }
            s += 1;
        }
        return false;
    }

    while !ctx.at_end(s) && before_end(s) && !ctx.recursion_limit_exceeded {
        if ctx.attempt(s) {
            return true;
        }
        s += 1;
    }

    // An empty pattern or a lone `$` can still match at the very end
    !ctx.recursion_limit_exceeded && ctx.at_end(s) && before_end(s) && ctx.attempt(s)
}

fn search_backward(
    ctx: &mut ExecContext,
    match_start: Option<u8>,
    anchor: bool,
    options: &ExecOptions,
) -> bool {
    let start = options.start;
    // Never start matching beyond the logical end
    let end = options
        .end
        .unwrap_or(ctx.end_of_string)
        .min(ctx.end_of_string);
    if end < start {
        return false;
    }

    if anchor {
        for s in (start..end).rev() {
            if ctx.recursion_limit_exceeded {
                return false;
            }
            if ctx.text[s] == b'\n' && ctx.attempt(s + 1) {
                return true;
            }
        }
        return !ctx.recursion_limit_exceeded && ctx.attempt(start);
    }

    for s in (start..=end).rev() {
        if ctx.recursion_limit_exceeded {
            return false;
        }
        if let Some(c) = match_start {
            if ctx.text.get(s) != Some(&c) {
                continue;
            }
        }
        if ctx.attempt(s) {
            return true;
        }
    }
    false
}
