use crate::compiler::{compile, start_hints, CompileFlags};
use crate::exec::{execute, ExecOptions, MatchResult};
use crate::program::Program;
use crate::regex_error::RegexResult;
use std::ops::Range;

/// A compiled pattern plus the captures of its most recent execute call.
///
/// Matching only reads the program; the captures are replaced wholesale
/// by each `execute`, and a failed execute clears them.
#[derive(Debug, Clone)]
pub struct Regex {
    pub(crate) program: Program,
    match_start: Option<u8>,
    anchor: bool,
    pub(crate) startp: Vec<Option<usize>>,
    pub(crate) endp: Vec<Option<usize>>,
    extent_bw: Option<usize>,
    extent_fw: Option<usize>,
    top_branch: usize,
}

impl Regex {
    pub fn new(pattern: &str) -> RegexResult<Self> {
        Self::with_flags(pattern, CompileFlags::default())
    }

    pub fn with_flags(pattern: impl AsRef<[u8]>, flags: CompileFlags) -> RegexResult<Self> {
        let compiled = compile(pattern.as_ref(), &flags)?;
        Ok(Self::from_parts(
            compiled.program,
            compiled.match_start,
            compiled.anchor,
        ))
    }

    /// Wrap a program obtained from `Program::from_bytes`.
    pub fn from_program(program: Program) -> Self {
        let (match_start, anchor) = start_hints(&program);
        Self::from_parts(program, match_start, anchor)
    }

    fn from_parts(program: Program, match_start: Option<u8>, anchor: bool) -> Self {
        let slots = program.num_groups() + 1;
        Regex {
            program,
            match_start,
            anchor,
            startp: vec![None; slots],
            endp: vec![None; slots],
            extent_bw: None,
            extent_fw: None,
            top_branch: 0,
        }
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Search `text`. On success the captures describe the match until
    /// the next call.
    pub fn execute(&mut self, text: &[u8], options: &ExecOptions) -> bool {
        match execute(&self.program, self.match_start, self.anchor, text, options) {
            Some(result) => {
                self.store(result);
                true
            }
            None => {
                self.clear_captures();
                false
            }
        }
    }

    pub fn is_match(&mut self, text: &[u8]) -> bool {
        self.execute(text, &ExecOptions::default())
    }

    /// First match starting at or after `start`.
    pub fn find_at(&mut self, text: &[u8], start: usize) -> Option<Range<usize>> {
        if self.execute(text, &ExecOptions::starting_at(start)) {
            self.span()
        } else {
            None
        }
    }

    /// Every non-overlapping match, left to right. An empty match right
    /// after a non-empty one is skipped.
    pub fn find_all(&mut self, text: &[u8]) -> Vec<Range<usize>> {
        let mut matches = Vec::new();
        let mut pos = 0;
        let mut last_end: Option<usize> = None;

        while pos <= text.len() {
            let Some(span) = self.find_at(text, pos) else {
                break;
            };
            let empty = span.start == span.end;
            if !(empty && last_end == Some(span.start)) {
                last_end = Some(span.end);
                matches.push(span.clone());
            }
            pos = if empty { span.end + 1 } else { span.end };
        }

        matches
    }

    /// Whole-match span.
    pub fn span(&self) -> Option<Range<usize>> {
        self.group(0)
    }

    /// Span of capture group `n`; `None` if it did not participate.
    pub fn group(&self, n: usize) -> Option<Range<usize>> {
        match (self.startp.get(n).copied()?, self.endp.get(n).copied()?) {
            (Some(start), Some(end)) if start <= end => Some(start..end),
            _ => None,
        }
    }

    /// Capturing groups in the pattern, not counting group 0.
    pub fn group_count(&self) -> usize {
        self.program.num_groups()
    }

    /// Leftmost text a look-behind inspected for the last match.
    pub fn extent_bw(&self) -> Option<usize> {
        self.extent_bw
    }

    /// Rightmost text the last match (including look-ahead) inspected.
    pub fn extent_fw(&self) -> Option<usize> {
        self.extent_fw
    }

    /// Index of the top-level alternative that matched.
    pub fn top_branch(&self) -> usize {
        self.top_branch
    }

    pub fn match_start(&self) -> Option<u8> {
        self.match_start
    }

    pub fn is_anchored(&self) -> bool {
        self.anchor
    }

    fn store(&mut self, result: MatchResult) {
        self.startp = result.startp;
        self.endp = result.endp;
        self.extent_bw = result.extent_bw;
        self.extent_fw = result.extent_fw;
        self.top_branch = result.top_branch;
    }

    fn clear_captures(&mut self) {
        self.startp.fill(None);
        self.endp.fill(None);
        self.extent_bw = None;
        self.extent_fw = None;
        self.top_branch = 0;
    }
}

impl std::str::FromStr for Regex {
    type Err = crate::regex_error::RegexError;

    fn from_str(pattern: &str) -> RegexResult<Self> {
        Regex::new(pattern)
    }
}
