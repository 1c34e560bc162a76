use super::ExecOptions;
use crate::classes::{default_word_delimiters, DelimiterTable};
use crate::program::Program;
use crate::regex_limits::{DEFAULT_RECURSION_LIMIT, MAX_BACK_REFERENCE};

pub(crate) fn reg_error(message: &str) {
    log::error!("internal error processing regular expression ({})", message);
}

/// Matcher state for one execute call.
///
/// Offsets are byte indices into `text`. The logical window is
/// `look_behind_to <= start_of_string <= end_of_string <= text.len()`;
/// look-ahead may see past `end_of_string`, look-behind may see before
/// `start_of_string` but never before `look_behind_to`.
pub struct ExecContext<'a> {
    pub program: &'a Program,
    pub text: &'a [u8],
    /// Scan cursor.
    pub input: usize,
    pub start_of_string: usize,
    pub end_of_string: usize,
    pub look_behind_to: usize,

    pub delimiters: DelimiterTable,
    pub prev_is_bol: bool,
    pub succ_is_eol: bool,
    pub prev_is_delim: bool,
    pub succ_is_delim: bool,

    // Live capture slots; the first write for a group wins
    pub startp: Vec<Option<usize>>,
    pub endp: Vec<Option<usize>>,
    // What \1..\9 see while matching is still in progress
    pub back_ref_start: Vec<Option<usize>>,
    pub back_ref_end: Vec<Option<usize>>,

    pub brace_counts: Vec<u32>,

    pub extent_bw: Option<usize>,
    pub extent_fw: Option<usize>,
    pub top_branch: usize,

    pub recursion_count: usize,
    pub recursion_limit: usize,
    pub recursion_limit_exceeded: bool,
}

impl<'a> ExecContext<'a> {
    /// Callers guarantee `options.start <= text.len()`.
    pub fn new(program: &'a Program, text: &'a [u8], options: &ExecOptions) -> Self {
        let start = options.start;
        let match_to = options.match_to.unwrap_or(text.len()).min(text.len());
        let look_behind_to = options.look_behind_to.unwrap_or(0).min(start);

        let prev_char = options.prev_char.unwrap_or_else(|| {
            start
                .checked_sub(1)
                .and_then(|i| text.get(i).copied())
                .unwrap_or(0)
        });
        let succ_char = options
            .succ_char
            .unwrap_or_else(|| text.get(match_to).copied().unwrap_or(0));

        let delimiters = options
            .delimiters
            .copied()
            .unwrap_or_else(default_word_delimiters);

        let slots = program.num_groups() + 1;
        let back_ref_slots = slots.min(MAX_BACK_REFERENCE as usize + 1);

        ExecContext {
            program,
            text,
            input: start,
            start_of_string: start,
            end_of_string: match_to,
            look_behind_to,
            prev_is_bol: prev_char == b'\n' || prev_char == 0,
            succ_is_eol: succ_char == b'\n' || succ_char == 0,
            prev_is_delim: delimiters.is_delimiter(prev_char),
            succ_is_delim: delimiters.is_delimiter(succ_char),
            delimiters,
            startp: vec![None; slots],
            endp: vec![None; slots],
            back_ref_start: vec![None; back_ref_slots],
            back_ref_end: vec![None; back_ref_slots],
            brace_counts: vec![0; program.num_counters()],
            extent_bw: None,
            extent_fw: None,
            top_branch: 0,
            recursion_count: 0,
            recursion_limit: options.recursion_limit.unwrap_or(DEFAULT_RECURSION_LIMIT),
            recursion_limit_exceeded: false,
        }
    }

    #[inline]
    pub fn at_end(&self, pos: usize) -> bool {
        pos >= self.end_of_string
    }

    /// Byte under the cursor, `None` at the logical end.
    #[inline]
    pub fn current(&self) -> Option<u8> {
        if self.at_end(self.input) {
            None
        } else {
            self.text.get(self.input).copied()
        }
    }

    /// Is the character before the cursor a word delimiter?
    pub fn delim_before(&self) -> bool {
        if self.input == self.start_of_string {
            self.prev_is_delim
        } else {
            match self.input.checked_sub(1).and_then(|i| self.text.get(i)) {
                Some(&c) => self.delimiters.is_delimiter(c),
                None => true,
            }
        }
    }

    /// Is the character under the cursor a word delimiter?
    pub fn delim_at(&self) -> bool {
        match self.current() {
            Some(c) => self.delimiters.is_delimiter(c),
            None => self.succ_is_delim,
        }
    }

    pub fn at_line_start(&self) -> bool {
        if self.input == self.start_of_string {
            return self.prev_is_bol;
        }
        match self.input.checked_sub(1).and_then(|i| self.text.get(i)) {
            Some(&c) => c == b'\n',
            None => true,
        }
    }

    pub fn at_line_end(&self) -> bool {
        self.text.get(self.input) == Some(&b'\n') || (self.at_end(self.input) && self.succ_is_eol)
    }

    /// Try to match the whole program starting exactly at `at`.
    pub fn attempt(&mut self, at: usize) -> bool {
        self.input = at;
        self.recursion_count = 0;
        self.extent_bw = Some(at);
        self.extent_fw = None;
        self.startp.fill(None);
        self.endp.fill(None);
        self.back_ref_start.fill(None);
        self.back_ref_end.fill(None);

        let mut branch_index = 0;
        if self.match_node(0, Some(&mut branch_index)) {
            self.startp[0] = Some(at);
            self.endp[0] = Some(self.input);
            self.top_branch = branch_index;
            return true;
        }
        false
    }
}
