// Recursive descent over the pattern grammar
//
//   chunk       ::= alternative ( '|' alternative )*
//   alternative ::= piece*
//   piece       ::= atom quantifier?
//   atom        ::= group | class | escape | anchor | '.' | literal-run
//
// Each level returns the index of its first node along with the width
// flags and the length range of what it matched.
use crate::classes::{class_tables, is_digit, is_letter, is_space, is_word_char};
use crate::compiler::code::{
    branch_tail, emit_byte, emit_class_byte, emit_group, emit_node, emit_special, insert,
    offset_tail, retract_byte, tail,
};
use crate::compiler::escape::{is_shortcut_escape, literal_escape, numeric_escape, NumericEscape};
use crate::compiler::parse_context::ParseContext;
use crate::program::{next_index, OpCode, Operand};
use crate::regex_error::RegexResult;
use crate::regex_limits::{MAX_BOUND_VALUE, MAX_COUNTERS, MAX_LOOK_BEHIND};

// Width flags
pub const WORST: u8 = 0;
/// Can never match the empty string.
pub const HAS_WIDTH: u8 = 0x01;
/// Matches exactly one character; eligible for the greedy fast path.
pub const SIMPLE: u8 = 0x02;

/// Length range of a sub-expression; `lower < 0` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LenRange {
    pub lower: i64,
    pub upper: i64,
}

impl LenRange {
    pub const UNBOUNDED: LenRange = LenRange {
        lower: -1,
        upper: -1,
    };

    pub const fn fixed(len: i64) -> Self {
        LenRange {
            lower: len,
            upper: len,
        }
    }

    #[inline]
    pub fn is_bounded(&self) -> bool {
        self.lower >= 0
    }
}

/// What a grammar level produced.
#[derive(Debug, Clone, Copy)]
pub struct Parsed {
    pub node: usize,
    pub flags: u8,
    pub range: LenRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParenKind {
    NoParen,
    Capture,
    NoCapture,
    Insensitive,
    Sensitive,
    Newline,
    NoNewline,
    PosAhead,
    NegAhead,
    PosBehind,
    NegBehind,
}

/// Parse alternatives up to the closing parenthesis (or end of pattern for
/// the top level) and link every branch to a common ender.
pub fn chunk(ctx: &mut ParseContext, paren: ParenKind) -> RegexResult<Parsed> {
    let old_case_insensitive = ctx.case_insensitive;
    let old_match_newline = ctx.match_newline;

    let mut flags = HAS_WIDTH;
    let mut range = LenRange::fixed(0);
    let mut head: Option<usize> = None;
    let mut this_paren = 0;
    let mut look_only = false;
    let mut look_behind_node = None;

    match paren {
        ParenKind::Capture => {
            if ctx.total_paren > ctx.max_groups {
                return Err(ctx.limit_error(format!("number of ()'s > {}", ctx.max_groups)));
            }
            this_paren = ctx.open_paren();
            head = Some(emit_group(ctx, OpCode::Open, this_paren));
        }
        ParenKind::PosAhead | ParenKind::NegAhead => {
            flags = WORST;
            look_only = true;
            let op = if paren == ParenKind::PosAhead {
                OpCode::PosAheadOpen
            } else {
                OpCode::NegAheadOpen
            };
            head = Some(emit_node(ctx, op));
        }
        ParenKind::PosBehind | ParenKind::NegBehind => {
            flags = WORST;
            look_only = true;
            let op = if paren == ParenKind::PosBehind {
                OpCode::PosBehindOpen
            } else {
                OpCode::NegBehindOpen
            };
            // Bounds are patched once the body has been measured
            let node = emit_special(ctx, op, 0, 0);
            head = Some(node);
            look_behind_node = Some(node);
        }
        ParenKind::Insensitive => ctx.case_insensitive = true,
        ParenKind::Sensitive => ctx.case_insensitive = false,
        ParenKind::Newline => ctx.match_newline = true,
        ParenKind::NoNewline => ctx.match_newline = false,
        ParenKind::NoParen | ParenKind::NoCapture => {}
    }

    let mut first = true;
    loop {
        let branch = alternative(ctx)?;

        if first {
            first = false;
            range = branch.range;
        } else if range.is_bounded() {
            if branch.range.is_bounded() {
                range.lower = range.lower.min(branch.range.lower);
                range.upper = range.upper.max(branch.range.upper);
            } else {
                range = LenRange::UNBOUNDED;
            }
        }

        match head {
            Some(start) => tail(ctx, start, branch.node),
            None => head = Some(branch.node),
        }

        if branch.flags & HAS_WIDTH == 0 {
            flags &= !HAS_WIDTH;
        }

        if ctx.at_end() || ctx.peek() != b'|' {
            break;
        }
        ctx.pos += 1;
    }

    // alternative() always emits at least one node
    let head = head.unwrap_or(0);

    let ender = match paren {
        ParenKind::Capture => emit_group(ctx, OpCode::Close, this_paren),
        ParenKind::NoParen => emit_node(ctx, OpCode::End),
        ParenKind::PosAhead | ParenKind::NegAhead => emit_node(ctx, OpCode::LookAheadClose),
        ParenKind::PosBehind | ParenKind::NegBehind => emit_node(ctx, OpCode::LookBehindClose),
        _ => emit_node(ctx, OpCode::Nothing),
    };
    tail(ctx, head, ender);

    // Hook the tail of every branch to the ender
    if !ctx.sizing {
        let mut this_branch = Some(head);
        while let Some(index) = this_branch {
            branch_tail(ctx, index, 1, ender);
            this_branch = next_index(&ctx.code, index);
        }
    }

    if paren != ParenKind::NoParen {
        if ctx.at_end() || ctx.peek() != b')' {
            return Err(ctx.syntax_error("missing right parenthesis ')'"));
        }
        ctx.pos += 1;
    } else if !ctx.at_end() {
        if ctx.peek() == b')' {
            return Err(ctx.syntax_error("missing left parenthesis '('"));
        }
        return Err(ctx.syntax_error("junk on end"));
    }

    if let Some(node) = look_behind_node {
        if !range.is_bounded() {
            return Err(ctx.syntax_error("look-behind does not have a bounded size"));
        }
        if range.upper > MAX_LOOK_BEHIND {
            return Err(ctx.limit_error("max. look-behind size is too large (>65535)"));
        }
        if !ctx.sizing {
            ctx.code[node].operand = Operand::Bounds {
                lower: range.lower as u16,
                upper: range.upper as u16,
            };
        }
    }

    // Look-around bodies consume nothing from the caller's point of view
    if look_only {
        range = LenRange::fixed(0);
    }

    if paren == ParenKind::Capture {
        ctx.closed_parens[this_paren] = true;
        let zero_width = group_quantifier_allows_empty(ctx);
        if flags & HAS_WIDTH != 0 && !zero_width {
            ctx.paren_has_width[this_paren] = true;
        }
    }

    ctx.case_insensitive = old_case_insensitive;
    ctx.match_newline = old_match_newline;

    Ok(Parsed {
        node: head,
        flags,
        range,
    })
}

/// A group followed by `?`, `*`, `{,`, `{}` or `{0...,` may match nothing,
/// so a back reference to it must not be treated as having width.
fn group_quantifier_allows_empty(ctx: &ParseContext) -> bool {
    match ctx.peek() {
        b'?' | b'*' => true,
        b'{' if ctx.brace_char == b'{' => match ctx.peek_at(1) {
            b',' | b'}' => true,
            b'0' => {
                let mut i = 2;
                while ctx.peek_at(i) == b'0' {
                    i += 1;
                }
                ctx.peek_at(i) == b','
            }
            _ => false,
        },
        _ => false,
    }
}

/// One alternative: a BRANCH node followed by its pieces.
fn alternative(ctx: &mut ParseContext) -> RegexResult<Parsed> {
    let mut flags = WORST;
    let mut range = LenRange::fixed(0);

    let branch = emit_node(ctx, OpCode::Branch);
    let mut chain: Option<usize> = None;

    while !ctx.at_end() && ctx.peek() != b'|' && ctx.peek() != b')' {
        let latest = piece(ctx)?;

        flags |= latest.flags & HAS_WIDTH;
        if !latest.range.is_bounded() {
            range = LenRange::UNBOUNDED;
        } else if range.is_bounded() {
            range.lower += latest.range.lower;
            range.upper += latest.range.upper;
        }

        if let Some(previous) = chain {
            tail(ctx, previous, latest.node);
        }
        chain = Some(latest.node);
    }

    if chain.is_none() {
        emit_node(ctx, OpCode::Nothing);
    }

    Ok(Parsed {
        node: branch,
        flags,
        range,
    })
}

/// An atom with an optional quantifier. Simple atoms get a single
/// repetition node; anything else is wrapped in branch/back loops, and
/// general counted ranges get counter nodes.
fn piece(ctx: &mut ParseContext) -> RegexResult<Parsed> {
    let atom = atom(ctx)?;
    let mut op_code = ctx.peek();

    if ctx.at_end() || !ctx.is_quantifier(op_code) {
        return Ok(atom);
    }

    let mut min_max = [0u32; 2];
    let mut brace_present = false;
    let mut lazy = false;

    if op_code == b'{' {
        brace_present = true;
        ctx.pos += 1;

        let mut comma_present = false;
        let mut digit_present = [false; 2];
        for i in 0..2 {
            while is_digit(ctx.peek()) {
                let digit = (ctx.peek() - b'0') as u32;
                if min_max[i] > (MAX_BOUND_VALUE - digit) / 10 {
                    let message = if i == 0 {
                        format!(
                            "min operand of {{{}{},???}} > 65535",
                            min_max[0],
                            ctx.peek() as char
                        )
                    } else {
                        format!(
                            "max operand of {{{},{}{}}} > 65535",
                            min_max[0],
                            min_max[1],
                            ctx.peek() as char
                        )
                    };
                    return Err(ctx.limit_error(message));
                }
                min_max[i] = min_max[i] * 10 + digit;
                ctx.pos += 1;
                digit_present[i] = true;
            }
            if !comma_present && ctx.peek() == b',' {
                comma_present = true;
                ctx.pos += 1;
            }
        }

        if !comma_present && digit_present[0] && min_max[0] == 0 {
            return Err(ctx.syntax_error("{0} is an invalid range"));
        }
        if digit_present[0] && digit_present[1] && min_max == [0, 0] {
            return Err(ctx.syntax_error("{0,0} is an invalid range"));
        }
        if digit_present[1] && min_max[1] == 0 {
            let message = if digit_present[0] {
                format!("{{{},0}} is an invalid range", min_max[0])
            } else {
                "{,0} is an invalid range".to_string()
            };
            return Err(ctx.syntax_error(message));
        }

        if !comma_present {
            min_max[1] = min_max[0];
        }

        if ctx.peek() != b'}' {
            return Err(ctx.syntax_error("{m,n} specification missing right '}'"));
        }
        if min_max[1] != 0 && min_max[0] > min_max[1] {
            return Err(ctx.syntax_error(format!(
                "{{{},{}}} is an invalid range",
                min_max[0], min_max[1]
            )));
        }
    }

    ctx.pos += 1;

    if !ctx.at_end() && ctx.peek() == b'?' {
        lazy = true;
        ctx.pos += 1;
    }

    // Counted forms equivalent to the basic quantifiers collapse to them
    if op_code == b'{' {
        match min_max {
            [0, 0] => op_code = b'*',
            [1, 0] => op_code = b'+',
            [0, 1] => op_code = b'?',
            [1, 1] => return Ok(atom),
            _ => {
                if ctx.num_braces >= MAX_COUNTERS {
                    return Err(ctx.limit_error("number of {m,n} constructs > 255"));
                }
            }
        }
    }

    if op_code == b'+' {
        min_max[0] = 1;
    }
    if op_code == b'?' {
        min_max[1] = 1;
    }

    if atom.flags & HAS_WIDTH == 0 {
        let message = if brace_present {
            format!("{{{},{}}} operand could be empty", min_max[0], min_max[1])
        } else {
            format!("{} operand could be empty", op_code as char)
        };
        return Err(ctx.syntax_error(message));
    }

    let flags = if min_max[0] > 0 { HAS_WIDTH } else { WORST };
    let range = if atom.range.is_bounded() && min_max[1] != 0 {
        LenRange {
            lower: atom.range.lower.saturating_mul(min_max[0] as i64),
            upper: atom.range.upper.saturating_mul(min_max[1] as i64),
        }
    } else {
        LenRange::UNBOUNDED
    };

    let ret_val = atom.node;

    if atom.flags & SIMPLE != 0 {
        let op = match (op_code, lazy) {
            (b'*', false) => OpCode::Star,
            (b'*', true) => OpCode::LazyStar,
            (b'+', false) => OpCode::Plus,
            (b'+', true) => OpCode::LazyPlus,
            (b'?', false) => OpCode::Question,
            (b'?', true) => OpCode::LazyQuestion,
            (_, false) => OpCode::Brace,
            (_, true) => OpCode::LazyBrace,
        };
        insert(ctx, op, ret_val, min_max[0], min_max[1], 0);
    } else {
        emit_complex_quantifier(ctx, ret_val, op_code, lazy, min_max);
    }

    if !ctx.at_end() && ctx.is_quantifier(ctx.peek()) {
        let message = if op_code == b'{' {
            format!("nested quantifiers, {{m,n}}{}", ctx.peek() as char)
        } else {
            format!("nested quantifiers, {}{}", op_code as char, ctx.peek() as char)
        };
        return Err(ctx.syntax_error(message));
    }

    Ok(Parsed {
        node: ret_val,
        flags,
        range,
    })
}

/// Wrap a multi-character operand starting at `ret_val` in loop nodes.
///
/// Notation below: B = BRANCH, N = NOTHING, K = BACK, I = INIT_COUNT,
/// C = INC_COUNT, T~n = TEST_COUNT against n. A TEST_COUNT falls through to
/// the node after it while the counter is below its limit and follows its
/// link otherwise.
fn emit_complex_quantifier(
    ctx: &mut ParseContext,
    ret_val: usize,
    op_code: u8,
    lazy: bool,
    min_max: [u32; 2],
) {
    let [min, max] = min_max;

    if (op_code == b'*' || op_code == b'+') && lazy {
        // B B N (...) K N  with an extra leading N for +
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, ret_val, back);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Nothing, ret_val, 0, 0, 0);
        let next = emit_node(ctx, OpCode::Nothing);
        offset_tail(ctx, ret_val, 1, next);
        tail(ctx, ret_val, next);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        tail(ctx, ret_val, ret_val + 2);
        offset_tail(ctx, ret_val, 3, ret_val);
        if op_code == b'+' {
            insert(ctx, OpCode::Nothing, ret_val, 0, 0, 0);
            tail(ctx, ret_val, ret_val + 4);
        }
    } else if op_code == b'*' {
        // B (...) K B N
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let back = emit_node(ctx, OpCode::Back);
        offset_tail(ctx, ret_val, 1, back);
        offset_tail(ctx, ret_val, 1, ret_val);
        let branch = emit_node(ctx, OpCode::Branch);
        tail(ctx, ret_val, branch);
        let nothing = emit_node(ctx, OpCode::Nothing);
        tail(ctx, ret_val, nothing);
    } else if op_code == b'+' {
        // (...) B K B N
        let next = emit_node(ctx, OpCode::Branch);
        tail(ctx, ret_val, next);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        let branch = emit_node(ctx, OpCode::Branch);
        tail(ctx, next, branch);
        let nothing = emit_node(ctx, OpCode::Nothing);
        tail(ctx, ret_val, nothing);
    } else if op_code == b'?' && lazy {
        // B N B (...) N
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Nothing, ret_val, 0, 0, 0);
        let next = emit_node(ctx, OpCode::Nothing);
        offset_tail(ctx, ret_val, 2, next);
        offset_tail(ctx, ret_val, 1, next);
        tail(ctx, ret_val, next);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        tail(ctx, ret_val, ret_val + 2);
    } else if op_code == b'?' {
        // B (...) B N
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let branch = emit_node(ctx, OpCode::Branch);
        tail(ctx, ret_val, branch);
        let next = emit_node(ctx, OpCode::Nothing);
        tail(ctx, ret_val, next);
        offset_tail(ctx, ret_val, 1, next);
    } else {
        emit_counted_loop(ctx, ret_val, lazy, min, max);
        ctx.num_braces += 1;
    }
}

fn emit_counted_loop(ctx: &mut ParseContext, ret_val: usize, lazy: bool, min: u32, max: u32) {
    let counter = ctx.num_braces;

    if min == max {
        // I (...) C T~m K N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test = emit_special(ctx, OpCode::TestCount, min, counter);
        tail(ctx, ret_val, test);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        let nothing = emit_node(ctx, OpCode::Nothing);
        tail(ctx, ret_val, nothing);
        let next = insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, next);
    } else if lazy && min == 0 {
        // I B N B (...) C T~x K N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test = emit_special(ctx, OpCode::TestCount, max, counter);
        tail(ctx, ret_val, test);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Nothing, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        tail(ctx, ret_val, ret_val + 2);
        let next = emit_node(ctx, OpCode::Nothing);
        offset_tail(ctx, ret_val, 1, next);
        offset_tail(ctx, ret_val, 2, next);
        offset_tail(ctx, ret_val, 3, next);
        let next = insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, next);
    } else if lazy && max == 0 {
        // I B N B (...) C T~m K K N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test = emit_special(ctx, OpCode::TestCount, min, counter);
        tail(ctx, ret_val, test);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, ret_val, back);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Nothing, ret_val, 0, 0, 0);
        let next = emit_node(ctx, OpCode::Nothing);
        offset_tail(ctx, ret_val, 1, next);
        tail(ctx, ret_val, next);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        tail(ctx, ret_val, ret_val + 2);
        offset_tail(ctx, ret_val, 3, ret_val);
        insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, ret_val + 4);
    } else if lazy {
        // I B N B (...) C T~x T~m K K N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test_max = emit_special(ctx, OpCode::TestCount, max, counter);
        tail(ctx, ret_val, test_max);
        let test_min = emit_special(ctx, OpCode::TestCount, min, counter);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, test_min, back);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Nothing, ret_val, 0, 0, 0);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let next = emit_node(ctx, OpCode::Nothing);
        offset_tail(ctx, ret_val, 1, next);
        offset_tail(ctx, ret_val, 2, next);
        offset_tail(ctx, ret_val, 3, next);
        tail(ctx, ret_val, ret_val + 2);
        offset_tail(ctx, next, -1, ret_val);
        insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, ret_val + 4);
    } else if min == 0 {
        // I B (...) C T~x K B N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test = emit_special(ctx, OpCode::TestCount, max, counter);
        tail(ctx, ret_val, test);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        let next = emit_node(ctx, OpCode::Branch);
        tail(ctx, ret_val, next);
        let nothing = emit_node(ctx, OpCode::Nothing);
        tail(ctx, next, nothing);
        offset_tail(ctx, ret_val, 1, next);
        let next = insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, next);
    } else if max == 0 {
        // I B (...) C T~m K K B N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test = emit_special(ctx, OpCode::TestCount, min, counter);
        tail(ctx, ret_val, test);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let next = emit_node(ctx, OpCode::Back);
        tail(ctx, next, ret_val);
        offset_tail(ctx, ret_val, 1, next);
        let branch = emit_node(ctx, OpCode::Branch);
        tail(ctx, ret_val, branch);
        let nothing = emit_node(ctx, OpCode::Nothing);
        tail(ctx, ret_val, nothing);
        insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, ret_val + 2);
    } else {
        // I B (...) C T~x T~m K K B N
        let inc = emit_special(ctx, OpCode::IncCount, 0, counter);
        tail(ctx, ret_val, inc);
        let test_max = emit_special(ctx, OpCode::TestCount, max, counter);
        tail(ctx, ret_val, test_max);
        let test_min = emit_special(ctx, OpCode::TestCount, min, counter);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, back, ret_val);
        let back = emit_node(ctx, OpCode::Back);
        tail(ctx, test_min, back);
        insert(ctx, OpCode::Branch, ret_val, 0, 0, 0);
        let next = emit_node(ctx, OpCode::Branch);
        tail(ctx, ret_val, next);
        offset_tail(ctx, next, -1, ret_val);
        let next = emit_node(ctx, OpCode::Nothing);
        offset_tail(ctx, ret_val, 1, next);
        offset_tail(ctx, next, -1, next);
        insert(ctx, OpCode::InitCount, ret_val, 0, 0, counter);
        tail(ctx, ret_val, ret_val + 2);
    }
}

fn atom(ctx: &mut ParseContext) -> RegexResult<Parsed> {
    // (?#...) comments vanish; a comment that ends an alternative still
    // needs a node to stand for it
    while ctx.peek() == b'(' && ctx.peek_at(1) == b'?' && ctx.peek_at(2) == b'#' {
        ctx.pos += 3;
        while !ctx.at_end() && ctx.peek() != b')' {
            ctx.pos += 1;
        }
        if !ctx.at_end() {
            ctx.pos += 1;
        }
        if ctx.at_end() || ctx.peek() == b')' || ctx.peek() == b'|' {
            let node = emit_node(ctx, OpCode::Nothing);
            return Ok(Parsed {
                node,
                flags: WORST,
                range: LenRange::fixed(0),
            });
        }
    }

    if ctx.at_end() {
        return Err(ctx.syntax_error("internal error #1, 'atom'"));
    }

    let c = ctx.peek();
    ctx.pos += 1;

    let zero_width = |node| Parsed {
        node,
        flags: WORST,
        range: LenRange::fixed(0),
    };
    let one_char = |node| Parsed {
        node,
        flags: HAS_WIDTH | SIMPLE,
        range: LenRange::fixed(1),
    };

    match c {
        b'^' => Ok(zero_width(emit_node(ctx, OpCode::Bol))),
        b'$' => Ok(zero_width(emit_node(ctx, OpCode::Eol))),
        b'<' => Ok(zero_width(emit_node(ctx, OpCode::BoWord))),
        b'>' => Ok(zero_width(emit_node(ctx, OpCode::EoWord))),
        b'.' => {
            let op = if ctx.match_newline {
                OpCode::Every
            } else {
                OpCode::Any
            };
            Ok(one_char(emit_node(ctx, op)))
        }
        b'(' => group(ctx),
        b'|' | b')' => Err(ctx.syntax_error("internal error #2, 'atom'")),
        b'?' | b'+' | b'*' => Err(ctx.syntax_error(format!("{} follows nothing", c as char))),
        b'{' if ctx.brace_char == b'{' => Err(ctx.syntax_error("{m,n} follows nothing")),
        b'[' => char_class(ctx),
        b'\\' => {
            let e = ctx.peek();
            if !ctx.at_end() && is_shortcut_escape(e, false) {
                let node = emit_shortcut_node(ctx, e);
                ctx.pos += 1;
                if e == b'B' {
                    return Ok(zero_width(node));
                }
                return Ok(one_char(node));
            }
            if let Some(parsed) = back_reference(ctx, true)? {
                return Ok(parsed);
            }
            // Not a shortcut or back reference: part of a literal run
            ctx.pos -= 1;
            literal_run(ctx)
        }
        _ => {
            ctx.pos -= 1;
            literal_run(ctx)
        }
    }
}

fn group(ctx: &mut ParseContext) -> RegexResult<Parsed> {
    let kind = if ctx.peek() == b'?' {
        ctx.pos += 1;
        let kind = match ctx.peek() {
            b':' => ParenKind::NoCapture,
            b'=' => ParenKind::PosAhead,
            b'!' => ParenKind::NegAhead,
            b'i' => ParenKind::Insensitive,
            b'I' => ParenKind::Sensitive,
            b'n' => ParenKind::Newline,
            b'N' => ParenKind::NoNewline,
            b'<' => {
                ctx.pos += 1;
                match ctx.peek() {
                    b'=' => ParenKind::PosBehind,
                    b'!' => ParenKind::NegBehind,
                    other => {
                        return Err(ctx.syntax_error(format!(
                            "invalid look-behind syntax, \"(?<{}...)\"",
                            other as char
                        )));
                    }
                }
            }
            other => {
                return Err(ctx.syntax_error(format!(
                    "invalid grouping syntax, \"(?{}...)\"",
                    other as char
                )));
            }
        };
        ctx.pos += 1;
        kind
    } else {
        ParenKind::Capture
    };

    let body = chunk(ctx, kind)?;
    Ok(Parsed {
        node: body.node,
        flags: body.flags & HAS_WIDTH,
        range: body.range,
    })
}

fn char_class(ctx: &mut ParseContext) -> RegexResult<Parsed> {
    let node = if ctx.peek() == b'^' {
        ctx.pos += 1;
        let node = emit_node(ctx, OpCode::AnyBut);
        if !ctx.match_newline {
            emit_byte(ctx, b'\n');
        }
        node
    } else {
        emit_node(ctx, OpCode::AnyOf)
    };

    let mut last_emit = 0u8;

    // A leading ']' or '-' is an ordinary member
    if !ctx.at_end() && (ctx.peek() == b']' || ctx.peek() == b'-') {
        last_emit = ctx.peek();
        emit_byte(ctx, last_emit);
        ctx.pos += 1;
    }

    while !ctx.at_end() && ctx.peek() != b']' {
        let c = ctx.peek();
        if c == b'-' {
            ctx.pos += 1;
            if ctx.at_end() || ctx.peek() == b']' {
                emit_byte(ctx, b'-');
                last_emit = b'-';
                continue;
            }

            let mut second_value = last_emit as u32 + 1;
            let mut last_value = if ctx.peek() == b'\\' {
                ctx.pos += 1;
                class_escape_value(ctx)?
            } else {
                ctx.peek() as u32
            };

            if ctx.case_insensitive {
                second_value = fold_lower(second_value);
                last_value = fold_lower(last_value);
            }

            if second_value - 1 > last_value {
                return Err(ctx.syntax_error("invalid [] range"));
            }

            // The start of the range was emitted on its own already
            for value in second_value..=last_value {
                emit_class_byte(ctx, value as u8);
            }
            last_emit = last_value as u8;
            ctx.pos += 1;
        } else if c == b'\\' {
            ctx.pos += 1;
            match numeric_escape(ctx.pattern, ctx.pos) {
                NumericEscape::Value { value, last } => {
                    emit_class_byte(ctx, value);
                    last_emit = value;
                    ctx.pos = last;
                }
                NumericEscape::Zero => return Err(zero_escape_error(ctx)),
                NumericEscape::NotNumeric if ctx.at_end() => {
                    return Err(trailing_backslash_error(ctx));
                }
                NumericEscape::NotNumeric => {
                    let e = ctx.peek();
                    if let Some(value) = literal_escape(e) {
                        emit_byte(ctx, value);
                        last_emit = value;
                    } else if is_shortcut_escape(e, true) {
                        if ctx.peek_at(1) == b'-' {
                            return Err(ctx.syntax_error(format!(
                                "\\{} not allowed as range operand",
                                e as char
                            )));
                        }
                        emit_class_shortcut(ctx, e);
                    } else {
                        return Err(ctx.syntax_error(format!(
                            "\\{} is an invalid char class escape sequence",
                            e as char
                        )));
                    }
                }
            }
            ctx.pos += 1;
        } else {
            emit_class_byte(ctx, c);
            last_emit = c;
            ctx.pos += 1;
        }
    }

    if ctx.at_end() || ctx.peek() != b']' {
        return Err(ctx.syntax_error("missing right ']'"));
    }
    ctx.pos += 1;

    Ok(Parsed {
        node,
        flags: HAS_WIDTH | SIMPLE,
        range: LenRange::fixed(1),
    })
}

// Escaped upper end of a class range; leaves pos on its last byte
fn class_escape_value(ctx: &mut ParseContext) -> RegexResult<u32> {
    match numeric_escape(ctx.pattern, ctx.pos) {
        NumericEscape::Value { value, last } => {
            ctx.pos = last;
            Ok(value as u32)
        }
        NumericEscape::Zero => Err(zero_escape_error(ctx)),
        NumericEscape::NotNumeric if ctx.at_end() => Err(trailing_backslash_error(ctx)),
        NumericEscape::NotNumeric => {
            let e = ctx.peek();
            if let Some(value) = literal_escape(e) {
                Ok(value as u32)
            } else if is_shortcut_escape(e, true) {
                Err(ctx.syntax_error(format!("\\{} is not allowed as range operand", e as char)))
            } else {
                Err(ctx.syntax_error(format!(
                    "\\{} is an invalid char class escape sequence",
                    e as char
                )))
            }
        }
    }
}

fn fold_lower(value: u32) -> u32 {
    if value < 256 {
        (value as u8).to_ascii_lowercase() as u32
    } else {
        value
    }
}

fn trailing_backslash_error(ctx: &ParseContext) -> crate::regex_error::RegexError {
    ctx.syntax_error("trailing backslash")
}

fn zero_escape_error(ctx: &ParseContext) -> crate::regex_error::RegexError {
    if ctx.peek() == b'0' {
        ctx.syntax_error("\\00 is an invalid octal escape")
    } else {
        ctx.syntax_error(format!(
            "\\{}0 is an invalid hexadecimal escape",
            ctx.peek() as char
        ))
    }
}

/// Class members for `\d` and friends inside `[...]`. The upper-case forms
/// add the complement, never including NUL, and including newline only
/// for `\S` in newline mode.
fn emit_class_shortcut(ctx: &mut ParseContext, c: u8) {
    let tables = class_tables();
    let members: &[u8] = match c.to_ascii_lowercase() {
        b'd' => &tables.digits,
        b'l' => &tables.letters,
        b's' => &tables.white_space,
        _ => &tables.word_chars,
    };

    if c.is_ascii_lowercase() {
        if c == b's' && ctx.match_newline {
            emit_byte(ctx, b'\n');
        }
        for &m in members {
            emit_byte(ctx, m);
        }
        return;
    }

    let keep_newline = c == b'S' && ctx.match_newline;
    for value in 1..=255u8 {
        let excluded = match c {
            b'D' => is_digit(value),
            b'L' => is_letter(value),
            b'S' => is_space(value) && value != b'\n',
            _ => is_word_char(value),
        };
        if excluded || (value == b'\n' && !keep_newline) {
            continue;
        }
        emit_byte(ctx, value);
    }
}

fn emit_shortcut_node(ctx: &mut ParseContext, c: u8) -> usize {
    let op = match c {
        b'd' => OpCode::Digit,
        b'D' => OpCode::NotDigit,
        b'l' => OpCode::Letter,
        b'L' => OpCode::NotLetter,
        b's' if ctx.match_newline => OpCode::SpaceNl,
        b's' => OpCode::Space,
        b'S' if ctx.match_newline => OpCode::NotSpaceNl,
        b'S' => OpCode::NotSpace,
        b'w' => OpCode::WordChar,
        b'W' => OpCode::NotWordChar,
        b'y' => OpCode::IsDelim,
        b'Y' => OpCode::NotDelim,
        _ => OpCode::NotBoundary,
    };
    emit_node(ctx, op)
}

/// `\1` through `\9` at the cursor. With `emit` set the reference node is
/// produced and the cursor moves past the digit; otherwise this only
/// reports whether one is present. A reference to a group that has not
/// been closed yet is an error either way.
fn back_reference(ctx: &mut ParseContext, emit: bool) -> RegexResult<Option<Parsed>> {
    let c = ctx.peek();
    if ctx.at_end() || !(b'1'..=b'9').contains(&c) {
        return Ok(None);
    }
    let paren_no = (c - b'0') as usize;
    if !ctx.is_paren_closed(paren_no) {
        return Err(ctx.syntax_error(format!("\\{} is an illegal back reference", paren_no)));
    }
    if !emit {
        return Ok(Some(Parsed {
            node: 0,
            flags: WORST,
            range: LenRange::UNBOUNDED,
        }));
    }

    let op = if ctx.case_insensitive {
        OpCode::BackRefCi
    } else {
        OpCode::BackRef
    };
    let node = emit_group(ctx, op, paren_no);
    ctx.pos += 1;

    let flags = if ctx.paren_has_width(paren_no) {
        HAS_WIDTH
    } else {
        WORST
    };
    Ok(Some(Parsed {
        node,
        flags,
        range: LenRange::UNBOUNDED,
    }))
}

/// Run of ordinary characters and literal escapes in one EXACTLY (or
/// SIMILAR) node. If a quantifier follows, the last character is given
/// back so the quantifier applies to it alone.
fn literal_run(ctx: &mut ParseContext) -> RegexResult<Parsed> {
    let case_insensitive = ctx.case_insensitive;
    let op = if case_insensitive {
        OpCode::Similar
    } else {
        OpCode::Exactly
    };
    let node = emit_node(ctx, op);
    let fold = |c: u8| {
        if case_insensitive {
            c.to_ascii_lowercase()
        } else {
            c
        }
    };

    let mut len = 0usize;
    while !ctx.at_end() && !ctx.is_meta(ctx.peek()) {
        let parse_save = ctx.pos;

        if ctx.peek() == b'\\' {
            ctx.pos += 1;
            match numeric_escape(ctx.pattern, ctx.pos) {
                NumericEscape::Value { value, last } => {
                    emit_byte(ctx, fold(value));
                    ctx.pos = last;
                }
                NumericEscape::Zero => return Err(zero_escape_error(ctx)),
                NumericEscape::NotNumeric if ctx.at_end() => {
                    return Err(trailing_backslash_error(ctx));
                }
                NumericEscape::NotNumeric => {
                    let e = ctx.peek();
                    if let Some(value) = literal_escape(e) {
                        emit_byte(ctx, value);
                    } else if back_reference(ctx, false)?.is_some()
                        || (!ctx.at_end() && is_shortcut_escape(e, false))
                    {
                        // Leave the escape for the next atom
                        ctx.pos -= 1;
                        break;
                    } else {
                        return Err(ctx.syntax_error(format!(
                            "\\{} is an invalid escape sequence",
                            e as char
                        )));
                    }
                }
            }
            ctx.pos += 1;
        } else {
            let c = ctx.peek();
            emit_byte(ctx, fold(c));
            ctx.pos += 1;
        }

        if !ctx.at_end() && ctx.is_quantifier(ctx.peek()) && len > 0 {
            ctx.pos = parse_save;
            retract_byte(ctx);
            break;
        }

        len += 1;
    }

    if len == 0 {
        return Err(ctx.syntax_error("internal error #4, 'atom'"));
    }

    let mut flags = HAS_WIDTH;
    if len == 1 {
        flags |= SIMPLE;
    }

    Ok(Parsed {
        node,
        flags,
        range: LenRange::fixed(len as i64),
    })
}
