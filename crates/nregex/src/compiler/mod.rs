// Pattern compiler
//
// Compilation runs the parser twice over the pattern. The first pass only
// counts nodes; the second emits them into a vector sized from that count.
// Links between nodes are relative node-index deltas.
pub mod code;
pub mod escape;
pub mod parse_context;
pub mod parser;

use crate::program::{OpCode, Program};
use crate::regex_error::{RegexError, RegexResult};
use crate::regex_limits::{MAX_CAPTURE_GROUPS, MAX_GROUP_NUMBER, MAX_PROGRAM_NODES};
use parse_context::ParseContext;
use parser::ParenKind;

/// Options that shape how a pattern is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompileFlags {
    /// Start in `(?i)` mode.
    pub case_insensitive: bool,
    /// Start in `(?n)` mode: `.`, `[^...]` and `\s` may match newline.
    pub match_newline: bool,
    /// Recognise `{m,n}`. When off, `{` is an ordinary character.
    pub counting_quantifier: bool,
    /// Capturing groups allowed in one pattern; values above 255 are
    /// treated as 255.
    pub max_groups: usize,
}

impl Default for CompileFlags {
    fn default() -> Self {
        CompileFlags {
            case_insensitive: false,
            match_newline: false,
            counting_quantifier: true,
            max_groups: MAX_CAPTURE_GROUPS,
        }
    }
}

impl CompileFlags {
    pub fn case_insensitive() -> Self {
        CompileFlags {
            case_insensitive: true,
            ..Default::default()
        }
    }

    pub(crate) fn effective_max_groups(&self) -> usize {
        self.max_groups.min(MAX_GROUP_NUMBER)
    }
}

/// A program plus the search hints derived from it.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub program: Program,
    pub match_start: Option<u8>,
    pub anchor: bool,
}

pub fn compile(pattern: &[u8], flags: &CompileFlags) -> RegexResult<Compiled> {
    // Pass 1: size
    let mut sizing = ParseContext::new(pattern, flags, None);
    parser::chunk(&mut sizing, ParenKind::NoParen)?;
    let size = sizing.reg_size;
    if size >= MAX_PROGRAM_NODES {
        return Err(RegexError::limit("regexp > 32767 nodes", pattern.len()));
    }

    // Pass 2: emit
    let mut ctx = ParseContext::new(pattern, flags, Some(size));
    parser::chunk(&mut ctx, ParenKind::NoParen)?;
    debug_assert_eq!(ctx.code.len(), size);

    let num_groups = (ctx.total_paren - 1) as u8;
    let num_counters = ctx.num_braces as u8;
    let program = Program::new(std::mem::take(&mut ctx.code), num_groups, num_counters);

    let (match_start, anchor) = start_hints(&program);
    log::trace!(
        "compiled {} nodes, {} groups, {} counters",
        program.nodes().len(),
        num_groups,
        num_counters
    );

    Ok(Compiled {
        program,
        match_start,
        anchor,
    })
}

/// Search hints from the first node of a single-alternative program:
/// a required first character, or an anchor to line starts.
pub fn start_hints(program: &Program) -> (Option<u8>, bool) {
    let nodes = program.nodes();
    let single_branch = program
        .next(0)
        .and_then(|n| nodes.get(n))
        .is_some_and(|node| node.op == OpCode::End);
    if !single_branch {
        return (None, false);
    }

    let Some(first) = nodes.get(1) else {
        return (None, false);
    };
    match first.op {
        OpCode::Exactly => (first.first_literal_byte(), false),
        OpCode::Plus | OpCode::LazyPlus => match nodes.get(2) {
            Some(operand) if operand.op == OpCode::Exactly => {
                (operand.first_literal_byte(), false)
            }
            _ => (None, false),
        },
        OpCode::Bol => (None, true),
        _ => (None, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizing_matches_emission() {
        for pattern in ["a(b|c)+d", "(ab){2,5}?x", "[^a-z\\d]+", "(?<=\\d{1,3})px", "(?i)x|y|z"] {
            let compiled = compile(pattern.as_bytes(), &CompileFlags::default())
                .unwrap_or_else(|e| panic!("{}: {}", pattern, e));
            assert!(compiled.program.is_valid());
            assert_eq!(compiled.program.nodes().last().map(|n| n.op), Some(OpCode::End));
        }
    }

    #[test]
    fn test_match_start_hint() {
        let compiled = compile(b"abc", &CompileFlags::default()).unwrap();
        assert_eq!(compiled.match_start, Some(b'a'));
        assert!(!compiled.anchor);

        let compiled = compile(b"x+y", &CompileFlags::default()).unwrap();
        assert_eq!(compiled.match_start, Some(b'x'));

        let compiled = compile(b"a|b", &CompileFlags::default()).unwrap();
        assert_eq!(compiled.match_start, None);
    }

    #[test]
    fn test_anchor_hint() {
        let compiled = compile(b"^foo", &CompileFlags::default()).unwrap();
        assert!(compiled.anchor);
        assert_eq!(compiled.match_start, None);
    }

    #[test]
    fn test_group_limit_is_configurable() {
        let flags = CompileFlags {
            max_groups: 2,
            ..CompileFlags::default()
        };
        assert!(compile(b"(a)(b)", &flags).is_ok());
        let err = compile(b"(a)(b)(c)", &flags).unwrap_err();
        assert_eq!(err.message, "number of ()'s > 2");
    }
}
