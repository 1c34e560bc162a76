// Node emission and link patching
//
// Every primitive works in both passes. While sizing, emission only counts
// nodes and patching is skipped; the indices returned are placeholders.
use crate::compiler::parse_context::ParseContext;
use crate::program::{next_index, Node, OpCode, Operand};

fn initial_operand(op: OpCode) -> Operand {
    match op {
        OpCode::Exactly | OpCode::Similar => Operand::Literal(Vec::new()),
        OpCode::AnyOf | OpCode::AnyBut => Operand::Set(Default::default()),
        _ => Operand::None,
    }
}

// Append a node with an empty operand; returns its index
pub fn emit_node(ctx: &mut ParseContext, op: OpCode) -> usize {
    emit_with_operand(ctx, op, initial_operand(op))
}

pub fn emit_with_operand(ctx: &mut ParseContext, op: OpCode, operand: Operand) -> usize {
    if ctx.sizing {
        let index = ctx.reg_size;
        ctx.reg_size += 1;
        return index;
    }
    let index = ctx.code.len();
    ctx.code.push(Node::new(op, operand));
    index
}

// OPEN / CLOSE / BACK_REF nodes
pub fn emit_group(ctx: &mut ParseContext, op: OpCode, group: usize) -> usize {
    emit_with_operand(ctx, op, Operand::Group(group as u8))
}

// Counter and look-behind nodes carry a value and/or a counter slot
pub fn emit_special(ctx: &mut ParseContext, op: OpCode, test_val: u32, index: usize) -> usize {
    let operand = match op {
        OpCode::IncCount | OpCode::InitCount => Operand::Counter(index as u8),
        OpCode::TestCount => Operand::Test {
            index: index as u8,
            limit: test_val as u16,
        },
        OpCode::PosBehindOpen | OpCode::NegBehindOpen => Operand::Bounds {
            lower: test_val as u16,
            upper: test_val as u16,
        },
        _ => Operand::None,
    };
    emit_with_operand(ctx, op, operand)
}

// Append a byte to the operand of the most recently emitted node
pub fn emit_byte(ctx: &mut ParseContext, c: u8) {
    if ctx.sizing {
        return;
    }
    match ctx.code.last_mut().map(|node| &mut node.operand) {
        Some(Operand::Literal(text)) => text.push(c),
        Some(Operand::Set(set)) => set.insert(c),
        _ => log::error!("emit_byte: last node has no byte operand"),
    }
}

// Class member; both cases when matching case-insensitively
pub fn emit_class_byte(ctx: &mut ParseContext, c: u8) {
    if ctx.case_insensitive && c.is_ascii_alphabetic() {
        emit_byte(ctx, c.to_ascii_lowercase());
        emit_byte(ctx, c.to_ascii_uppercase());
    } else {
        emit_byte(ctx, c);
    }
}

// Take back the last literal byte when a quantifier turns out to bind to it
pub fn retract_byte(ctx: &mut ParseContext) {
    if ctx.sizing {
        return;
    }
    if let Some(Operand::Literal(text)) = ctx.code.last_mut().map(|node| &mut node.operand) {
        text.pop();
    }
}

/// Insert a node in front of `at`, shifting everything after it by one.
/// Links are relative, so the shifted region stays internally consistent.
/// Returns the index just past the inserted node.
pub fn insert(ctx: &mut ParseContext, op: OpCode, at: usize, min: u32, max: u32, index: usize) -> usize {
    if ctx.sizing {
        ctx.reg_size += 1;
        return at + 1;
    }
    let operand = match op {
        OpCode::Brace | OpCode::LazyBrace => Operand::Range {
            min: min as u16,
            max: max as u16,
        },
        OpCode::InitCount => Operand::Counter(index as u8),
        _ => Operand::None,
    };
    ctx.code.insert(at, Node::new(op, operand));
    at + 1
}

/// Point the last node of the chain starting at `from` to `to`.
pub fn tail(ctx: &mut ParseContext, from: usize, to: usize) {
    if ctx.sizing {
        return;
    }
    let mut scan = from;
    while let Some(next) = next_index(&ctx.code, scan) {
        scan = next;
    }
    let Some(node) = ctx.code.get_mut(scan) else {
        return;
    };
    node.next = scan.abs_diff(to) as u16;
}

// tail() starting `offset` nodes away from `node`
pub fn offset_tail(ctx: &mut ParseContext, node: usize, offset: isize, to: usize) {
    if ctx.sizing {
        return;
    }
    tail(ctx, node.wrapping_add_signed(offset), to);
}

/// Like `offset_tail`, but only when `node` is a BRANCH; the operand of
/// a branch is the node right after it.
pub fn branch_tail(ctx: &mut ParseContext, node: usize, offset: usize, to: usize) {
    if ctx.sizing {
        return;
    }
    if ctx.code.get(node).map(|n| n.op) != Some(OpCode::Branch) {
        return;
    }
    tail(ctx, node + offset, to);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::CompileFlags;

    fn emit_context(pattern: &[u8]) -> ParseContext<'_> {
        ParseContext::new(pattern, &CompileFlags::default(), Some(0))
    }

    #[test]
    fn test_sizing_only_counts() {
        let flags = CompileFlags::default();
        let mut ctx = ParseContext::new(b"", &flags, None);
        assert_eq!(emit_node(&mut ctx, OpCode::Branch), 0);
        assert_eq!(emit_node(&mut ctx, OpCode::Exactly), 1);
        emit_byte(&mut ctx, b'a');
        insert(&mut ctx, OpCode::Star, 1, 0, 0, 0);
        assert_eq!(ctx.reg_size, 3);
        assert!(ctx.code.is_empty());
    }

    #[test]
    fn test_tail_forward_and_back() {
        let mut ctx = emit_context(b"");
        let first = emit_node(&mut ctx, OpCode::Branch);
        let second = emit_node(&mut ctx, OpCode::Nothing);
        let back = emit_node(&mut ctx, OpCode::Back);
        tail(&mut ctx, first, second);
        tail(&mut ctx, back, first);
        assert_eq!(ctx.code[first].next, 1);
        assert_eq!(ctx.code[back].next, 2);
        assert_eq!(next_index(&ctx.code, back), Some(first));

        // tail walks to the end of the chain
        let end = emit_node(&mut ctx, OpCode::End);
        tail(&mut ctx, first, end);
        assert_eq!(ctx.code[second].next, 2);
    }

    #[test]
    fn test_insert_shifts_and_preserves_links() {
        let mut ctx = emit_context(b"");
        let atom = emit_node(&mut ctx, OpCode::Exactly);
        emit_byte(&mut ctx, b'x');
        let end = emit_node(&mut ctx, OpCode::Nothing);
        tail(&mut ctx, atom, end);
        let after = insert(&mut ctx, OpCode::Brace, atom, 2, 3, 0);
        assert_eq!(after, 1);
        assert_eq!(ctx.code[0].op, OpCode::Brace);
        assert_eq!(ctx.code[0].operand, Operand::Range { min: 2, max: 3 });
        assert_eq!(next_index(&ctx.code, 1), Some(2));
    }

    #[test]
    fn test_class_byte_case_folding() {
        let flags = CompileFlags {
            case_insensitive: true,
            ..CompileFlags::default()
        };
        let mut ctx = ParseContext::new(b"", &flags, Some(1));
        emit_node(&mut ctx, OpCode::AnyOf);
        emit_class_byte(&mut ctx, b'q');
        emit_class_byte(&mut ctx, b'7');
        let Operand::Set(set) = &ctx.code[0].operand else {
            panic!("expected a set operand");
        };
        assert!(set.contains(b'q') && set.contains(b'Q') && set.contains(b'7'));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_branch_tail_ignores_non_branch() {
        let mut ctx = emit_context(b"");
        let open = emit_group(&mut ctx, OpCode::Open, 1);
        let body = emit_node(&mut ctx, OpCode::Nothing);
        branch_tail(&mut ctx, open, 1, body);
        assert_eq!(ctx.code[body].next, 0);
        assert_eq!(ctx.code[open].next, 0);
    }
}
