mod opcode;
mod serializer;

pub use opcode::OpCode;

use crate::classes::ByteSet;
use crate::regex_limits::MAGIC;

/// Typed operand carried by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    None,
    /// EXACTLY / SIMILAR text. SIMILAR text is stored lowercase.
    Literal(Vec<u8>),
    /// ANY_OF / ANY_BUT members.
    Set(ByteSet),
    /// BRACE / LAZY_BRACE bounds; `max == 0` means unbounded.
    Range { min: u16, max: u16 },
    /// INIT_COUNT / INC_COUNT counter slot.
    Counter(u8),
    /// TEST_COUNT counter slot and the bound it is tested against.
    Test { index: u8, limit: u16 },
    /// Look-behind body length range.
    Bounds { lower: u16, upper: u16 },
    /// OPEN / CLOSE / BACK_REF / BACK_REF_CI group number.
    Group(u8),
}

/// One program instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Node {
    pub op: OpCode,
    /// Distance in nodes to the successor; zero ends the chain.
    /// Measured backward for `OpCode::Back`.
    pub next: u16,
    pub operand: Operand,
}

impl Node {
    pub fn new(op: OpCode, operand: Operand) -> Self {
        Node {
            op,
            next: 0,
            operand,
        }
    }

    /// First byte of an EXACTLY/SIMILAR operand.
    #[inline]
    pub fn first_literal_byte(&self) -> Option<u8> {
        match &self.operand {
            Operand::Literal(text) => text.first().copied(),
            _ => None,
        }
    }
}

/// A compiled node program.
///
/// The program is immutable once the compiler hands it over; the only
/// mutable matching state lives in the per-call execute context.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Program {
    pub(crate) magic: u8,
    pub(crate) num_groups: u8,
    pub(crate) num_counters: u8,
    pub(crate) nodes: Vec<Node>,
}

impl Program {
    pub(crate) fn new(nodes: Vec<Node>, num_groups: u8, num_counters: u8) -> Self {
        Program {
            magic: MAGIC,
            num_groups,
            num_counters,
            nodes,
        }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Capturing groups, not counting the implicit whole-match group 0.
    pub fn num_groups(&self) -> usize {
        self.num_groups as usize
    }

    pub fn num_counters(&self) -> usize {
        self.num_counters as usize
    }

    /// Resolve a node's successor link.
    #[inline]
    pub fn next(&self, index: usize) -> Option<usize> {
        next_index(&self.nodes, index)
    }
}

/// Shared by the compiler (while the program is still being built) and the
/// matcher.
#[inline]
pub(crate) fn next_index(nodes: &[Node], index: usize) -> Option<usize> {
    let node = nodes.get(index)?;
    if node.next == 0 {
        return None;
    }
    let offset = node.next as usize;
    if node.op == OpCode::Back {
        index.checked_sub(offset)
    } else {
        Some(index + offset)
    }
}
