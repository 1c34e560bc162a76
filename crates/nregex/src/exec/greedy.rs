// Fast path for repeating a single-character node
use super::exec_context::{reg_error, ExecContext};
use crate::classes::{is_digit, is_letter, is_space, is_word_char, DelimiterTable};
use crate::program::{Node, OpCode, Operand};

/// Does `node` accept `c`? `None` for nodes that are not single-character
/// tests. For EXACTLY and SIMILAR only the first operand byte counts,
/// which is all a simple literal has.
pub fn single_char_matches(node: &Node, c: u8, delimiters: &DelimiterTable) -> Option<bool> {
    let matched = match node.op {
        OpCode::Any => c != b'\n',
        OpCode::Every => true,
        OpCode::Exactly => node.first_literal_byte() == Some(c),
        OpCode::Similar => node.first_literal_byte() == Some(c.to_ascii_lowercase()),
        OpCode::AnyOf | OpCode::AnyBut => {
            let Operand::Set(set) = &node.operand else {
                return None;
            };
            set.contains(c) == (node.op == OpCode::AnyOf)
        }
        OpCode::IsDelim => delimiters.is_delimiter(c),
        OpCode::NotDelim => !delimiters.is_delimiter(c),
        OpCode::WordChar => is_word_char(c),
        OpCode::NotWordChar => !is_word_char(c) && c != b'\n',
        OpCode::Digit => is_digit(c),
        OpCode::NotDigit => !is_digit(c) && c != b'\n',
        OpCode::Letter => is_letter(c),
        OpCode::NotLetter => !is_letter(c) && c != b'\n',
        OpCode::Space => is_space(c) && c != b'\n',
        OpCode::SpaceNl => is_space(c),
        OpCode::NotSpace => !is_space(c),
        OpCode::NotSpaceNl => !is_space(c) || c == b'\n',
        _ => return None,
    };
    Some(matched)
}

impl ExecContext<'_> {
    /// Match the simple node at `node_index` up to `max` times starting at
    /// the cursor. Leaves the cursor after the last matched character and
    /// returns the count.
    pub fn greedy(&mut self, node_index: usize, max: usize) -> usize {
        let program = self.program;
        let Some(node) = program.nodes().get(node_index) else {
            reg_error("internal error 'greedy'");
            return 0;
        };

        let mut count = 0;
        let mut input = self.input;
        while count < max && !self.at_end(input) {
            let Some(&c) = self.text.get(input) else {
                break;
            };
            match single_char_matches(node, c, &self.delimiters) {
                Some(true) => {}
                Some(false) => break,
                None => {
                    reg_error("internal error 'greedy'");
                    return 0;
                }
            }
            count += 1;
            input += 1;
        }

        self.input = input;
        count
    }
}
