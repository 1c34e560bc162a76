// Program serializer/deserializer
//
// Layout: byte 0 = MAGIC, byte 1 = group count, byte 2 = counter count,
// then the node stream. Each node is its opcode byte, a 2-byte big-endian
// next delta, and an operand whose shape is fixed by the opcode.

use super::{Node, OpCode, Operand, Program};
use crate::classes::ByteSet;
use crate::regex_error::{RegexError, RegexResult};
use crate::regex_limits::{MAGIC, MAX_PROGRAM_NODES, PROGRAM_HEADER_SIZE};
use std::io::{Cursor, Read};

impl Program {
    /// Flatten the program into its byte layout.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(PROGRAM_HEADER_SIZE + self.nodes.len() * 4);
        buf.push(self.magic);
        buf.push(self.num_groups);
        buf.push(self.num_counters);

        for node in &self.nodes {
            buf.push(node.op as u8);
            buf.extend_from_slice(&node.next.to_be_bytes());
            write_operand(&mut buf, &node.operand);
        }

        buf
    }

    /// Rebuild a program from `to_bytes` output, validating every node.
    pub fn from_bytes(data: &[u8]) -> RegexResult<Program> {
        let mut cursor = Cursor::new(data);

        let mut header = [0u8; PROGRAM_HEADER_SIZE];
        cursor
            .read_exact(&mut header)
            .map_err(|_| RegexError::program("truncated program header"))?;
        if header[0] != MAGIC {
            return Err(RegexError::program("not a compiled regular expression"));
        }
        let num_groups = header[1];
        let num_counters = header[2];

        let mut nodes = Vec::new();
        while (cursor.position() as usize) < data.len() {
            if nodes.len() >= MAX_PROGRAM_NODES {
                return Err(RegexError::program("program has too many nodes"));
            }
            let op_byte = read_u8(&mut cursor)?;
            let op = OpCode::from_u8(op_byte)
                .ok_or_else(|| RegexError::program(format!("unknown opcode {}", op_byte)))?;
            let next = read_u16(&mut cursor)?;
            let operand = read_operand(&mut cursor, op)?;
            check_operand(&operand, num_groups, num_counters)?;
            nodes.push(Node { op, next, operand });
        }

        let program = Program {
            magic: MAGIC,
            num_groups,
            num_counters,
            nodes,
        };
        check_links(&program)?;
        Ok(program)
    }
}

fn write_operand(buf: &mut Vec<u8>, operand: &Operand) {
    match operand {
        Operand::None => {}
        Operand::Literal(text) => {
            buf.extend_from_slice(&(text.len() as u32).to_be_bytes());
            buf.extend_from_slice(text);
        }
        Operand::Set(set) => {
            for word in set.words() {
                buf.extend_from_slice(&word.to_be_bytes());
            }
        }
        Operand::Range { min, max } => {
            buf.extend_from_slice(&min.to_be_bytes());
            buf.extend_from_slice(&max.to_be_bytes());
        }
        Operand::Counter(index) | Operand::Group(index) => buf.push(*index),
        Operand::Test { index, limit } => {
            buf.push(*index);
            buf.extend_from_slice(&limit.to_be_bytes());
        }
        Operand::Bounds { lower, upper } => {
            buf.extend_from_slice(&lower.to_be_bytes());
            buf.extend_from_slice(&upper.to_be_bytes());
        }
    }
}

fn read_operand(cursor: &mut Cursor<&[u8]>, op: OpCode) -> RegexResult<Operand> {
    let operand = match op {
        OpCode::Exactly | OpCode::Similar => {
            let len = read_u32(cursor)? as usize;
            let remaining = cursor.get_ref().len() - cursor.position() as usize;
            if len == 0 || len > remaining {
                return Err(RegexError::program("bad literal length"));
            }
            let mut text = vec![0u8; len];
            cursor
                .read_exact(&mut text)
                .map_err(|_| RegexError::program("truncated literal"))?;
            Operand::Literal(text)
        }
        OpCode::AnyOf | OpCode::AnyBut => {
            let mut words = [0u64; 4];
            for word in words.iter_mut() {
                let mut raw = [0u8; 8];
                cursor
                    .read_exact(&mut raw)
                    .map_err(|_| RegexError::program("truncated character set"))?;
                *word = u64::from_be_bytes(raw);
            }
            Operand::Set(ByteSet::from_words(words))
        }
        OpCode::Brace | OpCode::LazyBrace => Operand::Range {
            min: read_u16(cursor)?,
            max: read_u16(cursor)?,
        },
        OpCode::InitCount | OpCode::IncCount => Operand::Counter(read_u8(cursor)?),
        OpCode::TestCount => Operand::Test {
            index: read_u8(cursor)?,
            limit: read_u16(cursor)?,
        },
        OpCode::PosBehindOpen | OpCode::NegBehindOpen => Operand::Bounds {
            lower: read_u16(cursor)?,
            upper: read_u16(cursor)?,
        },
        OpCode::Open | OpCode::Close | OpCode::BackRef | OpCode::BackRefCi => {
            Operand::Group(read_u8(cursor)?)
        }
        _ => Operand::None,
    };
    Ok(operand)
}

fn check_operand(operand: &Operand, num_groups: u8, num_counters: u8) -> RegexResult<()> {
    match *operand {
        Operand::Counter(index) | Operand::Test { index, .. } if index >= num_counters => Err(
            RegexError::program(format!("counter index {} out of range", index)),
        ),
        Operand::Group(n) if n == 0 || n > num_groups => Err(RegexError::program(format!(
            "group number {} out of range",
            n
        ))),
        Operand::Bounds { lower, upper } if lower > upper => {
            Err(RegexError::program("look-behind bounds are reversed"))
        }
        _ => Ok(()),
    }
}

fn check_links(program: &Program) -> RegexResult<()> {
    let count = program.nodes.len();
    if count == 0 {
        return Err(RegexError::program("empty program"));
    }
    for (index, node) in program.nodes.iter().enumerate() {
        let target_ok = match (node.next, node.op) {
            (0, _) => true,
            (offset, OpCode::Back) => (offset as usize) <= index,
            (offset, _) => index + (offset as usize) < count,
        };
        if !target_ok {
            return Err(RegexError::program(format!(
                "node {} links outside the program",
                index
            )));
        }
    }
    Ok(())
}

fn read_u8(cursor: &mut Cursor<&[u8]>) -> RegexResult<u8> {
    let mut buf = [0u8; 1];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| RegexError::program("unexpected end of program"))?;
    Ok(buf[0])
}

fn read_u16(cursor: &mut Cursor<&[u8]>) -> RegexResult<u16> {
    let mut buf = [0u8; 2];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| RegexError::program("unexpected end of program"))?;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32(cursor: &mut Cursor<&[u8]>) -> RegexResult<u32> {
    let mut buf = [0u8; 4];
    cursor
        .read_exact(&mut buf)
        .map_err(|_| RegexError::program("unexpected end of program"))?;
    Ok(u32::from_be_bytes(buf))
}
