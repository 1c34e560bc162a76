// Recursive backtracking matcher
//
// Ordinary nodes are walked in a loop; recursion happens only where the
// rest of the match has to be tried before committing: alternatives,
// repetition back-off, look-around bodies and group boundaries.
use super::exec_context::{reg_error, ExecContext};
use super::greedy::single_char_matches;
use crate::program::{next_index, Node, OpCode, Operand};

impl ExecContext<'_> {
    /// Match from node `start` to the end of the program (or of the
    /// enclosing look-around body). `branch_index` receives the index of
    /// the alternative that matched at the first multi-way branch.
    pub fn match_node(&mut self, start: usize, branch_index: Option<&mut usize>) -> bool {
        self.recursion_count += 1;
        let matched = if self.recursion_count > self.recursion_limit {
            if !self.recursion_limit_exceeded {
                log::warn!("recursion limit exceeded, please respecify expression");
            }
            self.recursion_limit_exceeded = true;
            false
        } else {
            self.match_body(start, branch_index)
        };
        self.recursion_count -= 1;
        matched
    }

    fn match_next(&mut self, next: Option<usize>) -> bool {
        match next {
            Some(index) => self.match_node(index, None),
            None => {
                reg_error("corrupted pointers, 'match'");
                false
            }
        }
    }

    fn match_body(&mut self, start: usize, mut branch_index: Option<&mut usize>) -> bool {
        let program = self.program;
        let nodes = program.nodes();
        let mut scan = Some(start);

        while let Some(cur) = scan {
            let Some(node) = nodes.get(cur) else {
                break;
            };
            let mut next = next_index(nodes, cur);

            match node.op {
                OpCode::Branch => {
                    if next.and_then(|n| nodes.get(n)).map(|n| n.op) != Some(OpCode::Branch) {
                        // No choice
                        next = Some(cur + 1);
                    } else {
                        let mut index = 0;
                        let mut alternative = Some(cur);
                        while let Some(b) = alternative.filter(|&b| is_branch(nodes, b)) {
                            let save = self.input;
                            if self.match_node(b + 1, None) {
                                if let Some(slot) = branch_index.as_deref_mut() {
                                    *slot = index;
                                }
                                return true;
                            }
                            if self.recursion_limit_exceeded {
                                return false;
                            }
                            index += 1;
                            self.input = save;
                            alternative = next_index(nodes, b);
                        }
                        return false;
                    }
                }

                OpCode::Exactly => {
                    let Operand::Literal(literal) = &node.operand else {
                        return corrupted();
                    };
                    if self.text.get(self.input) != literal.first() {
                        return false;
                    }
                    let end = self.input + literal.len();
                    if end > self.end_of_string || self.text[self.input..end] != literal[..] {
                        return false;
                    }
                    self.input = end;
                }

                OpCode::Similar => {
                    // Operand was lowercased at compile time
                    let Operand::Literal(literal) = &node.operand else {
                        return corrupted();
                    };
                    for &expected in literal {
                        match self.current() {
                            Some(c) if c.to_ascii_lowercase() == expected => self.input += 1,
                            _ => return false,
                        }
                    }
                }

                OpCode::Bol => {
                    if !self.at_line_start() {
                        return false;
                    }
                }

                OpCode::Eol => {
                    if !self.at_line_end() {
                        return false;
                    }
                }

                OpCode::BoWord => {
                    if !(self.delim_before() && !self.delim_at()) {
                        return false;
                    }
                }

                OpCode::EoWord => {
                    if !(!self.delim_before() && self.delim_at()) {
                        return false;
                    }
                }

                OpCode::NotBoundary => {
                    if self.delim_before() != self.delim_at() {
                        return false;
                    }
                }

                op if op.is_single_char() => {
                    let accepted = self
                        .current()
                        .and_then(|c| single_char_matches(node, c, &self.delimiters));
                    match accepted {
                        Some(true) => self.input += 1,
                        Some(false) | None => return false,
                    }
                }

                OpCode::Nothing | OpCode::Back => {}

                op if op.is_quantifier() => {
                    return self.match_repeat(cur, node, next);
                }

                OpCode::End => {
                    if self.extent_fw.is_none_or(|fw| self.input > fw) {
                        self.extent_fw = Some(self.input);
                    }
                    return true;
                }

                OpCode::InitCount | OpCode::IncCount => {
                    let Operand::Counter(index) = node.operand else {
                        return corrupted();
                    };
                    let Some(count) = self.brace_counts.get_mut(index as usize) else {
                        return corrupted();
                    };
                    if node.op == OpCode::InitCount {
                        *count = 0;
                    } else {
                        *count += 1;
                    }
                }

                OpCode::TestCount => {
                    let Operand::Test { index, limit } = node.operand else {
                        return corrupted();
                    };
                    let Some(&count) = self.brace_counts.get(index as usize) else {
                        return corrupted();
                    };
                    // Below the limit: loop again through the physical successor
                    if count < limit as u32 {
                        next = Some(cur + 1);
                    }
                }

                OpCode::BackRef | OpCode::BackRefCi => {
                    let Operand::Group(n) = node.operand else {
                        return corrupted();
                    };
                    if !self.match_back_reference(n as usize, node.op == OpCode::BackRefCi) {
                        return false;
                    }
                }

                OpCode::PosAheadOpen | OpCode::NegAheadOpen => {
                    let save = self.input;
                    let saved_end = self.end_of_string;

                    // Look-ahead may run past the logical end
                    self.end_of_string = self.text.len();
                    let answer = self.match_next(next);
                    let consumed_to = self.input;
                    self.input = save;
                    self.end_of_string = saved_end;

                    if self.recursion_limit_exceeded {
                        return false;
                    }
                    if answer != (node.op == OpCode::PosAheadOpen) {
                        return false;
                    }
                    if self.extent_fw.is_none_or(|fw| consumed_to > fw) {
                        self.extent_fw = Some(consumed_to);
                    }
                    next = skip_look_around(nodes, cur);
                }

                OpCode::PosBehindOpen | OpCode::NegBehindOpen => {
                    let Operand::Bounds { lower, upper } = node.operand else {
                        return corrupted();
                    };
                    let found = self.match_look_behind(next, lower as usize, upper as usize);
                    if self.recursion_limit_exceeded {
                        return false;
                    }
                    if found != (node.op == OpCode::PosBehindOpen) {
                        return false;
                    }
                    next = skip_look_around(nodes, cur);
                }

                OpCode::LookAheadClose | OpCode::LookBehindClose => return true,

                OpCode::Open | OpCode::Close => {
                    let Operand::Group(n) = node.operand else {
                        return corrupted();
                    };
                    return self.match_group_boundary(n as usize, node.op == OpCode::Open, next);
                }

                _ => return corrupted(),
            }

            scan = next;
        }

        reg_error("corrupted pointers, 'match'");
        false
    }

    /// STAR, PLUS, QUESTION, BRACE and their lazy forms around a simple
    /// operand at `cur + 1`.
    fn match_repeat(&mut self, cur: usize, node: &Node, next: Option<usize>) -> bool {
        let program = self.program;
        let nodes = program.nodes();

        // Skip attempts that cannot work when the next character is known
        let next_char = next
            .and_then(|n| nodes.get(n))
            .filter(|n| n.op == OpCode::Exactly)
            .and_then(Node::first_literal_byte);

        let lazy = matches!(
            node.op,
            OpCode::LazyStar | OpCode::LazyPlus | OpCode::LazyQuestion | OpCode::LazyBrace
        );
        let (min, max) = match (node.op, &node.operand) {
            (OpCode::Star | OpCode::LazyStar, _) => (0, usize::MAX),
            (OpCode::Plus | OpCode::LazyPlus, _) => (1, usize::MAX),
            (OpCode::Question | OpCode::LazyQuestion, _) => (0, 1),
            (_, Operand::Range { min, max }) => {
                let max = if *max == 0 { usize::MAX } else { *max as usize };
                (*min as usize, max)
            }
            _ => return corrupted(),
        };
        let operand = cur + 1;

        let save = self.input;
        let mut num_matched = if !lazy {
            self.greedy(operand, max)
        } else if min > 0 {
            self.greedy(operand, min)
        } else {
            0
        };

        while min <= num_matched && num_matched <= max {
            if next_char.is_none_or(|c| self.text.get(self.input) == Some(&c)) {
                if self.match_next(next) {
                    return true;
                }
                if self.recursion_limit_exceeded {
                    return false;
                }
            }

            if lazy {
                // Inch forward from where the last count ended
                self.input = save + num_matched;
                if self.greedy(operand, 1) == 0 {
                    return false;
                }
                num_matched += 1;
            } else if num_matched > 0 {
                num_matched -= 1;
            } else {
                break;
            }
            self.input = save + num_matched;
        }

        false
    }

    fn match_back_reference(&mut self, n: usize, case_insensitive: bool) -> bool {
        let captured = self.back_ref_start.get(n).copied().flatten();
        let finish = self.back_ref_end.get(n).copied().flatten();
        let (Some(captured), Some(finish)) = (captured, finish) else {
            return false;
        };
        if captured > finish {
            return false;
        }

        for i in captured..finish {
            let Some(c) = self.current() else {
                return false;
            };
            let expected = self.text[i];
            let same = if case_insensitive {
                c.eq_ignore_ascii_case(&expected)
            } else {
                c == expected
            };
            if !same {
                return false;
            }
            self.input += 1;
        }
        true
    }

    /// Try body lengths from `lower` to `upper`, shortest first. The body
    /// must end exactly at the current position.
    fn match_look_behind(&mut self, body: Option<usize>, lower: usize, upper: usize) -> bool {
        let save = self.input;
        let saved_end = self.end_of_string;

        // Keep greedy parts of the body from running past the cursor
        self.end_of_string = self.input;

        let mut found = false;
        for offset in lower..=upper {
            let Some(from) = save.checked_sub(offset) else {
                break;
            };
            if from < self.look_behind_to {
                break;
            }
            self.input = from;
            let answer = self.match_next(body);
            if self.recursion_limit_exceeded {
                break;
            }
            if answer && self.input == save {
                found = true;
                if self.extent_bw.is_none_or(|bw| bw > from) {
                    self.extent_bw = Some(from);
                }
                break;
            }
        }

        self.input = save;
        self.end_of_string = saved_end;
        found
    }

    fn match_group_boundary(&mut self, n: usize, open: bool, next: Option<usize>) -> bool {
        let save = self.input;

        if open {
            if let Some(slot) = self.back_ref_start.get_mut(n) {
                *slot = Some(save);
                self.back_ref_end[n] = None;
            }
        } else if let Some(slot) = self.back_ref_end.get_mut(n) {
            *slot = Some(save);
        }

        if !self.match_next(next) {
            return false;
        }

        // A later visit of the same group may already have recorded it
        let slots = if open { &mut self.startp } else { &mut self.endp };
        if let Some(slot) = slots.get_mut(n) {
            if slot.is_none() {
                *slot = Some(save);
            }
        }
        true
    }
}

#[inline]
fn is_branch(nodes: &[Node], index: usize) -> bool {
    nodes.get(index).is_some_and(|n| n.op == OpCode::Branch)
}

/// Successor of a look-around construct: past its branch chain and its
/// close node.
fn skip_look_around(nodes: &[Node], opener: usize) -> Option<usize> {
    let mut next = next_index(nodes, opener + 1);
    while let Some(n) = next.filter(|&n| is_branch(nodes, n)) {
        next = next_index(nodes, n);
    }
    next.and_then(|n| next_index(nodes, n))
}

fn corrupted() -> bool {
    reg_error("memory corruption, 'match'");
    false
}
