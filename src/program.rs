use std::fmt;

use crate::error::{ResourceKind, VmError};

/// A single decoded instruction.
///
/// Every source character maps to exactly one `Op`; characters outside the
/// instruction set become [`Op::Nop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `>` move the cursor right.
    Right,
    /// `<` move the cursor left.
    Left,
    /// `+` increment the current cell.
    Inc,
    /// `-` decrement the current cell.
    Dec,
    /// `.` emit the current cell.
    Output,
    /// `,` read one unit into the current cell.
    Input,
    /// `[` enter the loop body, or skip past the matching `]` when the cell is zero.
    LoopOpen,
    /// `]` repeat the loop body while the cell is non-zero.
    LoopClose,
    /// Anything else: comments, whitespace.
    Nop,
}

impl Op {
    pub fn decode(c: char) -> Self {
        match c {
            '>' => Op::Right,
            '<' => Op::Left,
            '+' => Op::Inc,
            '-' => Op::Dec,
            '.' => Op::Output,
            ',' => Op::Input,
            '[' => Op::LoopOpen,
            ']' => Op::LoopClose,
            _ => Op::Nop,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            Op::Right => '>',
            Op::Left => '<',
            Op::Inc => '+',
            Op::Dec => '-',
            Op::Output => '.',
            Op::Input => ',',
            Op::LoopOpen => '[',
            Op::LoopClose => ']',
            Op::Nop => ' ',
        }
    }
}

/// Immutable program text plus its decoded instruction stream.
///
/// Positions are character indices into the source, so error positions line
/// up with what a user sees in an editor.
#[derive(Clone)]
pub struct Program {
    source: String,
    ops: Vec<Op>,
}

impl Program {
    pub fn new(source: impl Into<String>) -> Result<Self, VmError> {
        let source = source.into();
        let count = source.chars().count();

        let mut ops = Vec::new();
        ops.try_reserve_exact(count)
            .map_err(|_| VmError::ResourceExhaustion {
                what: ResourceKind::Program,
                requested: count,
            })?;
        ops.extend(source.chars().map(Op::decode));

        Ok(Self { source, ops })
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Decoded op at `pos`, or `None` past the end.
    pub fn op(&self, pos: usize) -> Option<Op> {
        self.ops.get(pos).copied()
    }

    pub fn ops(&self) -> &[Op] {
        &self.ops
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Number of recognized instructions, ignoring comments.
    pub fn instruction_count(&self) -> usize {
        self.ops.iter().filter(|op| **op != Op::Nop).count()
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Program")
            .field("len", &self.len())
            .field("instructions", &self.instruction_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_instruction() {
        let program = Program::new("><+-.,[]").unwrap();
        assert_eq!(
            program.ops(),
            &[
                Op::Right,
                Op::Left,
                Op::Inc,
                Op::Dec,
                Op::Output,
                Op::Input,
                Op::LoopOpen,
                Op::LoopClose,
            ]
        );
    }

    #[test]
    fn comments_and_whitespace_are_nops() {
        let program = Program::new("a +\n#").unwrap();
        assert_eq!(program.len(), 5);
        assert_eq!(program.op(1), Some(Op::Nop));
        assert_eq!(program.op(2), Some(Op::Inc));
        assert_eq!(program.instruction_count(), 1);
    }

    #[test]
    fn positions_count_characters_not_bytes() {
        // 'é' is two bytes in UTF-8 but one position.
        let program = Program::new("é+").unwrap();
        assert_eq!(program.len(), 2);
        assert_eq!(program.op(1), Some(Op::Inc));
        assert_eq!(program.op(2), None);
    }

    #[test]
    fn empty_program_is_valid() {
        let program = Program::new("").unwrap();
        assert!(program.is_empty());
        assert_eq!(program.instruction_count(), 0);
    }
}
