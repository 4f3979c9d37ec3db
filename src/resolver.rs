//! One-time bracket resolution.
//!
//! [`JumpTable::resolve`] scans the program once, matching every `[` with its
//! `]` using a stack of pending opens. The result answers, in O(1), where
//! control goes from either bracket when the loop is skipped/exited or
//! repeated, so the engine never searches for a partner at run time.

use tracing::debug;

use crate::error::{ResourceKind, UnmatchedBracketKind, VmError};
use crate::program::{Op, Program};

/// A matched loop: the positions of its `[` and `]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Jump {
    pub open: usize,
    pub close: usize,
}

impl Jump {
    /// Where control goes when the tested cell is zero: just past the `]`.
    pub fn skip_target(&self) -> usize {
        self.close + 1
    }

    /// Where control goes when the body runs again: just past the `[`.
    pub fn repeat_target(&self) -> usize {
        self.open + 1
    }
}

/// Bracket lookup table indexed by program position.
///
/// Entries exist for bracket positions only; both ends of a loop hold the same
/// [`Jump`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTable {
    entries: Vec<Option<Jump>>,
    loops: usize,
    max_depth: usize,
}

impl JumpTable {
    pub fn resolve(program: &Program) -> Result<Self, VmError> {
        let len = program.len();
        let mut entries: Vec<Option<Jump>> = Vec::new();
        entries
            .try_reserve_exact(len)
            .map_err(|_| VmError::ResourceExhaustion {
                what: ResourceKind::JumpTable,
                requested: len,
            })?;
        entries.resize(len, None);

        let mut stack: Vec<usize> = Vec::new();
        let mut loops = 0;
        let mut max_depth = 0;

        for (pos, op) in program.ops().iter().enumerate() {
            match op {
                Op::LoopOpen => {
                    stack.push(pos);
                    max_depth = max_depth.max(stack.len());
                }
                Op::LoopClose => {
                    let Some(open) = stack.pop() else {
                        return Err(VmError::UnbalancedLoop {
                            ip: pos,
                            kind: UnmatchedBracketKind::Close,
                        });
                    };
                    let jump = Jump { open, close: pos };
                    entries[open] = Some(jump);
                    entries[pos] = Some(jump);
                    loops += 1;
                }
                _ => {}
            }
        }

        if let Some(unmatched_open) = stack.last().copied() {
            return Err(VmError::UnbalancedLoop {
                ip: unmatched_open,
                kind: UnmatchedBracketKind::Open,
            });
        }

        debug!(len, loops, max_depth, "brackets resolved");

        Ok(Self {
            entries,
            loops,
            max_depth,
        })
    }

    /// The loop a bracket at `pos` belongs to.
    pub fn get(&self, pos: usize) -> Option<Jump> {
        self.entries.get(pos).copied().flatten()
    }

    /// Position of the bracket matching the one at `pos`.
    pub fn partner(&self, pos: usize) -> Option<usize> {
        self.get(pos)
            .map(|jump| if jump.open == pos { jump.close } else { jump.open })
    }

    pub fn loop_count(&self) -> usize {
        self.loops
    }

    /// Deepest loop nesting seen.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Every loop once, ordered by the position of its `[`.
    pub fn iter(&self) -> impl Iterator<Item = Jump> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(pos, entry)| entry.filter(|jump| jump.open == pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(code: &str) -> Result<JumpTable, VmError> {
        JumpTable::resolve(&Program::new(code).unwrap())
    }

    #[test]
    fn empty_program_has_empty_table() {
        let table = resolve("").unwrap();
        assert_eq!(table.loop_count(), 0);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn simple_loop_targets() {
        let table = resolve("+[-]").unwrap();
        let jump = table.get(1).unwrap();
        assert_eq!(jump, Jump { open: 1, close: 3 });
        assert_eq!(table.get(3), Some(jump));
        assert_eq!(jump.skip_target(), 4);
        assert_eq!(jump.repeat_target(), 2);
        assert_eq!(table.get(0), None);
        assert_eq!(table.get(2), None);
    }

    #[test]
    fn nested_loops_match_innermost_first() {
        let table = resolve("[>[-]<[]]").unwrap();
        assert_eq!(table.partner(0), Some(8));
        assert_eq!(table.partner(2), Some(4));
        assert_eq!(table.partner(6), Some(7));
        assert_eq!(table.loop_count(), 3);
        assert_eq!(table.max_depth(), 2);
        let opens: Vec<usize> = table.iter().map(|jump| jump.open).collect();
        assert_eq!(opens, vec![0, 2, 6]);
    }

    #[test]
    fn comments_between_brackets_are_skipped() {
        let table = resolve("[ loop ]").unwrap();
        assert_eq!(table.partner(0), Some(7));
    }

    #[test]
    fn lone_close_is_unbalanced() {
        let err = resolve("]").unwrap_err();
        assert!(matches!(
            err,
            VmError::UnbalancedLoop { ip: 0, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn extra_close_reports_its_position() {
        let err = resolve("[]+]").unwrap_err();
        assert!(matches!(
            err,
            VmError::UnbalancedLoop { ip: 3, kind: UnmatchedBracketKind::Close }
        ));
    }

    #[test]
    fn pending_open_reports_innermost() {
        let err = resolve("[[]+[").unwrap_err();
        assert!(matches!(
            err,
            VmError::UnbalancedLoop { ip: 4, kind: UnmatchedBracketKind::Open }
        ));
    }

    #[test]
    fn resolving_twice_gives_identical_tables() {
        let program = Program::new("++[>++[>+<-]<-]>>.").unwrap();
        let first = JumpTable::resolve(&program).unwrap();
        let second = JumpTable::resolve(&program).unwrap();
        assert_eq!(first, second);
    }
}
