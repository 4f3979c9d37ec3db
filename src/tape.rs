use crate::cell::Cell;
use crate::error::{ResourceKind, VmError};

/// Nominal tape length.
pub const DEFAULT_TAPE_LEN: usize = 30_000;

/// Fixed-length cell storage, zero-initialised.
///
/// The tape never bounds-checks a position itself; [`Cursor`] guarantees
/// every index it hands out is in range.
#[derive(Debug, Clone)]
pub struct Tape<C: Cell> {
    cells: Vec<C>,
}

impl<C: Cell> Tape<C> {
    pub fn new(len: usize) -> Result<Self, VmError> {
        let exhausted = || VmError::ResourceExhaustion {
            what: ResourceKind::Tape,
            requested: len,
        };
        if len == 0 {
            return Err(exhausted());
        }

        let mut cells = Vec::new();
        cells.try_reserve_exact(len).map_err(|_| exhausted())?;
        cells.resize(len, C::ZERO);
        Ok(Self { cells })
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// The cell under `cursor`.
    pub fn current(&self, cursor: &Cursor) -> C {
        self.cells[cursor.position()]
    }

    pub fn current_mut(&mut self, cursor: &Cursor) -> &mut C {
        &mut self.cells[cursor.position()]
    }

    pub fn cells(&self) -> &[C] {
        &self.cells
    }
}

/// The data pointer.
///
/// Movement wraps at both ends so the position is always in `[0, len)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    len: usize,
}

impl Cursor {
    /// A cursor at cell 0 of a tape with `len` cells. `len` must be non-zero.
    pub fn new(len: usize) -> Self {
        debug_assert!(len > 0);
        Self { position: 0, len }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn right(&mut self) {
        self.position = if self.position + 1 >= self.len { 0 } else { self.position + 1 };
    }

    pub fn left(&mut self) {
        self.position = if self.position == 0 { self.len - 1 } else { self.position - 1 };
    }
}
