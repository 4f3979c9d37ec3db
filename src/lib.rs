//! A small Brainfuck virtual machine.
//!
//! The machine executes the eight-instruction tape language against a
//! fixed-length tape of fixed-width cells with a single cursor.
//!
//! Features and behaviors:
//! - Loops are resolved once, before execution, into a [`JumpTable`]; a stray
//!   `]` or an unclosed `[` is reported without running anything.
//! - The cursor wraps: `>` from the last cell goes to cell 0 and `<` from
//!   cell 0 goes to the last cell.
//! - Cells are `u8` by default; any of `u8 i8 u16 i16 u32 i32 u64 i64` can be
//!   selected, with wrapping (default) or saturating arithmetic.
//! - Input `,` reads one byte; on EOF the cell is set to 0 (or left unchanged,
//!   see [`EofPolicy`]).
//! - Output `.` writes the cell's byte for 8-bit cells and its decimal value
//!   for wider ones (see [`OutputMode`]).
//! - Any other character is a comment.
//!
//! Quick start:
//!
//! ```no_run
//! use bfvm::{execute, MachineConfig, Program};
//!
//! let code = "++++++++++[>+++++++>++++++++++>+++>+<<<<-]>++.>+.+++++++..+++.>++.<<+++++++++++++++.>.+++.------.--------.>+.>.";
//! let program = Program::new(code).expect("program should load");
//! execute(program, &MachineConfig::default(), std::io::stdin(), std::io::stdout())
//!     .expect("program should run");
//! ```

use std::io::{Read, Write};

pub mod cell;
pub mod cli_util;
pub mod config;
pub mod error;
pub mod io;
pub mod machine;
pub mod program;
pub mod resolver;
pub mod tape;

pub use cell::{Cell, CellKind, OverflowPolicy};
pub use config::{ConfigError, MachineConfig};
pub use error::{ResourceKind, UnmatchedBracketKind, VmError};
pub use io::{EofPolicy, Io, OutputMode, StreamIo};
pub use machine::{Machine, RunSummary, Step};
pub use program::{Op, Program};
pub use resolver::{Jump, JumpTable};
pub use tape::{Cursor, Tape, DEFAULT_TAPE_LEN};

/// Run `program` to completion with the cell type named by `config.cell`.
pub fn execute<R: Read, W: Write>(
    program: Program,
    config: &MachineConfig,
    input: R,
    output: W,
) -> Result<RunSummary, VmError> {
    execute_traced(program, config, input, output, None)
}

/// [`execute`], additionally writing a step table to `trace` when given.
pub fn execute_traced<R: Read, W: Write>(
    program: Program,
    config: &MachineConfig,
    input: R,
    output: W,
    trace: Option<&mut dyn Write>,
) -> Result<RunSummary, VmError> {
    let io = StreamIo::new(input, output, config.output_mode());
    match config.cell {
        CellKind::U8 => run_with::<u8, _>(program, config, io, trace),
        CellKind::I8 => run_with::<i8, _>(program, config, io, trace),
        CellKind::U16 => run_with::<u16, _>(program, config, io, trace),
        CellKind::I16 => run_with::<i16, _>(program, config, io, trace),
        CellKind::U32 => run_with::<u32, _>(program, config, io, trace),
        CellKind::I32 => run_with::<i32, _>(program, config, io, trace),
        CellKind::U64 => run_with::<u64, _>(program, config, io, trace),
        CellKind::I64 => run_with::<i64, _>(program, config, io, trace),
    }
}

fn run_with<C: Cell, I: Io>(
    program: Program,
    config: &MachineConfig,
    io: I,
    trace: Option<&mut dyn Write>,
) -> Result<RunSummary, VmError> {
    let mut machine: Machine<C, I> = Machine::new(program, config, io)?;
    match trace {
        Some(sink) => machine.run_traced(sink),
        None => machine.run(),
    }
}
