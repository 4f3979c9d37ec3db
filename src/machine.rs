//! The execution engine.
//!
//! A [`Machine`] owns all mutable state of a run: the tape, the cursor, the
//! program counter and the I/O adapter. The program and its [`JumpTable`] are
//! fixed once the machine is built. Each [`Machine::step`] decodes nothing; the
//! program was decoded into [`Op`]s up front and the loop targets come from the
//! table, so every instruction, brackets included, costs O(1).

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::cell::{Cell, OverflowPolicy};
use crate::config::MachineConfig;
use crate::error::VmError;
use crate::io::{EofPolicy, Io};
use crate::program::{Op, Program};
use crate::resolver::JumpTable;
use crate::tape::{Cursor, Tape};

/// Outcome of a single [`Machine::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The program counter has reached the end of the program.
    Halted,
}

/// Counters reported after a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Program positions executed, comments included.
    pub steps: u64,
    /// Units written by `.`.
    pub output_units: u64,
}

pub struct Machine<C: Cell, I: Io> {
    program: Program,
    table: JumpTable,
    tape: Tape<C>,
    cursor: Cursor,
    /// Program counter
    pc: usize,
    io: I,
    overflow: OverflowPolicy,
    eof: EofPolicy,
    max_steps: Option<u64>,
    steps: u64,
    output_units: u64,
}

impl<C: Cell, I: Io> Machine<C, I> {
    /// Resolve the program's loops and allocate the tape.
    ///
    /// Both can fail; when they do nothing has been executed.
    pub fn new(program: Program, config: &MachineConfig, io: I) -> Result<Self, VmError> {
        let table = JumpTable::resolve(&program)?;
        let tape = Tape::new(config.tape_len)?;
        let cursor = Cursor::new(tape.len());

        Ok(Self {
            program,
            table,
            tape,
            cursor,
            pc: 0,
            io,
            overflow: config.overflow,
            eof: config.eof,
            max_steps: config.max_steps,
            steps: 0,
            output_units: 0,
        })
    }

    /// Execute the instruction at the program counter.
    pub fn step(&mut self) -> Result<Step, VmError> {
        self.execute_one(None)
    }

    /// Run until the program counter falls off the end of the program.
    pub fn run(&mut self) -> Result<RunSummary, VmError> {
        debug!(
            len = self.program.len(),
            tape_len = self.tape.len(),
            cell = %C::KIND,
            "run starting"
        );

        while self.execute_one(None)? == Step::Continue {}

        self.finish()
    }

    /// Like [`Machine::run`], additionally writing a step-by-step table of
    /// every executed instruction to `sink`. Comments are not listed.
    pub fn run_traced<W: Write + ?Sized>(&mut self, sink: &mut W) -> Result<RunSummary, VmError> {
        let trace_err = |source: io::Error| VmError::Io { ip: 0, source };

        writeln!(sink, "STEP | IP  | PTR | CELL | INSTR | ACTION").map_err(trace_err)?;
        writeln!(
            sink,
            "-----+-----+-----+------+-------+------------------------------------------------"
        )
        .map_err(trace_err)?;

        let mut row: usize = 0;
        loop {
            let ip = self.pc;
            let (ptr_before, cell_before) = (self.cursor.position(), self.tape.current(&self.cursor));
            let op = self.program.op(ip);
            let mut action = String::new();

            if self.execute_one(Some(&mut action))? == Step::Halted {
                break;
            }

            if let Some(op) = op.filter(|op| *op != Op::Nop) {
                writeln!(
                    sink,
                    "{:<4} | {:<3} | {:<3} | {:<4} |  {}    | {}",
                    row,
                    ip,
                    ptr_before,
                    cell_before,
                    op.symbol(),
                    action
                )
                .map_err(|source| VmError::Io { ip, source })?;
                row += 1;
            }
        }

        self.finish()
    }

    fn finish(&mut self) -> Result<RunSummary, VmError> {
        self.io
            .flush()
            .map_err(|source| VmError::Io { ip: self.pc, source })?;

        let summary = RunSummary {
            steps: self.steps,
            output_units: self.output_units,
        };
        debug!(steps = summary.steps, output_units = summary.output_units, "run finished");
        Ok(summary)
    }

    /// Shared by `step`, `run` and `run_traced`. `action`, when given, receives
    /// a human readable description of what the instruction did.
    fn execute_one(&mut self, mut action: Option<&mut String>) -> Result<Step, VmError> {
        let Some(op) = self.program.op(self.pc) else {
            return Ok(Step::Halted);
        };

        if let Some(limit) = self.max_steps {
            if self.steps >= limit {
                return Err(VmError::StepLimitExceeded { limit });
            }
        }
        self.steps += 1;

        let ip = self.pc;
        let mut next = ip + 1;

        match op {
            Op::Right => {
                self.cursor.right();
                if let Some(a) = action.as_mut() {
                    **a = format!("Moved pointer head to index {}", self.cursor.position());
                }
            }
            Op::Left => {
                self.cursor.left();
                if let Some(a) = action.as_mut() {
                    **a = format!("Moved pointer head to index {}", self.cursor.position());
                }
            }
            Op::Inc => {
                let cell = self.tape.current_mut(&self.cursor);
                let before = *cell;
                *cell = before.increment(self.overflow);
                if let Some(a) = action.as_mut() {
                    **a = format!("Increment cell[{}] from {} to {}", self.cursor.position(), before, *cell);
                }
            }
            Op::Dec => {
                let cell = self.tape.current_mut(&self.cursor);
                let before = *cell;
                *cell = before.decrement(self.overflow);
                if let Some(a) = action.as_mut() {
                    **a = format!("Decrement cell[{}] from {} to {}", self.cursor.position(), before, *cell);
                }
            }
            Op::Output => {
                let value = self.tape.current(&self.cursor);
                self.io
                    .emit(value)
                    .map_err(|source| VmError::Io { ip, source })?;
                self.output_units += 1;
                if let Some(a) = action.as_mut() {
                    **a = format!("Output cell value {value}");
                }
            }
            Op::Input => {
                let read = self
                    .io
                    .read_byte()
                    .map_err(|source| VmError::Io { ip, source })?;
                let cell = self.tape.current_mut(&self.cursor);
                match (read, self.eof) {
                    (Some(byte), _) => *cell = C::from_input(byte),
                    (None, EofPolicy::Zero) => *cell = C::ZERO,
                    (None, EofPolicy::Unchanged) => {}
                }
                if let Some(a) = action.as_mut() {
                    **a = match read {
                        Some(_) => format!("Read input -> {}", *cell),
                        None => format!("Read input -> EOF, cell is {}", *cell),
                    };
                }
            }
            Op::LoopOpen => {
                if self.tape.current(&self.cursor).is_zero() {
                    let jump = self.table.get(ip).expect("resolved bracket");
                    next = jump.skip_target();
                    trace!(ip, target = next, "skip loop");
                    if let Some(a) = action.as_mut() {
                        **a = format!("Cell is 0; jump past matching ']' at IP {}", jump.close);
                    }
                } else if let Some(a) = action.as_mut() {
                    **a = "Enter loop (cell != 0)".to_string();
                }
            }
            Op::LoopClose => {
                if !self.tape.current(&self.cursor).is_zero() {
                    let jump = self.table.get(ip).expect("resolved bracket");
                    next = jump.repeat_target();
                    trace!(ip, target = next, "repeat loop");
                    if let Some(a) = action.as_mut() {
                        **a = format!("Cell != 0; jump back past matching '[' at IP {}", jump.open);
                    }
                } else if let Some(a) = action.as_mut() {
                    **a = "Exit loop (cell is 0)".to_string();
                }
            }
            Op::Nop => {}
        }

        self.pc = next;
        Ok(Step::Continue)
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn jump_table(&self) -> &JumpTable {
        &self.table
    }

    pub fn tape(&self) -> &Tape<C> {
        &self.tape
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn io(&self) -> &I {
        &self.io
    }

    pub fn into_io(self) -> I {
        self.io
    }
}
