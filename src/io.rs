use std::io::{self, Read, Write};
use std::str::FromStr;

use serde::Deserialize;

use crate::cell::{Cell, CellKind};

/// How `.` renders a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Write the cell's low byte.
    Raw,
    /// Write the decimal value; a cell holding 10 is written as a newline.
    Numeric,
}

impl OutputMode {
    /// Raw bytes for 8-bit cells, numbers for anything wider.
    pub fn default_for(kind: CellKind) -> Self {
        if kind.bits() == 8 {
            OutputMode::Raw
        } else {
            OutputMode::Numeric
        }
    }
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" => Ok(OutputMode::Raw),
            "numeric" => Ok(OutputMode::Numeric),
            other => Err(format!("invalid output mode '{other}', expected 'raw' or 'numeric'")),
        }
    }
}

/// What `,` stores once the input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EofPolicy {
    /// Store zero.
    #[default]
    Zero,
    /// Leave the cell as it was.
    Unchanged,
}

impl FromStr for EofPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(EofPolicy::Zero),
            "unchanged" => Ok(EofPolicy::Unchanged),
            other => Err(format!("invalid EOF policy '{other}', expected 'zero' or 'unchanged'")),
        }
    }
}

/// The machine's only contact with the outside world.
pub trait Io {
    /// Read one input byte; `Ok(None)` at end of input.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Write one cell as a single output unit.
    fn emit<C: Cell>(&mut self, cell: C) -> io::Result<()>;

    fn flush(&mut self) -> io::Result<()>;
}

/// [`Io`] over any reader/writer pair.
pub struct StreamIo<R: Read, W: Write> {
    input: R,
    output: W,
    mode: OutputMode,
}

impl<R: Read, W: Write> StreamIo<R, W> {
    pub fn new(input: R, output: W, mode: OutputMode) -> Self {
        Self { input, output, mode }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_parts(self) -> (R, W) {
        (self.input, self.output)
    }
}

impl<R: Read, W: Write> Io for StreamIo<R, W> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        // Anything already emitted should be visible before we block on input.
        self.output.flush()?;

        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn emit<C: Cell>(&mut self, cell: C) -> io::Result<()> {
        match self.mode {
            OutputMode::Raw => self.output.write_all(&[cell.to_output_byte()]),
            OutputMode::Numeric if cell == C::from_input(b'\n') => self.output.write_all(b"\n"),
            OutputMode::Numeric => write!(self.output, "{cell}"),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}
