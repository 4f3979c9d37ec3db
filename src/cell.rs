//! Cell types the tape can be built from.
//!
//! The machine is generic over [`Cell`]; the eight primitive integer types
//! implement it. [`CellKind`] names them at run time so configuration can pick
//! one without the caller writing out the type.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// What happens when a cell is incremented past its maximum or decremented
/// below its minimum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Modular arithmetic: `255 + 1 == 0` for `u8`.
    #[default]
    Wrap,
    /// Clamp at the type's bounds.
    Saturate,
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wrap" => Ok(OverflowPolicy::Wrap),
            "saturate" => Ok(OverflowPolicy::Saturate),
            other => Err(format!("invalid overflow policy '{other}', expected 'wrap' or 'saturate'")),
        }
    }
}

/// A fixed-width integer tape cell.
pub trait Cell: Copy + Default + Eq + fmt::Debug + fmt::Display + 'static {
    const ZERO: Self;
    const KIND: CellKind;

    fn increment(self, policy: OverflowPolicy) -> Self;
    fn decrement(self, policy: OverflowPolicy) -> Self;

    /// Value stored by `,` for an input byte.
    fn from_input(byte: u8) -> Self;

    /// Low byte of the cell, written by `.` in raw output mode.
    fn to_output_byte(self) -> u8;

    fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

macro_rules! impl_cell {
    ($t:ty, $kind:ident, |$b:ident| $from_input:expr) => {
        impl Cell for $t {
            const ZERO: Self = 0;
            const KIND: CellKind = CellKind::$kind;

            #[inline]
            fn increment(self, policy: OverflowPolicy) -> Self {
                match policy {
                    OverflowPolicy::Wrap => self.wrapping_add(1),
                    OverflowPolicy::Saturate => self.saturating_add(1),
                }
            }

            #[inline]
            fn decrement(self, policy: OverflowPolicy) -> Self {
                match policy {
                    OverflowPolicy::Wrap => self.wrapping_sub(1),
                    OverflowPolicy::Saturate => self.saturating_sub(1),
                }
            }

            #[inline]
            fn from_input($b: u8) -> Self {
                $from_input
            }

            #[inline]
            fn to_output_byte(self) -> u8 {
                self as u8
            }
        }
    };
}

impl_cell!(u8, U8, |b| b);
impl_cell!(i8, I8, |b| b as i8);
impl_cell!(u16, U16, |b| u16::from(b));
impl_cell!(i16, I16, |b| i16::from(b));
impl_cell!(u32, U32, |b| u32::from(b));
impl_cell!(i32, I32, |b| i32::from(b));
impl_cell!(u64, U64, |b| u64::from(b));
impl_cell!(i64, I64, |b| i64::from(b));

/// Run-time name for one of the [`Cell`] implementations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    #[default]
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl CellKind {
    pub fn from_width(bits: u32, signed: bool) -> Option<Self> {
        Some(match (bits, signed) {
            (8, false) => CellKind::U8,
            (8, true) => CellKind::I8,
            (16, false) => CellKind::U16,
            (16, true) => CellKind::I16,
            (32, false) => CellKind::U32,
            (32, true) => CellKind::I32,
            (64, false) => CellKind::U64,
            (64, true) => CellKind::I64,
            _ => return None,
        })
    }

    pub fn bits(self) -> u32 {
        match self {
            CellKind::U8 | CellKind::I8 => 8,
            CellKind::U16 | CellKind::I16 => 16,
            CellKind::U32 | CellKind::I32 => 32,
            CellKind::U64 | CellKind::I64 => 64,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, CellKind::I8 | CellKind::I16 | CellKind::I32 | CellKind::I64)
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_signed() { 'i' } else { 'u' };
        write!(f, "{prefix}{}", self.bits())
    }
}

impl FromStr for CellKind {
    type Err = String;

    /// Accepts `u8`..`i64`, or a bare width (`8`, `16`, `32`, `64`) meaning unsigned.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let (signed, digits) = match s.as_bytes().first() {
            Some(b'i') => (true, &s[1..]),
            Some(b'u') => (false, &s[1..]),
            _ => (false, s.as_str()),
        };
        digits
            .parse::<u32>()
            .ok()
            .and_then(|bits| CellKind::from_width(bits, signed))
            .ok_or_else(|| format!("invalid cell type '{s}', expected one of u8, i8, u16, i16, u32, i32, u64, i64"))
    }
}
