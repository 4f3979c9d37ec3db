use std::io::{self, Write};

use crate::VmError;

/// Pretty-print a [`VmError`] with caret positioning when the error points at
/// a source position. If `program` is `Some("bfvm")`, messages are prefixed
/// with "bfvm: ...".
pub fn print_vm_error(program: Option<&str>, code: &str, err: &VmError) {
    let _ = write_vm_error(&mut io::stderr().lock(), program, code, err);
    let _ = io::stderr().flush();
}

pub fn write_vm_error<W: Write>(
    out: &mut W,
    program: Option<&str>,
    code: &str,
    err: &VmError,
) -> io::Result<()> {
    let prefix_program = |msg: &str| {
        if let Some(p) = program {
            format!("{p}: {msg}")
        } else {
            msg.to_string()
        }
    };

    match err {
        VmError::UnbalancedLoop { ip, kind } => {
            let msg = prefix_program(&format!("Parse error: unmatched bracket {kind}"));
            write_error_with_context(out, &msg, code, *ip)
        }
        VmError::Io { ip, source } => {
            let msg = prefix_program(&format!("I/O error: {source}"));
            write_error_with_context(out, &msg, code, *ip)
        }
        VmError::ResourceExhaustion { .. } | VmError::StepLimitExceeded { .. } => {
            writeln!(out, "{}", prefix_program(&err.to_string()))
        }
    }
}

/// Write a concise error with instruction index and a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn write_error_with_context<W: Write>(out: &mut W, prefix: &str, code: &str, pos: usize) -> io::Result<()> {
    writeln!(out, "{prefix} at instruction {pos}")?;

    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let total_chars = code.chars().count();
    let start_char = pos.saturating_sub(WINDOW_CHARS);
    let end_char = (pos + WINDOW_CHARS + 1).min(total_chars);

    let window: String = code
        .chars()
        .skip(start_char)
        .take(end_char.saturating_sub(start_char))
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    writeln!(out, "  {window}")?;

    // Caret under the exact position
    let caret_offset_chars = pos.saturating_sub(start_char);
    writeln!(out, "  {}^", " ".repeat(caret_offset_chars))
}
