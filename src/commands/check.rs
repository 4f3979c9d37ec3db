use std::io::{self, Write};

use bfvm::cli_util::print_vm_error;
use bfvm::{JumpTable, Program, VmError};
use clap::Args;

use super::load_source;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct CheckArgs {
    /// Read the program from PATH ("-" for stdin) instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// List every loop with the positions of its brackets
    #[arg(short = 't', long = "table")]
    pub table: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,

    /// Concatenated program parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

pub fn run(program: &str, args: CheckArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    let CheckArgs { file, table, code, .. } = args;

    if file.is_none() && code.is_empty() {
        usage_and_exit(program, 2);
    }

    if file.is_some() && !code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    let source = match load_source(program, file, code) {
        Ok(s) => s,
        Err(exit_code) => return exit_code,
    };

    let resolved = Program::new(source.as_str())
        .and_then(|parsed| JumpTable::resolve(&parsed).map(|jumps| (parsed, jumps)));

    let (parsed, jumps) = match resolved {
        Ok(pair) => pair,
        Err(err) => {
            print_vm_error(Some(program), &source, &err);
            return 1;
        }
    };

    let mut stdout = io::stdout().lock();
    if let Err(e) = write_report(&mut stdout, &parsed, &jumps, table) {
        print_vm_error(Some(program), &source, &VmError::Io { ip: 0, source: e });
        return 1;
    }
    0
}

fn write_report<W: Write>(out: &mut W, parsed: &Program, jumps: &JumpTable, table: bool) -> io::Result<()> {
    writeln!(
        out,
        "ok: {} instructions, {} loops, max depth {}",
        parsed.instruction_count(),
        jumps.loop_count(),
        jumps.max_depth()
    )?;

    if table {
        writeln!(out, "OPEN  | CLOSE | SKIP TO | REPEAT AT")?;
        writeln!(out, "------+-------+---------+----------")?;
        for jump in jumps.iter() {
            writeln!(
                out,
                "{:<5} | {:<5} | {:<7} | {}",
                jump.open,
                jump.close,
                jump.skip_target(),
                jump.repeat_target()
            )?;
        }
    }
    out.flush()
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} check [--table|-t] "<code>"
  {0} check [--table|-t] --file <PATH>

Options:
  --file,  -f <PATH>  Read the program from PATH ("-" reads it from stdin)
  --table, -t         List every loop with its bracket positions and jump targets
  --help,  -h         Show this help

Description:
  Resolves the program's loops without running it. Exits 0 when every '['
  has a matching ']', 1 otherwise.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_loops() {
        let parsed = Program::new("+[>[-]<]").unwrap();
        let jumps = JumpTable::resolve(&parsed).unwrap();
        let mut out = Vec::new();
        write_report(&mut out, &parsed, &jumps, true).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ok: 8 instructions, 2 loops, max depth 2");
        assert_eq!(lines[3], "1     | 7     | 8       | 2");
        assert_eq!(lines[4], "3     | 5     | 6       | 4");
    }
}
