use std::io::{self, BufWriter, Stdout, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bfvm::cli_util::print_vm_error;
use bfvm::{execute_traced, CellKind, EofPolicy, MachineConfig, OutputMode, OverflowPolicy, Program};
use clap::Args;
use tracing::debug;

use super::load_source;

#[derive(Args, Debug)]
#[command(disable_help_flag = true)]
pub struct RunArgs {
    /// Read the program from PATH ("-" for stdin) instead of positional "<code>"
    #[arg(short = 'f', long = "file", value_name = "PATH")]
    pub file: Option<String>,

    /// Cell type: u8, i8, u16, i16, u32, i32, u64 or i64 (fallback BFVM_CELL; default u8)
    #[arg(long = "cell", value_name = "TYPE")]
    pub cell: Option<CellKind>,

    /// Number of tape cells (fallback BFVM_TAPE_LEN; default 30000)
    #[arg(long = "tape-len", value_name = "N")]
    pub tape_len: Option<usize>,

    /// Cell overflow: wrap or saturate (fallback BFVM_OVERFLOW; default wrap)
    #[arg(long = "overflow", value_name = "POLICY")]
    pub overflow: Option<OverflowPolicy>,

    /// What ',' stores at end of input: zero or unchanged (fallback BFVM_EOF; default zero)
    #[arg(long = "eof", value_name = "POLICY")]
    pub eof: Option<EofPolicy>,

    /// How '.' writes a cell: raw or numeric (fallback BFVM_OUTPUT; default by cell width)
    #[arg(long = "output", value_name = "MODE")]
    pub output: Option<OutputMode>,

    /// Maximum instructions before abort (fallback BFVM_MAX_STEPS; default unlimited)
    #[arg(long = "max-steps", value_name = "N")]
    pub max_steps: Option<u64>,

    /// Config file to use instead of $XDG_CONFIG_HOME/bfvm.toml
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print a step-by-step table of executed instructions to stderr
    #[arg(short = 'd', long = "debug")]
    pub debug: bool,

    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    pub help: bool,

    /// Concatenated program parts
    #[arg(value_name = "code", trailing_var_arg = true, allow_hyphen_values = true)]
    pub code: Vec<String>,
}

pub fn run(program: &str, args: RunArgs) -> i32 {
    if args.help {
        usage_and_exit(program, 0);
    }

    if args.file.is_none() && args.code.is_empty() {
        usage_and_exit(program, 2);
    }

    if args.file.is_some() && !args.code.is_empty() {
        eprintln!("{program}: cannot use positional code together with --file");
        usage_and_exit(program, 2);
    }

    // Resolve settings: flags -> env -> config file -> defaults
    let mut config = match MachineConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{program}: {e}");
            let _ = io::stderr().flush();
            return 2;
        }
    };
    apply_flags(&mut config, &args);
    if let Err(e) = config.validate() {
        eprintln!("{program}: {e}");
        let _ = io::stderr().flush();
        return 2;
    }
    debug!(?config, "configuration resolved");

    let RunArgs { file, code, debug, .. } = args;
    let source = match load_source(program, file, code) {
        Ok(s) => s,
        Err(exit_code) => return exit_code,
    };

    let parsed = match Program::new(source.as_str()) {
        Ok(p) => p,
        Err(err) => {
            print_vm_error(Some(program), &source, &err);
            return 1;
        }
    };

    let stdout = SharedStdout::new();

    // Flush whatever the program has written so far before leaving.
    let handler_stdout = stdout.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = handler_stdout.lock().flush();
        let _ = io::stderr().flush();
        std::process::exit(130);
    }) {
        debug!(error = %e, "ctrl+c handler not installed");
    }

    let stdin = io::stdin().lock();
    let mut stderr = io::stderr();
    let trace: Option<&mut dyn Write> = if debug { Some(&mut stderr) } else { None };

    match execute_traced(parsed, &config, stdin, stdout.clone(), trace) {
        Ok(summary) => {
            debug!(steps = summary.steps, output_units = summary.output_units, "program finished");
            0
        }
        Err(err) => {
            let _ = stdout.lock().flush();
            print_vm_error(Some(program), &source, &err);
            1
        }
    }
}

/// Buffered stdout shared between the machine and the Ctrl-C handler.
#[derive(Clone)]
struct SharedStdout(Arc<Mutex<BufWriter<Stdout>>>);

impl SharedStdout {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(BufWriter::new(io::stdout()))))
    }

    /// A panic while holding the lock leaves the buffer usable.
    fn lock(&self) -> MutexGuard<'_, BufWriter<Stdout>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Write for SharedStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.lock().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().flush()
    }
}

fn apply_flags(config: &mut MachineConfig, args: &RunArgs) {
    if let Some(cell) = args.cell {
        config.cell = cell;
    }
    if let Some(tape_len) = args.tape_len {
        config.tape_len = tape_len;
    }
    if let Some(overflow) = args.overflow {
        config.overflow = overflow;
    }
    if let Some(eof) = args.eof {
        config.eof = eof;
    }
    if args.output.is_some() {
        config.output = args.output;
    }
    if args.max_steps.is_some() {
        config.max_steps = args.max_steps;
    }
}

fn usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run [OPTIONS] "<code>"
  {0} run [OPTIONS] --file <PATH>

Options:
  --file,  -f <PATH>     Read the program from PATH ("-" reads it from stdin)
  --cell <TYPE>          u8 (default), i8, u16, i16, u32, i32, u64, i64
  --tape-len <N>         Number of tape cells (default 30000)
  --overflow <POLICY>    wrap (default) or saturate
  --eof <POLICY>         What ',' stores at end of input: zero (default) or unchanged
  --output <MODE>        raw (default for 8-bit cells) or numeric (default otherwise)
  --max-steps <N>        Abort after N instructions (default unlimited)
  --config, -c <PATH>    Config file (default $XDG_CONFIG_HOME/bfvm.toml)
  --debug,  -d           Print a step-by-step table to stderr while running
  --help,   -h           Show this help

Notes:
- Characters outside of ><+-.,[] are comments.
- The cursor wraps: '<' on cell 0 moves to the last cell and '>' on the last cell moves to cell 0.
- Settings are resolved flags -> BFVM_* environment -> config file -> defaults.

Examples:
- Load a program from a file:
    {0} run --file ./program.bf
- Feed bytes to ',' from a file:
    {0} run ",[.,]" < input.txt
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}
