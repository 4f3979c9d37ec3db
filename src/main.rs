mod commands;

use clap::{Parser, Subcommand};
use std::env;
use std::io::{self, Write};
use tracing_subscriber::EnvFilter;

use commands::check::CheckArgs;
use commands::run::RunArgs;

fn print_top_usage_and_exit(program: &str, code: i32) -> ! {
    eprintln!(
        r#"Usage:
  {0} run   [OPTIONS] "<code>"          # Run a program (args are concatenated)
  {0} run   [OPTIONS] --file <PATH>     # Run a program loaded from file ("-" for stdin)
  {0} check [--table] "<code>"          # Check loop balance without running

Global options:
  --verbose, -v   Log resolution and run details to stderr (RUST_LOG overrides)

Run "{0} <subcommand> --help" for more info.
"#,
        program
    );
    let _ = io::stderr().flush();
    std::process::exit(code);
}

#[derive(Parser, Debug)]
#[command(name = "bfvm", disable_help_flag = true, disable_help_subcommand = true)]
struct Cli {
    /// Show this help
    #[arg(short = 'h', long = "help", action = clap::ArgAction::SetTrue)]
    help: bool,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    Run(RunArgs),
    Check(CheckArgs),
}

/// Install a stderr `fmt` subscriber. `RUST_LOG` wins over `--verbose`.
fn init_logging(verbose: bool) {
    let default = if verbose { "bfvm=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn main() {
    // We still pull the program name for help rendering consistency
    let program = env::args().next().unwrap_or_else(|| String::from("bfvm"));

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let Some(command) = cli.command else {
        print_top_usage_and_exit(&program, if cli.help { 0 } else { 2 });
    };
    if cli.help {
        print_top_usage_and_exit(&program, 0);
    }

    let code = match command {
        Command::Run(args) => commands::run::run(&program, args),
        Command::Check(args) => commands::check::run(&program, args),
    };

    std::process::exit(code);
}
