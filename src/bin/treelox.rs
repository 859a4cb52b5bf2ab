//! Lox interpreter command-line.
//!
//! When called without argument it drops into an interactive read-evaluate-print loop.
//! When called with a script path, it runs the script and reports failures through the exit
//! status: 65 for compile errors, 70 for runtime errors and 64 for bad usage.
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=treelox=debug`) to trace the interpreter.

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{self, Context};
use clap::Parser;

use treelox::interpreter::Interpreter;
use treelox::printer;

const EX_USAGE: i32 = 64;
const EX_DATAERR: i32 = 65;
const EX_SOFTWARE: i32 = 70;

/// Run a Lox script, or start a prompt when no script is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Script to run.
    script: Option<PathBuf>,

    /// Print the parsed program as fully parenthesized source instead of running it.
    #[arg(long)]
    print_ast: bool,
}

fn main() -> Result<(), anyhow::Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if e.use_stderr() => {
            e.print()?;
            process::exit(EX_USAGE);
        }
        // --help and --version
        Err(e) => e.exit(),
    };
    init_tracing();

    let status = match &cli.script {
        Some(path) => run_file(path, cli.print_ast)?,
        None => {
            run_prompt(cli.print_ast)?;
            0
        }
    };
    if status != 0 {
        process::exit(status);
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Returns the process exit status.
fn run_file(path: &Path, print_ast: bool) -> Result<i32, anyhow::Error> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut interp_stdout = io::stdout();
    let mut interp = Interpreter::new(&mut interp_stdout);
    if print_ast {
        return Ok(dump_ast(&interp, &source));
    }

    if let Err(e) = interp.run(&source) {
        eprintln!("{}", e);
    }
    Ok(if interp.had_error() {
        EX_DATAERR
    } else if interp.had_runtime_error() {
        EX_SOFTWARE
    } else {
        0
    })
}

fn dump_ast<W: Write>(interp: &Interpreter<'_, W>, source: &str) -> i32 {
    match interp.parse(source) {
        Ok(prg) => {
            print!("{}", printer::print_program(&prg));
            0
        }
        Err(errors) => {
            for e in errors {
                eprintln!("{}", e);
            }
            EX_DATAERR
        }
    }
}

fn run_prompt(print_ast: bool) -> Result<(), io::Error> {
    let stdin = io::stdin();
    let mut repl_stdout = io::stdout();
    let mut interp_stdout = io::stdout();

    let mut interp = Interpreter::new(&mut interp_stdout);

    let mut input = String::new();
    loop {
        repl_stdout.write_all(b"> ")?;
        repl_stdout.flush()?;

        input.clear();
        let nbytes = stdin.read_line(&mut input)?;
        if nbytes == 0 {
            break;
        }

        if print_ast {
            dump_ast(&interp, &input);
        } else if let Err(e) = interp.run(&input) {
            eprintln!("{}", e);
        }
        interp.reset_errors();
    }

    Ok(())
}
