//! Patito CLI
//!
//! Command-line driver: compile a Patito program, print its virtual-address,
//! function, constant, and quadruple tables, and optionally execute it.

use clap::{CommandFactory, Parser as ClapParser, Subcommand};
use clap_complete::{generate, Shell};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

#[derive(ClapParser)]
#[command(name = "patito")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile and optionally run Patito programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a Patito source file (or stdin) and print its tables and quadruples
    Compile {
        /// Source file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Execute the generated quadruples after compiling
        #[arg(long)]
        run: bool,

        /// TOML configuration file overriding the virtual memory allocator's capacity
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Compile { input, run, config } => run_compile(input, run, config),
        Commands::Completions { shell } => run_completions(shell),
    }
}

fn run_completions(shell: Shell) {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "patito", &mut io::stdout());
}

fn run_compile(input: Option<PathBuf>, run: bool, config: Option<PathBuf>) {
    let source = match read_source(input.as_deref()) {
        Ok(s) => s,
        Err(e) => fail(&e.to_string()),
    };
    let capacity = match load_capacity(config.as_deref()) {
        Ok(c) => c,
        Err(e) => fail(&e),
    };

    if run {
        match patito_cli::compile_and_run_report(&source, capacity) {
            Ok(report) => print!("{report}"),
            Err(e) => fail(&e.to_string()),
        }
    } else {
        match patito_cli::compile_report(&source, capacity) {
            Ok(report) => print!("{report}"),
            Err(e) => fail(&e.to_string()),
        }
    }
}

fn read_source(path: Option<&std::path::Path>) -> io::Result<String> {
    match path {
        Some(p) => fs::read_to_string(p),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

fn load_capacity(path: Option<&std::path::Path>) -> Result<Option<i64>, String> {
    let Some(path) = path else { return Ok(None) };
    let text = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let config = patito_cli::config::PatitoConfig::from_toml(&text)?;
    Ok(config.segment_capacity())
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    process::exit(1);
}
