//! Driver-level error type
//!
//! Wraps whichever stage failed — compilation or execution — behind one
//! `Display` so `main` has a single place to print `Error: <message>` and
//! exit 1, per spec.md §7's "no partial outputs" propagation policy.

use patito_compiler::error::CompileError;
use patito_vm::RuntimeError;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    Compile(CompileError),
    Runtime(RuntimeError),
    Io(std::io::Error),
    Config(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Compile(e) => write!(f, "{e}"),
            CliError::Runtime(e) => write!(f, "{e}"),
            CliError::Io(e) => write!(f, "{e}"),
            CliError::Config(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for CliError {}

impl From<CompileError> for CliError {
    fn from(e: CompileError) -> Self {
        CliError::Compile(e)
    }
}

impl From<RuntimeError> for CliError {
    fn from(e: RuntimeError) -> Self {
        CliError::Runtime(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
