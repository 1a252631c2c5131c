//! Patito compiler: lexer, parser and quadruple generator
//!
//! Three pipeline stages, each with its own error type, composed behind a
//! single [`compile`] entry point: [`lexer::tokenize`] -> [`parser::parse`]
//! -> [`generator::generate`].

pub mod ast;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod parser;
pub mod symtable;

pub use error::CompileError;
pub use generator::Generated;

/// Run the full pipeline over Patito source text.
pub fn compile(source: &str) -> Result<Generated, CompileError> {
    compile_with_capacity(source, None)
}

/// As [`compile`], overriding the virtual memory allocator's per-cell capacity.
pub fn compile_with_capacity(source: &str, capacity: Option<i64>) -> Result<Generated, CompileError> {
    let program = parser::parse(source)?;
    let generated = generator::generate_with_capacity(&program, capacity)?;
    Ok(generated)
}
