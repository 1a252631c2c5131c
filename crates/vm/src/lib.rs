//! Patito VM: a stack-frame interpreter for the quadruple IR
//!
//! Takes the flat quadruple list, constant table, and per-function
//! parameter addresses a compilation produces and executes them, mirroring
//! `examples/original_source/patito/vm.py`'s `VirtualMachine`. Deliberately
//! dynamically typed at the value level (see [`value::Value`]) even though
//! addresses are statically typed at compile time — that mismatch is the
//! source this was ported from, not a Rust-side shortcut.

pub mod error;
pub mod frame;
pub mod machine;
pub mod value;

pub use error::RuntimeError;
pub use machine::VirtualMachine;
pub use value::Value;
