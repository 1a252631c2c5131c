//! Patito Core: the IR shared between the compiler and the virtual machine
//!
//! This crate holds the contract the two halves of the toolchain agree on:
//! - `types`: the primitive type lattice (`Type`) and assignment compatibility
//! - `address`: the segmented virtual-address scheme (global/local/temp/const
//!   crossed with int/float/string/bool) and the fixed-capacity allocator
//! - `cube`: the semantic cube, `(op, left, right) -> result` for binary and
//!   relational operators
//! - `quad`: the quadruple (`Op`, `arg1`, `arg2`, `result`) IR instruction
//!
//! Neither the compiler nor the VM crate knows about the other's internals;
//! both depend on this crate for a shared, type-checked vocabulary.

pub mod address;
pub mod cube;
pub mod quad;
pub mod types;

pub use address::{Segment, VirtualAddress, VirtualMemory};
pub use cube::SemanticCube;
pub use quad::{Op, Quadruple};
pub use types::Type;
