//! Runtime error taxonomy
//!
//! One hand-rolled enum, same shape as `patito_compiler::error::CompileError`:
//! each variant names exactly the failure the VM's dispatch loop or memory
//! resolver can hit.

use crate::value::Value;
use patito_core::VirtualAddress;
use std::fmt;

#[derive(Debug)]
pub enum RuntimeError {
    /// A read targeted an address nothing was ever written to.
    UnwrittenAddress(VirtualAddress),
    /// An address did not fall inside any known segment range.
    AddressOutOfRange(VirtualAddress),
    /// A write targeted the read-only constant segment.
    WriteToConst(VirtualAddress),
    /// `PARAM` executed with no live pending frame.
    ParamWithoutEra,
    /// `GOSUB` executed with no live pending frame.
    GosubWithoutEra,
    /// The pending frame names a function the VM has no parameter table for.
    UnknownFunction(String),
    /// `PARAM`'s index has no corresponding declared parameter.
    ParamIndexOutOfRange { func: String, index: usize },
    /// `PARAM`'s target address does not resolve to a local or temp slot.
    InvalidParamTarget(VirtualAddress),
    /// An arithmetic or relational operator was applied to a non-numeric value.
    NotNumeric(Value),
    /// Writing `PRINT` output failed.
    Io(std::io::Error),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeError::UnwrittenAddress(addr) => write!(f, "read from unwritten address {addr}"),
            RuntimeError::AddressOutOfRange(addr) => write!(f, "address {addr} is outside all segment ranges"),
            RuntimeError::WriteToConst(addr) => write!(f, "attempted write to constant address {addr}"),
            RuntimeError::ParamWithoutEra => write!(f, "PARAM executed without a preceding ERA"),
            RuntimeError::GosubWithoutEra => write!(f, "GOSUB executed without a preceding ERA"),
            RuntimeError::UnknownFunction(name) => write!(f, "function '{name}' has no entry in the VM's function table"),
            RuntimeError::ParamIndexOutOfRange { func, index } => {
                write!(f, "parameter index {index} is invalid for function '{func}'")
            }
            RuntimeError::InvalidParamTarget(addr) => write!(f, "PARAM target address {addr} is not a local or temp slot"),
            RuntimeError::NotNumeric(v) => write!(f, "expected a numeric value, found {v:?}"),
            RuntimeError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for RuntimeError {}

impl From<std::io::Error> for RuntimeError {
    fn from(e: std::io::Error) -> Self {
        RuntimeError::Io(e)
    }
}
