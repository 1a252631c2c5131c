//! Activation frames
//!
//! One frame per live call, holding that call's local and temp storage.
//! Mirrors the `Frame` dataclass in
//! `examples/original_source/patito/vm.py`: the address scheme makes a
//! `HashMap<VirtualAddress, Value>` the simplest faithful representation,
//! since addresses within a frame are never contiguous or fully populated.

use crate::value::Value;
use patito_core::VirtualAddress;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct Frame {
    pub func: String,
    pub ret_ip: Option<usize>,
    pub locals: HashMap<VirtualAddress, Value>,
    pub temps: HashMap<VirtualAddress, Value>,
}

impl Frame {
    pub fn new(func: impl Into<String>) -> Self {
        Frame {
            func: func.into(),
            ret_ip: None,
            locals: HashMap::new(),
            temps: HashMap::new(),
        }
    }
}
