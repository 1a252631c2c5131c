//! Variable and function symbol tables
//!
//! Mirrors the `VarTable`/`VarInfo` and `FuncDirectory`/`FuncInfo` dataclasses
//! in `examples/original_source/patito/semantico.py`: a flat name-to-info map
//! per scope (global, or one per function), plus a directory of every
//! function's signature, known up front via predeclaration before any
//! quadruple is generated.

use crate::error::SemanticError;
use patito_core::{Segment, Type, VirtualAddress};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub name: String,
    pub ty: Type,
    pub addr: VirtualAddress,
}

#[derive(Debug, Clone, Default)]
pub struct VarTable {
    by_name: HashMap<String, VarInfo>,
}

impl VarTable {
    pub fn new() -> Self {
        VarTable::default()
    }

    pub fn declare(&mut self, name: &str, ty: Type, addr: VirtualAddress) -> Result<(), SemanticError> {
        if self.by_name.contains_key(name) {
            return Err(SemanticError(format!("variable '{name}' already declared")));
        }
        self.by_name.insert(
            name.to_string(),
            VarInfo {
                name: name.to_string(),
                ty,
                addr,
            },
        );
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&VarInfo> {
        self.by_name.get(name)
    }
}

/// Per-segment counts snapshotted at the end of a function's generation, for
/// the driver's function-table listing and for the machine's frame sizing.
pub type SegmentCounts = HashMap<Type, i64>;

#[derive(Debug, Clone)]
pub struct FuncInfo {
    pub name: String,
    pub ret_type: Option<Type>,
    pub param_types: Vec<Type>,
    pub params: Vec<VarInfo>,
    pub vars: VarTable,
    /// Index of the function's first quadruple; `None` until generated.
    pub start_quad: Option<usize>,
    /// Global-segment address the return value is written to.
    pub ret_addr: Option<VirtualAddress>,
    pub locals_count: SegmentCounts,
    pub temps_count: SegmentCounts,
}

impl FuncInfo {
    fn new(name: &str, ret_type: Option<Type>, param_types: Vec<Type>) -> Self {
        FuncInfo {
            name: name.to_string(),
            ret_type,
            param_types,
            params: Vec::new(),
            vars: VarTable::new(),
            start_quad: None,
            ret_addr: None,
            locals_count: SegmentCounts::new(),
            temps_count: SegmentCounts::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FuncDirectory {
    funcs: HashMap<String, FuncInfo>,
    /// Preserves declaration order for stable listing in driver output.
    order: Vec<String>,
}

impl FuncDirectory {
    pub fn new() -> Self {
        FuncDirectory::default()
    }

    pub fn declare(
        &mut self,
        name: &str,
        ret_type: Option<Type>,
        param_types: Vec<Type>,
    ) -> Result<(), SemanticError> {
        if self.funcs.contains_key(name) {
            return Err(SemanticError(format!("function '{name}' already declared")));
        }
        self.funcs.insert(name.to_string(), FuncInfo::new(name, ret_type, param_types));
        self.order.push(name.to_string());
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&FuncInfo> {
        self.funcs.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FuncInfo> {
        self.funcs.get_mut(name)
    }

    /// All functions, in declaration order.
    pub fn in_order(&self) -> impl Iterator<Item = &FuncInfo> {
        self.order.iter().filter_map(|name| self.funcs.get(name))
    }
}

/// Which segment a variable declaration allocates into.
pub fn scope_segment(in_function: bool) -> Segment {
    if in_function {
        Segment::Local
    } else {
        Segment::Global
    }
}
