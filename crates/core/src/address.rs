//! Virtual addresses and the segmented memory allocator
//!
//! A virtual address is a plain non-negative integer, but its numeric range
//! encodes both a storage segment and a primitive type via fixed base
//! offsets. Each `(segment, type)` cell holds up to `capacity` slots
//! (default 1000); allocation inside a cell is a simple monotonic counter.

use crate::types::Type;
use std::collections::HashMap;
use std::fmt;

/// One of the four storage segments a virtual address can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Global,
    Local,
    Temp,
    Const,
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Segment::Global => "global",
            Segment::Local => "local",
            Segment::Temp => "temp",
            Segment::Const => "const",
        };
        write!(f, "{s}")
    }
}

/// A resolved virtual address: an integer plus the segment/type it encodes.
pub type VirtualAddress = i64;

const DEFAULT_CAPACITY: i64 = 1000;

fn base(segment: Segment, ty: Type) -> Option<i64> {
    use Segment::*;
    use Type::*;
    Some(match (segment, ty) {
        (Global, Int) => 1000,
        (Global, Float) => 2000,
        (Global, String) => 3000,
        (Global, Bool) => 4000,
        (Temp, Int) => 5000,
        (Temp, Float) => 6000,
        (Temp, String) => 7000,
        (Temp, Bool) => 8000,
        (Const, Int) => 9000,
        (Const, Float) => 10000,
        (Const, String) => 11000,
        (Const, Bool) => 12000,
        (Local, Int) => 13000,
        (Local, Float) => 14000,
        (Local, String) => 15000,
        (Local, Bool) => 16000,
        _ => return None,
    })
}

/// A literal value, used as the interning key for constants.
///
/// Two literals intern to the same address only if both their value and
/// type match: `0` (int) and `0.0` (float) get distinct addresses.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstValue {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Eq for ConstValue {}

impl std::hash::Hash for ConstValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match self {
            ConstValue::Int(i) => {
                0u8.hash(state);
                i.hash(state);
            }
            ConstValue::Float(f) => {
                1u8.hash(state);
                f.to_bits().hash(state);
            }
            ConstValue::Str(s) => {
                2u8.hash(state);
                s.hash(state);
            }
        }
    }
}

/// Error raised by the allocator: a `(segment, type)` cell ran out of slots.
///
/// Per the design notes, overflow is a hard error rather than a silent
/// collision into the next cell's address range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityExceeded {
    pub segment: Segment,
    pub ty: Type,
    pub capacity: i64,
}

impl fmt::Display for CapacityExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "capacity exceeded: {} {} cell holds at most {} entries",
            self.segment, self.ty, self.capacity
        )
    }
}

impl std::error::Error for CapacityExceeded {}

/// The allocator: hands out virtual addresses and interns constants.
///
/// Does not store values — only integer addresses. `local` and `temp`
/// counters are reset at each function boundary by `reset_locals`, which is
/// how the same address means different storage in different frames.
#[derive(Debug)]
pub struct VirtualMemory {
    capacity: i64,
    counters: HashMap<(Segment, Type), i64>,
    const_table: HashMap<(ConstValue, Type), VirtualAddress>,
}

impl VirtualMemory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: i64) -> Self {
        VirtualMemory {
            capacity,
            counters: HashMap::new(),
            const_table: HashMap::new(),
        }
    }

    fn alloc(&mut self, segment: Segment, ty: Type) -> Result<VirtualAddress, CapacityExceeded> {
        let base = base(segment, ty).expect("unsupported (segment, type) cell");
        let counter = self.counters.entry((segment, ty)).or_insert(0);
        if *counter >= self.capacity {
            return Err(CapacityExceeded {
                segment,
                ty,
                capacity: self.capacity,
            });
        }
        let addr = base + *counter;
        *counter += 1;
        Ok(addr)
    }

    /// Allocate a variable address in `global` or `local`.
    pub fn alloc_var(
        &mut self,
        ty: Type,
        segment: Segment,
    ) -> Result<VirtualAddress, CapacityExceeded> {
        debug_assert!(matches!(segment, Segment::Global | Segment::Local));
        self.alloc(segment, ty)
    }

    pub fn alloc_temp(&mut self, ty: Type) -> Result<VirtualAddress, CapacityExceeded> {
        self.alloc(Segment::Temp, ty)
    }

    /// Intern a constant, returning its (possibly pre-existing) address.
    pub fn alloc_const(
        &mut self,
        value: ConstValue,
        ty: Type,
    ) -> Result<VirtualAddress, CapacityExceeded> {
        let key = (value, ty);
        if let Some(addr) = self.const_table.get(&key) {
            return Ok(*addr);
        }
        let addr = self.alloc(Segment::Const, ty)?;
        self.const_table.insert(key, addr);
        Ok(addr)
    }

    /// Zero the `local` and `temp` counters (called at each function boundary).
    pub fn reset_locals(&mut self) {
        for (&(segment, _), count) in self.counters.iter_mut() {
            if matches!(segment, Segment::Local | Segment::Temp) {
                *count = 0;
            }
        }
    }

    /// Snapshot of the current counters for a segment, by type.
    pub fn usage(&self, segment: Segment) -> HashMap<Type, i64> {
        Type::VARIABLE_TYPES
            .iter()
            .map(|&ty| (ty, *self.counters.get(&(segment, ty)).unwrap_or(&0)))
            .collect()
    }

    /// Constants interned so far, as `(value, type) -> address`, in
    /// insertion-independent form for the driver to sort by address.
    pub fn constants(&self) -> impl Iterator<Item = (&ConstValue, Type, VirtualAddress)> {
        self.const_table
            .iter()
            .map(|((value, ty), addr)| (value, *ty, *addr))
    }

    /// Classify an address by the range it falls in.
    pub fn classify(addr: VirtualAddress) -> Option<(Segment, Type)> {
        for &segment in &[Segment::Global, Segment::Local, Segment::Temp, Segment::Const] {
            for &ty in &Type::VARIABLE_TYPES {
                let b = base(segment, ty).unwrap();
                if addr >= b && addr < b + DEFAULT_CAPACITY {
                    return Some((segment, ty));
                }
            }
        }
        None
    }
}

impl Default for VirtualMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_is_monotonic() {
        let mut mem = VirtualMemory::new();
        let a = mem.alloc_var(Type::Int, Segment::Global).unwrap();
        let b = mem.alloc_var(Type::Int, Segment::Global).unwrap();
        assert_eq!(a, 1000);
        assert_eq!(b, 1001);
    }

    #[test]
    fn cells_are_independent() {
        let mut mem = VirtualMemory::new();
        let i = mem.alloc_var(Type::Int, Segment::Global).unwrap();
        let f = mem.alloc_var(Type::Float, Segment::Global).unwrap();
        assert_eq!(i, 1000);
        assert_eq!(f, 2000);
    }

    #[test]
    fn reset_locals_reuses_addresses() {
        let mut mem = VirtualMemory::new();
        let first = mem.alloc_var(Type::Int, Segment::Local).unwrap();
        mem.reset_locals();
        let second = mem.alloc_var(Type::Int, Segment::Local).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn reset_locals_does_not_touch_global_or_const() {
        let mut mem = VirtualMemory::new();
        mem.alloc_var(Type::Int, Segment::Global).unwrap();
        mem.alloc_const(ConstValue::Int(1), Type::Int).unwrap();
        mem.reset_locals();
        let next_global = mem.alloc_var(Type::Int, Segment::Global).unwrap();
        let next_const = mem.alloc_const(ConstValue::Int(2), Type::Int).unwrap();
        assert_eq!(next_global, 1001);
        assert_eq!(next_const, 9001);
    }

    #[test]
    fn constants_intern_by_value_and_type() {
        let mut mem = VirtualMemory::new();
        let a = mem.alloc_const(ConstValue::Int(7), Type::Int).unwrap();
        let b = mem.alloc_const(ConstValue::Int(7), Type::Int).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn same_value_different_type_gets_distinct_address() {
        let mut mem = VirtualMemory::new();
        let as_int = mem.alloc_const(ConstValue::Int(0), Type::Int).unwrap();
        let as_float = mem.alloc_const(ConstValue::Float(0.0), Type::Float).unwrap();
        assert_ne!(as_int, as_float);
    }

    #[test]
    fn capacity_exceeded_is_an_error() {
        let mut mem = VirtualMemory::with_capacity(2);
        mem.alloc_temp(Type::Bool).unwrap();
        mem.alloc_temp(Type::Bool).unwrap();
        let err = mem.alloc_temp(Type::Bool).unwrap_err();
        assert_eq!(err.segment, Segment::Temp);
        assert_eq!(err.ty, Type::Bool);
    }

    #[test]
    fn classify_matches_allocation_segment() {
        let mut mem = VirtualMemory::new();
        let addr = mem.alloc_var(Type::String, Segment::Local).unwrap();
        assert_eq!(VirtualMemory::classify(addr), Some((Segment::Local, Type::String)));
    }

    #[test]
    fn classify_out_of_range_is_none() {
        assert_eq!(VirtualMemory::classify(-1), None);
        assert_eq!(VirtualMemory::classify(999_999), None);
    }
}
