//! The semantic cube
//!
//! A static `(operator, left type, right type) -> result type` table,
//! consulted for every binary/relational operation. A missing entry is a
//! type error — notably, there is no entry for `bool` operands anywhere in
//! the cube, since Patito has no logical `&&`/`||`. That's deliberate: the
//! only way to produce a `bool` is a relational operator, and `if`/`while`
//! conditions must therefore always originate from one.

use crate::types::Type;
use std::collections::HashMap;
use std::sync::OnceLock;

/// The operators the cube is keyed on.
pub const ARITHMETIC_OPS: [&str; 4] = ["+", "-", "*", "/"];
pub const RELATIONAL_OPS: [&str; 6] = ["<", ">", "<=", ">=", "==", "!="];

pub struct SemanticCube {
    table: HashMap<(&'static str, Type, Type), Type>,
}

fn build() -> SemanticCube {
    let mut table = HashMap::new();
    let mut allow = |op: &'static str, l: Type, r: Type, result: Type| {
        table.insert((op, l, r), result);
    };

    for &op in &ARITHMETIC_OPS {
        allow(op, Type::Int, Type::Int, Type::Int);
        allow(op, Type::Int, Type::Float, Type::Float);
        allow(op, Type::Float, Type::Int, Type::Float);
        allow(op, Type::Float, Type::Float, Type::Float);
    }
    for &op in &RELATIONAL_OPS {
        allow(op, Type::Int, Type::Int, Type::Bool);
        allow(op, Type::Int, Type::Float, Type::Bool);
        allow(op, Type::Float, Type::Int, Type::Bool);
        allow(op, Type::Float, Type::Float, Type::Bool);
    }
    allow("==", Type::String, Type::String, Type::Bool);
    allow("!=", Type::String, Type::String, Type::Bool);

    SemanticCube { table }
}

impl SemanticCube {
    /// The single process-wide cube instance.
    pub fn get() -> &'static SemanticCube {
        static CUBE: OnceLock<SemanticCube> = OnceLock::new();
        CUBE.get_or_init(build)
    }

    /// Look up the result type of `op` applied to `(left, right)`.
    /// `None` means the combination is illegal — a type error.
    pub fn result_type(&self, op: &str, left: Type, right: Type) -> Option<Type> {
        self.table.get(&(op, left, right)).copied()
    }
}
