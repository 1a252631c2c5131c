//! Runtime values
//!
//! The VM's memory maps store these, not `patito_core::Type`-tagged cells —
//! a value's Rust variant is all the type information execution needs.
//! Deliberately unchecked against the address's declared type at write time
//! (matching `examples/original_source/patito/vm.py`'s dynamically-typed
//! memory maps): storing an `int` into a `flotante` slot keeps it an `Int`
//! until it is used in a float computation, at which point it promotes.

use patito_core::address::ConstValue;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl From<&ConstValue> for Value {
    fn from(c: &ConstValue) -> Self {
        match c {
            ConstValue::Int(i) => Value::Int(*i),
            ConstValue::Float(f) => Value::Float(*f),
            ConstValue::Str(s) => Value::Str(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
        }
    }
}

/// Truthiness for `GOTOF`: zero, empty string, and `false` are falsy.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Str(s) => !s.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_empty_string_are_falsy() {
        assert!(!truthy(&Value::Int(0)));
        assert!(!truthy(&Value::Str(String::new())));
        assert!(truthy(&Value::Str("x".to_string())));
    }

    #[test]
    fn display_matches_plain_textual_form() {
        assert_eq!(Value::Int(5).to_string(), "5");
        assert_eq!(Value::Bool(true).to_string(), "True");
    }

    #[test]
    fn bool_display_is_capitalized_like_python_print() {
        // escribe(x > 0) prints a bare relational result, so this is reachable.
        assert_eq!(Value::Bool(true).to_string(), "True");
        assert_eq!(Value::Bool(false).to_string(), "False");
    }
}
