//! Compile-time constant values.
//!
//! These are the values the type oracle can resolve for constant expressions
//! and the payload of `load_const` instructions.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::QualifiedName;

/// A constant known at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// The unit value returned by `void` functions.
    None,
    I32(i32),
    F64(OrderedFloat<f64>),
    Bool(bool),
    Str(String),
    /// A direct reference to a registered function.
    Func(QualifiedName),
}

impl Value {
    pub fn f64(value: f64) -> Self {
        Value::F64(OrderedFloat(value))
    }

    pub fn str(value: impl Into<String>) -> Self {
        Value::Str(value.into())
    }

    /// The function this value refers to, if it is a function.
    pub fn as_func(&self) -> Option<&QualifiedName> {
        match self {
            Value::Func(qn) => Some(qn),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::I32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{:?}", v.0),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Func(qn) => write!(f, "<func {qn}>"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::f64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::str(v)
    }
}
