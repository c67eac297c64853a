//! Comparison rules for plan values.
//!
//! Plan values are [`serde_json::Value`]s. [`values_equal`] compares them
//! structurally, treating numbers as equal when they denote the same number
//! regardless of whether they were written as integers or floats.

use std::any;
use std::fmt;

use serde_json::{Map, Number, Value};

/// The expected side of an equality assertion.
///
/// Most callers never name this type: anything convertible into a
/// [`serde_json::Value`] (strings, numbers, booleans, vectors, maps) converts
/// into `Expected` implicitly. [`Expected::callable`] marks a function value,
/// which can never be compared.
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    /// A plain value.
    Value(Value),
    /// A function value, identified by its type name.
    Callable(&'static str),
}

impl Expected {
    /// Marks `f` as the expected operand. Comparisons against it always fail
    /// with an invalid-comparison error.
    #[must_use]
    pub fn callable<F>(_f: &F) -> Self {
        Self::Callable(any::type_name::<F>())
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{}", Rendered(v)),
            Self::Callable(name) => write!(f, "func {name}"),
        }
    }
}

macro_rules! expected_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expected {
                fn from(value: $ty) -> Self {
                    Self::Value(Value::from(value))
                }
            }
        )*
    };
}

expected_from!(
    &str, String, bool, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64,
    Map<String, Value>, Number,
);

impl From<Value> for Expected {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<&Value> for Expected {
    fn from(value: &Value) -> Self {
        Self::Value(value.clone())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Expected {
    fn from(values: Vec<T>) -> Self {
        Self::Value(Value::Array(values.into_iter().map(Into::into).collect()))
    }
}

impl<T: Into<Value>> From<Option<T>> for Expected {
    fn from(value: Option<T>) -> Self {
        Self::Value(value.map_or(Value::Null, Into::into))
    }
}

/// Compares two values structurally.
///
/// Numbers compare by numeric value (`2`, `2u64` and `2.0` are equal), arrays
/// element-wise and objects by key set and per-key value. Strings never
/// coerce to numbers.
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => numbers_equal(a, b),
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(k, v)| b.get(k).is_some_and(|other| values_equal(v, other)))
        }
        _ => false,
    }
}

#[allow(clippy::float_cmp)]
fn numbers_equal(left: &Number, right: &Number) -> bool {
    if let (Some(a), Some(b)) = (left.as_i64(), right.as_i64()) {
        return a == b;
    }
    if let (Some(a), Some(b)) = (left.as_u64(), right.as_u64()) {
        return a == b;
    }
    match (left.as_f64(), right.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

/// Renders a value for failure messages: strings without quotes, everything
/// else as compact JSON.
pub(crate) struct Rendered<'a>(pub(crate) &'a Value);

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{other}"),
        }
    }
}
