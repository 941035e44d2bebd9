//! Structural equality and display formatting for attribute values.
//!
//! Values are plain JSON. Equality ignores object key order, compares numbers
//! by numeric value (`1 == 1.0`, `-0 == 0`) and treats an absent value as
//! JSON `null`.

use serde_json::{Number, Value};

/// Deep equality of two optional values, absent == `null`.
pub fn values_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    json_equal(a.unwrap_or(&Value::Null), b.unwrap_or(&Value::Null))
}

pub fn json_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => numbers_equal(x, y),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(l, r)| json_equal(l, r))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(key, l)| y.get(key).is_some_and(|r| json_equal(l, r)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (as_integer(x), as_integer(y)) {
        (Some(l), Some(r)) => l == r,
        _ => match (x.as_f64(), y.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => false,
        },
    }
}

fn as_integer(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

/// Compact single-line rendering used in conflict notices.
pub fn format_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
