//! Scalar comparison and numeric coercion for decision rules.
//!
//! Numbers compare numerically whatever their JSON representation
//! (`1` equals `1.0`), strings compare lexicographically, and any other
//! pairing is unordered.

use std::cmp::Ordering;

use serde_json::Value;

/// Strict equality, except that numbers compare by value.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(_), Value::Number(_)) => compare_values(left, right) == Some(Ordering::Equal),
        _ => left == right,
    }
}

/// Order two scalars, or `None` when they cannot be ordered.
pub fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_i64(), r.as_i64()) {
            (Some(l), Some(r)) => Some(l.cmp(&r)),
            _ => l.as_f64()?.partial_cmp(&r.as_f64()?),
        },
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// Convert a number or a numeric string to a finite `f64`.
pub fn coerce_f64(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    f.is_finite().then_some(f)
}

/// [`coerce_f64`], wrapped back into a JSON number.
pub fn coerce_number(value: &Value) -> Option<Value> {
    coerce_f64(value)
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
