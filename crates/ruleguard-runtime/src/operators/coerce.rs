//! Type coercion rules

use crate::error::{Result, RuntimeError};
use ruleguard_core::Value;

/// Coerce a value to a boolean.
///
/// `null` and `""` are false, strings are true only when they spell `true`
/// (ignoring case), anything else is a coercion error.
pub fn to_bool(value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Null => Ok(false),
        Value::String(s) => Ok(s.eq_ignore_ascii_case("true")),
        other => Err(coercion(other, "boolean")),
    }
}

/// Coerce a non-null value to a number. Strings are parsed.
pub fn to_number(value: &Value) -> Result<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        Value::String(s) => s.trim().parse::<f64>().map_err(|_| coercion(value, "number")),
        other => Err(coercion(other, "number")),
    }
}

pub(crate) fn coercion(value: &Value, target: &'static str) -> RuntimeError {
    RuntimeError::Coercion {
        value: value.to_string(),
        value_type: value.type_name(),
        target,
    }
}
