//! Unary operator execution

use super::coerce::{to_bool, to_number};
use crate::error::{Result, RuntimeError};
use ruleguard_core::Value;

/// `!a` / `not a`
pub(crate) fn execute_not(operand: &Value) -> Result<Value> {
    Ok(Value::Bool(!to_bool(operand)?))
}

/// `-a`
pub(crate) fn execute_negate(operand: &Value) -> Result<Value> {
    if operand.is_null() {
        return Err(RuntimeError::NullOperand { op: "-".to_string() });
    }
    Ok(Value::Number(-to_number(operand)?))
}

/// `empty a`
pub(crate) fn execute_empty(operand: &Value) -> Value {
    let empty = match operand {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    };
    Value::Bool(empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_not() {
        assert_eq!(execute_not(&Value::Bool(true)).unwrap(), Value::Bool(false));
        assert_eq!(execute_not(&Value::Null).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_negate() {
        assert_eq!(execute_negate(&Value::Number(2.0)).unwrap(), Value::Number(-2.0));
        assert!(execute_negate(&Value::Null).is_err());
    }

    #[test]
    fn test_empty() {
        assert_eq!(execute_empty(&Value::Null), Value::Bool(true));
        assert_eq!(execute_empty(&Value::from("")), Value::Bool(true));
        assert_eq!(execute_empty(&Value::Array(vec![])), Value::Bool(true));
        assert_eq!(execute_empty(&Value::Object(HashMap::new())), Value::Bool(true));
        assert_eq!(execute_empty(&Value::from("x")), Value::Bool(false));
        assert_eq!(execute_empty(&Value::Number(0.0)), Value::Bool(false));
    }
}
