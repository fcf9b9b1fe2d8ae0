//! Arithmetic and concatenation execution

use super::coerce::to_number;
use crate::error::{Result, RuntimeError};
use ruleguard_core::{ArithmeticOp, Value};

/// Execute an arithmetic operation
pub(crate) fn execute_arithmetic(left: &Value, op: ArithmeticOp, right: &Value) -> Result<Value> {
    if left.is_null() || right.is_null() {
        tracing::trace!("Null operand in {:?} {} {:?}", left, op, right);
        return Err(RuntimeError::NullOperand {
            op: op.symbol().to_string(),
        });
    }

    let (l, r) = (to_number(left)?, to_number(right)?);
    let result = match op {
        ArithmeticOp::Add => l + r,
        ArithmeticOp::Sub => l - r,
        ArithmeticOp::Mul => l * r,
        ArithmeticOp::Div => {
            if r == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            l / r
        }
        ArithmeticOp::Mod => {
            if r == 0.0 {
                return Err(RuntimeError::DivisionByZero);
            }
            l % r
        }
    };
    Ok(Value::Number(result))
}

/// Execute `+=`: both operands in string form, concatenated
pub(crate) fn execute_concatenation(left: &Value, right: &Value) -> Value {
    Value::String(format!("{}{}", left, right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arithmetic() {
        let ten = Value::Number(10.0);
        let four = Value::Number(4.0);
        assert_eq!(
            execute_arithmetic(&ten, ArithmeticOp::Add, &four).unwrap(),
            Value::Number(14.0)
        );
        assert_eq!(
            execute_arithmetic(&ten, ArithmeticOp::Div, &four).unwrap(),
            Value::Number(2.5)
        );
        assert_eq!(
            execute_arithmetic(&ten, ArithmeticOp::Mod, &four).unwrap(),
            Value::Number(2.0)
        );
        assert_eq!(
            execute_arithmetic(&Value::from("3"), ArithmeticOp::Mul, &four).unwrap(),
            Value::Number(12.0)
        );
    }

    #[test]
    fn test_division_by_zero() {
        let zero = Value::Number(0.0);
        assert_eq!(
            execute_arithmetic(&Value::Number(1.0), ArithmeticOp::Div, &zero),
            Err(RuntimeError::DivisionByZero)
        );
        assert_eq!(
            execute_arithmetic(&Value::Number(1.0), ArithmeticOp::Mod, &zero),
            Err(RuntimeError::DivisionByZero)
        );
    }

    #[test]
    fn test_null_arithmetic_fails() {
        assert!(matches!(
            execute_arithmetic(&Value::Null, ArithmeticOp::Add, &Value::Number(1.0)),
            Err(RuntimeError::NullOperand { .. })
        ));
    }

    #[test]
    fn test_concatenation() {
        assert_eq!(
            execute_concatenation(&Value::from("v"), &Value::Number(2.0)),
            Value::from("v2")
        );
    }
}
