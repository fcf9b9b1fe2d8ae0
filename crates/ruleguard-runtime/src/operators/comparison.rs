//! Comparison operator execution

use super::coerce::{to_bool, to_number};
use crate::error::{Result, RuntimeError};
use ruleguard_core::{CompareOp, Value};
use std::cmp::Ordering;

/// Execute a comparison operation
pub(crate) fn execute_compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool> {
    match op {
        CompareOp::Eq => equals(left, right),
        CompareOp::Ne => equals(left, right).map(|eq| !eq),
        CompareOp::Gt => Ok(order(left, op, right)? == Ordering::Greater),
        CompareOp::Ge => Ok(order(left, op, right)? != Ordering::Less),
        CompareOp::Lt => Ok(order(left, op, right)? == Ordering::Less),
        CompareOp::Le => Ok(order(left, op, right)? != Ordering::Greater),
    }
}

fn equals(left: &Value, right: &Value) -> Result<bool> {
    match (left, right) {
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            Ok(to_number(left)? == to_number(right)?)
        }
        (Value::Bool(_), _) | (_, Value::Bool(_)) => Ok(to_bool(left)? == to_bool(right)?),
        (Value::String(l), Value::String(r)) => Ok(l == r),
        (l, r) => Ok(l == r),
    }
}

fn order(left: &Value, op: CompareOp, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => {
            tracing::trace!("Null operand in {:?} {} {:?}", left, op, right);
            Err(RuntimeError::NullOperand {
                op: op.symbol().to_string(),
            })
        }
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            let (l, r) = (to_number(left)?, to_number(right)?);
            l.partial_cmp(&r).ok_or_else(|| {
                RuntimeError::TypeError(format!("Cannot order {} and {}", l, r))
            })
        }
        (Value::String(l), Value::String(r)) => Ok(l.cmp(r)),
        _ => Err(RuntimeError::TypeError(format!(
            "Cannot compare {} and {} with {}",
            left.type_name(),
            right.type_name(),
            op
        ))),
    }
}
