//! Operator execution modules
//!
//! This module contains the implementation of operator evaluation for the
//! tree-walking evaluator.

mod arithmetic;
mod coerce;
mod comparison;
mod unary;

pub(crate) use arithmetic::{execute_arithmetic, execute_concatenation};
pub use coerce::{to_bool, to_number};
pub(crate) use comparison::execute_compare;
pub(crate) use unary::{execute_empty, execute_negate, execute_not};
