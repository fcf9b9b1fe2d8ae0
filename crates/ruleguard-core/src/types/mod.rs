//! Value types shared by the parser, runtime and validator

pub mod value;

pub use value::Value;
