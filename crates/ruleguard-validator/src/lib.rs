//! ruleguard validator - syntax guard and semantic validator for targeting rules
//!
//! High-level API used when publishing a rule (structural check plus an
//! evaluation against a representative context) and when checking rules
//! in bulk.

pub mod builder;
pub mod config;
pub mod error;
pub mod report;
pub mod validator;

// Re-export main types
pub use builder::RuleValidatorBuilder;
pub use config::{FunctionLibrary, ValidatorConfig};
pub use error::{ConfigError, ErrorKind, InvalidRuleError, Result};
pub use report::{Diagnostic, DiagnosticSeverity, RuleDocument, RuleEntry, ValidationReport};
pub use validator::{check_syntax, verify, RuleOutcome, RuleValidator, ValidationContext};

// Re-export commonly used types from dependencies
pub use ruleguard_core::{Construct, Value};
pub use ruleguard_parser::ParseError;
pub use ruleguard_runtime::{EmptyResolver, MapResolver, RuntimeError, VariableResolver};
