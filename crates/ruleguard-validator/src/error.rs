//! Validator error types

use ruleguard_core::{Construct, TreeError};
use ruleguard_parser::ParseError;
use ruleguard_runtime::RuntimeError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection of a rule, tagged by kind
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidRuleError {
    /// Rule text does not parse or does not compile
    #[error("Rule {rule} has invalid syntax.")]
    Syntax {
        rule: String,
        #[source]
        source: RuntimeError,
    },

    /// Rule uses assignment, `+=` or `->`
    #[error("Rule {rule} contains {}", construct_advice(*.construct))]
    DisallowedConstruct { construct: Construct, rule: String },

    /// Identifier neither resolvable nor declared absent
    #[error("Rule {rule} contains undefined identifier : {identifier}")]
    UndefinedIdentifier { identifier: String, rule: String },

    /// Evaluation failed and no absent identifier explains it
    #[error("Failed to evaluate a rule {rule}")]
    Evaluation {
        rule: String,
        #[source]
        source: RuntimeError,
    },

    /// Fault in the validator itself rather than in the rule
    #[error("Internal error while validating rule {rule}: {message}")]
    Internal { rule: String, message: String },
}

fn construct_advice(construct: Construct) -> String {
    let operator = construct.operator();
    match construct {
        Construct::Assignment => {
            format!("an assignment, be sure to use '{operator}{operator}' for comparisons.")
        }
        Construct::Concatenation => format!("a concatenation, do not use '{operator}'."),
        Construct::Arrow => format!("an arrow, do not use '{operator}' for comparisons."),
    }
}

/// Error kind tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Syntax,
    DisallowedConstruct,
    UndefinedIdentifier,
    Evaluation,
    Internal,
}

impl InvalidRuleError {
    /// Classify a compile failure. Tree faults are internal, not authoring errors.
    pub(crate) fn compile(rule: &str, source: RuntimeError) -> Self {
        match source {
            RuntimeError::Tree(err) | RuntimeError::Parse(ParseError::Tree(err)) => {
                Self::internal(rule, err)
            }
            source => InvalidRuleError::Syntax {
                rule: rule.to_string(),
                source,
            },
        }
    }

    /// Classify an evaluation failure that no absent identifier explains
    pub(crate) fn evaluation(rule: &str, source: RuntimeError) -> Self {
        match source {
            RuntimeError::Tree(err) => Self::internal(rule, err),
            source => InvalidRuleError::Evaluation {
                rule: rule.to_string(),
                source,
            },
        }
    }

    pub(crate) fn internal(rule: &str, err: TreeError) -> Self {
        InvalidRuleError::Internal {
            rule: rule.to_string(),
            message: err.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            InvalidRuleError::Syntax { .. } => ErrorKind::Syntax,
            InvalidRuleError::DisallowedConstruct { .. } => ErrorKind::DisallowedConstruct,
            InvalidRuleError::UndefinedIdentifier { .. } => ErrorKind::UndefinedIdentifier,
            InvalidRuleError::Evaluation { .. } => ErrorKind::Evaluation,
            InvalidRuleError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Offending rule text
    pub fn rule(&self) -> &str {
        match self {
            InvalidRuleError::Syntax { rule, .. }
            | InvalidRuleError::DisallowedConstruct { rule, .. }
            | InvalidRuleError::UndefinedIdentifier { rule, .. }
            | InvalidRuleError::Evaluation { rule, .. }
            | InvalidRuleError::Internal { rule, .. } => rule,
        }
    }

    /// Offending identifier, for undefined identifier errors
    pub fn identifier(&self) -> Option<&str> {
        match self {
            InvalidRuleError::UndefinedIdentifier { identifier, .. } => Some(identifier),
            _ => None,
        }
    }
}

/// Configuration loading error
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for validation
pub type Result<T> = std::result::Result<T, InvalidRuleError>;
