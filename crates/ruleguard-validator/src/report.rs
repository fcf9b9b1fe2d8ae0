//! Batch validation of rule documents
//!
//! A [`RuleDocument`] groups the rules of one experiment (for example every
//! allocation rule of a test definition) with the context they are validated
//! against. [`RuleValidator::validate_document`] checks all of them and
//! collects the failures as diagnostics instead of stopping at the first one.

use crate::config::ValidatorConfig;
use crate::error::{ConfigError, ErrorKind, InvalidRuleError};
use crate::validator::{RuleOutcome, RuleValidator, ValidationContext};
use ruleguard_runtime::MapResolver;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

/// A named rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    pub rule: String,
}

/// Rules validated together against one context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDocument {
    #[serde(default)]
    pub context: MapResolver,

    #[serde(default)]
    pub absent_identifiers: HashSet<String>,

    #[serde(default = "default_evaluate")]
    pub evaluate: bool,

    pub rules: Vec<RuleEntry>,
}

fn default_evaluate() -> bool {
    true
}

impl RuleDocument {
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Document taking context, absent identifiers and mode from `config`
    pub fn from_config(config: &ValidatorConfig, rules: Vec<RuleEntry>) -> Self {
        Self {
            context: config.context.clone(),
            absent_identifiers: config.absent_identifiers.clone(),
            evaluate: config.evaluate,
            rules,
        }
    }

    fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::new(&self.context)
            .with_absent(&self.absent_identifiers)
            .with_evaluate(self.evaluate)
    }
}

/// Severity level for validation diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// A single diagnostic message from validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level
    pub severity: DiagnosticSeverity,

    /// Error/warning code (e.g., "E001", "W001")
    pub code: String,

    /// Human-readable message
    pub message: String,

    /// Id of the rule the diagnostic is about
    pub rule_id: String,

    /// Underlying cause, when there is one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
}

impl Diagnostic {
    pub fn error(code: impl Into<String>, rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Error,
            code: code.into(),
            message: message.into(),
            rule_id: rule_id.to_string(),
            cause: None,
        }
    }

    pub fn warning(code: impl Into<String>, rule_id: &str, message: impl Into<String>) -> Self {
        Self {
            severity: DiagnosticSeverity::Warning,
            code: code.into(),
            message: message.into(),
            rule_id: rule_id.to_string(),
            cause: None,
        }
    }

    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.cause = Some(cause.into());
        self
    }

    fn from_error(rule_id: &str, error: &InvalidRuleError) -> Self {
        let code = match error.kind() {
            ErrorKind::Syntax => "E001",
            ErrorKind::DisallowedConstruct => "E002",
            ErrorKind::UndefinedIdentifier => "E003",
            ErrorKind::Evaluation => "E004",
            ErrorKind::Internal => "E005",
        };
        let diagnostic = Self::error(code, rule_id, error.to_string());
        match std::error::Error::source(error) {
            Some(source) => diagnostic.with_cause(source.to_string()),
            None => diagnostic,
        }
    }
}

/// Result of validating a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Whether every rule is valid
    pub valid: bool,

    /// Number of rules checked
    pub rules_checked: usize,

    /// List of errors (severity = Error)
    pub errors: Vec<Diagnostic>,

    /// List of warnings (severity = Warning)
    pub warnings: Vec<Diagnostic>,

    /// Validation time in milliseconds
    pub validation_time_ms: u64,
}

impl ValidationReport {
    /// Errors reported for one rule
    pub fn errors_for<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Diagnostic> {
        self.errors.iter().filter(move |d| d.rule_id == rule_id)
    }
}

impl RuleValidator {
    /// Validate every rule of `document`, collecting all failures
    pub fn validate_document(&self, document: &RuleDocument) -> ValidationReport {
        let start = Instant::now();
        let context = document.validation_context();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        let mut seen = HashSet::new();

        for entry in &document.rules {
            if !seen.insert(entry.id.as_str()) {
                warnings.push(Diagnostic::warning(
                    "W002",
                    &entry.id,
                    format!("Rule id {} is used more than once", entry.id),
                ));
            }

            match self.validate(&entry.rule, &context) {
                Ok(RuleOutcome::Ignored { error }) => warnings.push(
                    Diagnostic::warning(
                        "W001",
                        &entry.id,
                        format!(
                            "Rule {} failed to evaluate, ignored because it references an absent identifier",
                            entry.rule
                        ),
                    )
                    .with_cause(error.to_string()),
                ),
                Ok(_) => {}
                Err(error) => errors.push(Diagnostic::from_error(&entry.id, &error)),
            }
        }

        tracing::debug!(
            "Validated {} rule(s): {} error(s), {} warning(s)",
            document.rules.len(),
            errors.len(),
            warnings.len()
        );

        ValidationReport {
            valid: errors.is_empty(),
            rules_checked: document.rules.len(),
            errors,
            warnings,
            validation_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}
