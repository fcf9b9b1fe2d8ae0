//! Rule document validation example
//!
//! Validates every allocation rule of an experiment in one pass and prints
//! the report as JSON.

use ruleguard_validator::{RuleDocument, RuleValidator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "demos/rules/allocation_rules.yaml".to_string());
    let content = std::fs::read_to_string(&path)?;
    let document = RuleDocument::from_yaml_str(&content)?;

    println!("Validating {} rule(s) from {}\n", document.rules.len(), path);
    let report = RuleValidator::new().validate_document(&document);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.valid {
        std::process::exit(1);
    }
    Ok(())
}
