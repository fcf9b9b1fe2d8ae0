//! Rule validation example
//!
//! This example demonstrates:
//! - Structural checks with check_syntax
//! - Full validation against a visitor context
//! - Tolerating identifiers declared absent
//!
//! Run with `RUST_LOG=debug` to see ignored evaluation failures.

use ruleguard_runtime::MapResolver;
use ruleguard_validator::{check_syntax, RuleValidator, ValidationContext};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Rule Validation Example ===\n");

    let rules = [
        "${country == 'US' && age > 18}",
        "${country = 'US'}",
        "${name += '!'}",
        "${(age > 18}",
        "${}",
    ];

    println!("Syntax checks:");
    for rule in rules {
        match check_syntax(rule) {
            Ok(()) => println!("  ok      {}", rule),
            Err(e) => println!("  error   {}", e),
        }
    }

    let visitor = MapResolver::new().with("country", "US").with("age", 21);
    let validator = RuleValidator::new();
    let context = ValidationContext::new(&visitor).with_absent_identifier("segment");

    println!("\nValidation against {{country: US, age: 21}}, absent: [segment]:");
    for rule in [
        "${country == 'US' && age > 18}",
        "${segment == 'vip'}",
        "${language == 'en'}",
    ] {
        match validator.validate(rule, &context) {
            Ok(outcome) => println!("  ok      {} -> {:?}", rule, outcome),
            Err(e) => println!("  error   {}", e),
        }
    }
}
