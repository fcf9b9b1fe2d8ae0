//! Rule validation
//!
//! A rule passes through two stages:
//!
//! - the syntax guard parses the rule and rejects assignment, `+=` and `->`,
//!   which the expression language accepts but which make no sense in a
//!   boolean targeting predicate;
//! - the semantic validator, when evaluation is requested, checks that every
//!   identifier is resolvable or declared absent and then evaluates the rule.
//!
//! An evaluation failure is ignored when any leaf of the rule names an absent
//! identifier. That is a deliberately broad test: the failure need not be
//! caused by the absent identifier.
//!
//! # Example
//!
//! ```rust,ignore
//! use ruleguard_validator::{RuleValidator, ValidationContext};
//! use ruleguard_runtime::MapResolver;
//!
//! let validator = RuleValidator::new();
//! validator.check_syntax("${country == 'US'}")?;
//!
//! let resolver = MapResolver::new().with("country", "US");
//! let context = ValidationContext::new(&resolver).with_absent_identifier("age");
//! validator.validate("${country == 'US' && age > 18}", &context)?;
//! ```

use crate::error::{InvalidRuleError, Result};
use ruleguard_core::{Construct, Node, SyntaxTree, TreeError};
use ruleguard_parser::is_empty_rule;
use ruleguard_runtime::{
    CompiledExpression, ExpressionFactory, FunctionRegistry, ResultType, RuntimeError,
    VariableResolver,
};
use std::borrow::Cow;
use std::collections::HashSet;

/// Variables, absent identifiers and mode for one validation call
pub struct ValidationContext<'a> {
    resolver: &'a dyn VariableResolver,
    absent: Cow<'a, HashSet<String>>,
    evaluate: bool,
}

impl<'a> ValidationContext<'a> {
    /// Context that evaluates against `resolver` with no absent identifiers
    pub fn new(resolver: &'a dyn VariableResolver) -> Self {
        Self {
            resolver,
            absent: Cow::Owned(HashSet::new()),
            evaluate: true,
        }
    }

    /// Use a caller-owned absent identifier set
    pub fn with_absent(mut self, absent: &'a HashSet<String>) -> Self {
        self.absent = Cow::Borrowed(absent);
        self
    }

    /// Declare one more identifier as possibly absent
    pub fn with_absent_identifier(mut self, name: impl Into<String>) -> Self {
        self.absent.to_mut().insert(name.into());
        self
    }

    /// Enable or disable evaluation
    pub fn with_evaluate(mut self, evaluate: bool) -> Self {
        self.evaluate = evaluate;
        self
    }

    pub fn resolver(&self) -> &dyn VariableResolver {
        self.resolver
    }

    pub fn absent_identifiers(&self) -> &HashSet<String> {
        &self.absent
    }

    pub fn evaluate(&self) -> bool {
        self.evaluate
    }
}

/// Successful validation
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Nothing to validate once delimiters are removed
    Empty,
    /// Structurally valid, not evaluated
    Checked,
    /// Evaluated to the given value
    Evaluated(bool),
    /// Evaluation failed but the rule references an absent identifier
    Ignored { error: RuntimeError },
}

impl RuleOutcome {
    pub fn is_ignored(&self) -> bool {
        matches!(self, RuleOutcome::Ignored { .. })
    }

    /// Evaluated value, if the rule was evaluated successfully
    pub fn value(&self) -> Option<bool> {
        match self {
            RuleOutcome::Evaluated(value) => Some(*value),
            _ => None,
        }
    }
}

/// Stateless rule validator
///
/// Holds only the function library rules may reference; every call parses
/// the rule afresh, so one validator can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct RuleValidator {
    factory: ExpressionFactory,
}

impl RuleValidator {
    /// Validator with the standard `fn:` library
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_functions(functions: FunctionRegistry) -> Self {
        Self {
            factory: ExpressionFactory::with_functions(functions),
        }
    }

    pub fn functions(&self) -> &FunctionRegistry {
        self.factory.functions()
    }

    /// Structural check: the rule parses, compiles and uses no disallowed construct.
    ///
    /// Empty rules pass.
    pub fn check_syntax(&self, rule: &str) -> Result<()> {
        if is_empty_rule(rule) {
            return Ok(());
        }
        let compiled = self.compile(rule)?;
        check_constructs(rule, compiled.tree())
    }

    /// Full validation against a resolver.
    ///
    /// The syntax guard always runs. With `evaluate` set, identifiers are
    /// checked and the rule is evaluated; failures explained by `absent`
    /// are logged and treated as success.
    pub fn verify(
        &self,
        rule: &str,
        evaluate: bool,
        resolver: &dyn VariableResolver,
        absent: &HashSet<String>,
    ) -> Result<()> {
        let context = ValidationContext::new(resolver)
            .with_absent(absent)
            .with_evaluate(evaluate);
        self.validate(rule, &context).map(|_| ())
    }

    /// Same checks as [`verify`](Self::verify), reporting how the rule passed
    pub fn validate(&self, rule: &str, context: &ValidationContext<'_>) -> Result<RuleOutcome> {
        if is_empty_rule(rule) {
            tracing::trace!("Rule {} is empty", rule);
            return Ok(RuleOutcome::Empty);
        }

        let compiled = self.compile(rule)?;
        let tree = compiled.tree();
        check_constructs(rule, tree)?;

        if !context.evaluate() {
            return Ok(RuleOutcome::Checked);
        }

        let absent = context.absent_identifiers();
        check_identifiers(rule, tree, context.resolver(), absent)?;
        tracing::trace!("Rule {} has no undefined identifiers, evaluating", rule);

        let error = match compiled.evaluate_bool(context.resolver()) {
            Ok(value) => return Ok(RuleOutcome::Evaluated(value)),
            Err(error) => error,
        };
        if matches!(error, RuntimeError::Tree(_)) || !touches_absent(rule, tree, absent)? {
            return Err(InvalidRuleError::evaluation(rule, error));
        }

        let mut names: Vec<_> = absent.iter().map(String::as_str).collect();
        names.sort_unstable();
        tracing::debug!(
            "Rule {} contains uninstantiated identifier(s) in {:?}, ignore the failure: {}",
            rule,
            names,
            error
        );
        Ok(RuleOutcome::Ignored { error })
    }

    fn compile(&self, rule: &str) -> Result<CompiledExpression> {
        self.factory
            .compile(rule, ResultType::Boolean)
            .map_err(|err| InvalidRuleError::compile(rule, err))
    }
}

/// Why a construct walk stopped
enum Rejection {
    Construct(Construct),
    Tree(TreeError),
}

impl From<TreeError> for Rejection {
    fn from(err: TreeError) -> Self {
        Rejection::Tree(err)
    }
}

/// Reject the first disallowed construct found in pre-order
fn check_constructs(rule: &str, tree: &SyntaxTree) -> Result<()> {
    tree.walk(|node| match node.kind.disallowed_construct() {
        Some(construct) => Err(Rejection::Construct(construct)),
        None => Ok(()),
    })
    .map_err(|rejection| match rejection {
        Rejection::Construct(construct) => InvalidRuleError::DisallowedConstruct {
            construct,
            rule: rule.to_string(),
        },
        Rejection::Tree(err) => InvalidRuleError::internal(rule, err),
    })
}

/// Reject the first identifier that is neither defined nor absent
fn check_identifiers(
    rule: &str,
    tree: &SyntaxTree,
    resolver: &dyn VariableResolver,
    absent: &HashSet<String>,
) -> Result<()> {
    let undefined = |node: &Node| match node.image() {
        Some(name) if node.kind.is_identifier() => {
            !resolver.is_defined(name) && !absent.contains(name)
        }
        _ => false,
    };

    let found = tree
        .find(undefined)
        .map_err(|err| InvalidRuleError::internal(rule, err))?;

    match found.and_then(Node::image) {
        Some(identifier) => Err(InvalidRuleError::UndefinedIdentifier {
            identifier: identifier.to_string(),
            rule: rule.to_string(),
        }),
        None => Ok(()),
    }
}

/// True when any leaf image is an absent identifier
fn touches_absent(rule: &str, tree: &SyntaxTree, absent: &HashSet<String>) -> Result<bool> {
    if absent.is_empty() {
        return Ok(false);
    }
    let leaves = tree
        .leaves()
        .map_err(|err| InvalidRuleError::internal(rule, err))?;
    Ok(leaves
        .iter()
        .filter_map(|leaf| leaf.image())
        .any(|image| absent.contains(image)))
}

/// [`RuleValidator::check_syntax`] with the standard function library
pub fn check_syntax(rule: &str) -> Result<()> {
    RuleValidator::new().check_syntax(rule)
}

/// [`RuleValidator::verify`] with the standard function library
pub fn verify(
    rule: &str,
    evaluate: bool,
    resolver: &dyn VariableResolver,
    absent: &HashSet<String>,
) -> Result<()> {
    RuleValidator::new().verify(rule, evaluate, resolver, absent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use ruleguard_runtime::{EmptyResolver, MapResolver, Value};

    fn absent(names: &[&str]) -> HashSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_empty_rules_pass() {
        let validator = RuleValidator::new();
        for rule in ["", "   ", "${}", "${  }", "#{ }"] {
            assert!(validator.check_syntax(rule).is_ok(), "check_syntax({:?})", rule);
            assert!(validator
                .verify(rule, true, &EmptyResolver, &absent(&["x"]))
                .is_ok());
        }
    }

    #[test]
    fn test_check_syntax_rejects_constructs() {
        let validator = RuleValidator::new();
        let cases = [
            ("${x = 5}", Construct::Assignment),
            ("${a += 'b'}", Construct::Concatenation),
            ("${x -> x > 1}", Construct::Arrow),
            ("${country == 'US' && (flag = true)}", Construct::Assignment),
            ("${(name += 'x') || (flag = true)}", Construct::Concatenation),
        ];
        for (rule, expected) in cases {
            match validator.check_syntax(rule) {
                Err(InvalidRuleError::DisallowedConstruct { construct, rule: r }) => {
                    assert_eq!(construct, expected);
                    assert_eq!(r, rule);
                }
                other => panic!("Expected {} rejection for {}, got {:?}", expected, rule, other),
            }
        }
    }

    #[test]
    fn test_check_syntax_rejects_malformed() {
        let error = check_syntax("${country == }").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Syntax);
        assert_eq!(error.to_string(), "Rule ${country == } has invalid syntax.");
    }

    #[test]
    fn test_unknown_function_is_syntax_error() {
        let error = check_syntax("${geo:near(lat, lng)}").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn test_constructs_checked_without_evaluation() {
        let error = verify("${x = 1}", false, &EmptyResolver, &HashSet::new()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::DisallowedConstruct);
    }

    #[test]
    fn test_no_evaluation_skips_identifier_check() {
        let outcome = RuleValidator::new()
            .validate(
                "${unknownVar == 1}",
                &ValidationContext::new(&EmptyResolver).with_evaluate(false),
            )
            .unwrap();
        assert_eq!(outcome, RuleOutcome::Checked);
    }

    #[test]
    fn test_evaluated_value() {
        let resolver = MapResolver::new().with("country", "US");
        let outcome = RuleValidator::new()
            .validate("${country == 'US'}", &ValidationContext::new(&resolver))
            .unwrap();
        assert_eq!(outcome, RuleOutcome::Evaluated(true));
        assert_eq!(outcome.value(), Some(true));
    }

    #[test]
    fn test_undefined_identifier() {
        let error = verify("${unknownVar == 1}", true, &EmptyResolver, &HashSet::new()).unwrap_err();
        assert_eq!(
            error,
            InvalidRuleError::UndefinedIdentifier {
                identifier: "unknownVar".to_string(),
                rule: "${unknownVar == 1}".to_string(),
            }
        );
    }

    #[test]
    fn test_member_names_are_not_identifiers() {
        let user: Value = serde_json::json!({"plan": "gold"}).into();
        let resolver = MapResolver::new().with("user", user);
        assert!(verify("${user.plan == 'gold'}", true, &resolver, &HashSet::new()).is_ok());
    }

    #[test]
    fn test_absent_identifier_failure_is_ignored() {
        let outcome = RuleValidator::new()
            .validate(
                "${age > 18}",
                &ValidationContext::new(&EmptyResolver).with_absent_identifier("age"),
            )
            .unwrap();
        assert!(outcome.is_ignored());
        assert!(matches!(
            outcome,
            RuleOutcome::Ignored {
                error: RuntimeError::UnknownIdentifier(_)
            }
        ));
    }

    #[test]
    fn test_null_valued_absent_identifier_is_ignored() {
        let resolver = MapResolver::new().with("age", Value::Null);
        assert!(verify("${age > 18}", true, &resolver, &absent(&["age"])).is_ok());
    }

    #[test]
    fn test_unrelated_failure_still_ignored_when_absent_present() {
        let resolver = MapResolver::new().with("count", 3);
        let rule = "${count / 0 > 1 || age > 18}";
        assert!(verify(rule, true, &resolver, &absent(&["age"])).is_ok());
    }

    #[test]
    fn test_failure_without_absent_identifier_is_fatal() {
        let resolver = MapResolver::new().with("age", Value::Null);
        let error = verify("${age > 18}", true, &resolver, &HashSet::new()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Evaluation);
        assert_eq!(error.to_string(), "Failed to evaluate a rule ${age > 18}");
    }

    #[test]
    fn test_validator_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RuleValidator>();
    }
}
