//! Unit tests for the rule expression parser
//!
//! Exercises the public parser API with rules shaped like real targeting rules.

use ruleguard_core::{CompareOp, LiteralKind, NodeKind};
use ruleguard_parser::*;

// =============================================================================
// Targeting rule shapes
// =============================================================================

#[test]
fn test_parse_country_and_age_rule() {
    let tree = ExpressionParser::parse("${country == 'US' && age > 18}").unwrap();
    let root = tree.root().unwrap();
    assert_eq!(root.kind, NodeKind::And);

    let identifiers: Vec<_> = tree
        .leaves()
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == NodeKind::Identifier)
        .filter_map(|n| n.image())
        .collect();
    assert_eq!(identifiers, vec!["country", "age"]);
}

#[test]
fn test_parse_long_allowlist_rule() {
    let rule = format!("${{{}}}", vec!["country == 'x'"; 10_000].join(" || "));
    let tree = ExpressionParser::parse(&rule).unwrap();
    let root = tree.root().unwrap();
    assert_eq!(root.kind, NodeKind::Or);
    assert_eq!(root.children.len(), 10_000);
}

#[test]
fn test_parse_deep_parentheses_fails_cleanly() {
    let rule = format!("${{{}a{}}}", "(".repeat(5_000), ")".repeat(5_000));
    assert!(matches!(
        ExpressionParser::parse(&rule),
        Err(ParseError::TooDeep { .. })
    ));
}

#[test]
fn test_parse_language_list_membership() {
    let result = ExpressionParser::parse("${fn:contains(['en', 'fr'], lang)}");
    assert!(result.is_ok(), "Failed to parse: {:?}", result.err());

    let tree = result.unwrap();
    let list = tree.find(|n| n.kind == NodeKind::List).unwrap().unwrap();
    assert_eq!(list.children.len(), 2);
}

#[test]
fn test_parse_nested_properties() {
    let tree = ExpressionParser::parse("${ua.os.version >= 14}").unwrap();
    assert_eq!(tree.root().unwrap().kind, NodeKind::Compare(CompareOp::Ge));

    let members: Vec<_> = tree
        .leaves()
        .unwrap()
        .into_iter()
        .filter(|n| n.kind == NodeKind::Member)
        .filter_map(|n| n.image())
        .collect();
    assert_eq!(members, vec!["os", "version"]);
}

#[test]
fn test_parse_literals() {
    let tree = ExpressionParser::parse("${[null, true, 2.5, \"x\"]}").unwrap();
    let kinds: Vec<_> = tree.leaves().unwrap().into_iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Literal(LiteralKind::Null),
            NodeKind::Literal(LiteralKind::Boolean),
            NodeKind::Literal(LiteralKind::Number),
            NodeKind::Literal(LiteralKind::String),
        ]
    );
}

#[test]
fn test_parse_ternary_rule() -> anyhow::Result<()> {
    let tree = ExpressionParser::parse("${isLoggedIn ? accountAge > 30 : false}")?;
    assert_eq!(tree.root()?.kind, NodeKind::Ternary);
    assert_eq!(tree.root()?.children.len(), 3);
    Ok(())
}

// =============================================================================
// Delimiters
// =============================================================================

#[test]
fn test_delimited_and_bare_rules_agree_on_shape() {
    let delimited = ExpressionParser::parse("${a < 3}").unwrap();
    let bare = ExpressionParser::parse("a < 3").unwrap();
    assert_eq!(delimited.root().unwrap().kind, bare.root().unwrap().kind);
    assert_eq!(delimited.len(), bare.len());
}

#[test]
fn test_empty_rule_helpers() {
    assert!(is_empty_rule("${ }"));
    assert!(is_blank(strip_delimiters("  ")));
    assert_eq!(strip_delimiters("${x}"), "x");
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_parse_errors_report_positions() {
    match ExpressionParser::parse("${a == 'US}") {
        Err(ParseError::UnterminatedString { pos }) => assert_eq!(pos, 7),
        other => panic!("Expected unterminated string, got {:?}", other),
    }

    match ExpressionParser::parse("${a > > 1}") {
        Err(ParseError::UnexpectedToken { found, pos, .. }) => {
            assert_eq!(found, ">");
            assert_eq!(pos, 6);
        }
        other => panic!("Expected unexpected token, got {:?}", other),
    }
}

#[test]
fn test_single_ampersand_is_rejected() {
    let result = ExpressionParser::parse("${a & b}");
    assert!(matches!(result, Err(ParseError::UnexpectedChar { ch: '&', .. })));
}

#[test]
fn test_unwrapped_garbage_is_rejected() {
    assert!(ExpressionParser::parse("${a} trailing").is_err());
}
