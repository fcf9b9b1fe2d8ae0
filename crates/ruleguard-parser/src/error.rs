//! Parser error types

use thiserror::Error;

/// Parser error
///
/// Offsets are byte positions in the original rule text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Nothing to parse after removing delimiters
    #[error("Empty expression")]
    Empty,

    /// Character that cannot start any token
    #[error("Unexpected character '{ch}' at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    /// String literal without closing quote
    #[error("Unterminated string literal starting at {pos}")]
    UnterminatedString { pos: usize },

    /// Malformed number literal
    #[error("Invalid number literal '{text}' at {pos}")]
    InvalidNumber { text: String, pos: usize },

    /// Token that does not fit the grammar here
    #[error("Unexpected '{found}' at {pos}, expected {expected}")]
    UnexpectedToken {
        found: String,
        expected: String,
        pos: usize,
    },

    /// Input ended in the middle of an expression
    #[error("Unexpected end of expression, expected {expected}")]
    UnexpectedEnd { expected: String },

    /// Complete expression followed by more tokens
    #[error("Unexpected trailing input '{found}' at {pos}")]
    TrailingInput { found: String, pos: usize },

    /// Expression nested deeper than the parser accepts
    #[error("Expression nested too deeply at {pos}")]
    TooDeep { pos: usize },

    /// Tree bookkeeping fault
    #[error("Syntax tree error: {0}")]
    Tree(#[from] ruleguard_core::TreeError),
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
