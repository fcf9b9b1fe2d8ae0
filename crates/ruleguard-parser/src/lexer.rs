//! Tokenizer for rule expressions

use crate::error::{ParseError, Result};
use ruleguard_core::Span;

/// Token kinds. Keyword operators (`and`, `eq`, `div`, ...) share the kind of
/// their symbolic spelling.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    True,
    False,
    Null,
    Empty,
    Not,
    And,
    Or,
    EqEq,
    NotEq,
    Lt,
    Gt,
    Le,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    PlusAssign,
    Assign,
    Arrow,
    Question,
    Colon,
    Comma,
    Dot,
    LParen,
    RParen,
    LBracket,
    RBracket,
}

impl TokenKind {
    pub fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => name.clone(),
            TokenKind::Number(n) => n.to_string(),
            TokenKind::Str(s) => format!("'{}'", s),
            TokenKind::True => "true".to_string(),
            TokenKind::False => "false".to_string(),
            TokenKind::Null => "null".to_string(),
            TokenKind::Empty => "empty".to_string(),
            TokenKind::Not => "!".to_string(),
            TokenKind::And => "&&".to_string(),
            TokenKind::Or => "||".to_string(),
            TokenKind::EqEq => "==".to_string(),
            TokenKind::NotEq => "!=".to_string(),
            TokenKind::Lt => "<".to_string(),
            TokenKind::Gt => ">".to_string(),
            TokenKind::Le => "<=".to_string(),
            TokenKind::Ge => ">=".to_string(),
            TokenKind::Plus => "+".to_string(),
            TokenKind::Minus => "-".to_string(),
            TokenKind::Star => "*".to_string(),
            TokenKind::Slash => "/".to_string(),
            TokenKind::Percent => "%".to_string(),
            TokenKind::PlusAssign => "+=".to_string(),
            TokenKind::Assign => "=".to_string(),
            TokenKind::Arrow => "->".to_string(),
            TokenKind::Question => "?".to_string(),
            TokenKind::Colon => ":".to_string(),
            TokenKind::Comma => ",".to_string(),
            TokenKind::Dot => ".".to_string(),
            TokenKind::LParen => "(".to_string(),
            TokenKind::RParen => ")".to_string(),
            TokenKind::LBracket => "[".to_string(),
            TokenKind::RBracket => "]".to_string(),
        }
    }
}

/// Decode a quoted string literal image (`'it\'s'` -> `it's`).
///
/// Returns `None` when the image is not a complete quoted literal.
pub fn unquote(image: &str) -> Option<String> {
    let quote = image.chars().next().filter(|c| *c == '\'' || *c == '"')?;
    if image.len() < 2 || !image.ends_with(quote) {
        return None;
    }
    let body = &image[1..image.len() - 1];
    let mut value = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some(e) if e == '\'' || e == '"' || e == '\\' => value.push(e),
            Some(e) => {
                value.push('\\');
                value.push(e);
            }
            None => value.push('\\'),
        }
    }
    Some(value)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize `source[start..end]`, keeping spans relative to `source`
pub fn tokenize(source: &str, start: usize, end: usize) -> Result<Vec<Token>> {
    Lexer {
        source,
        pos: start,
        end,
    }
    .run()
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    end: usize,
}

impl<'a> Lexer<'a> {
    fn run(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }

            let start = self.pos;
            let kind = if c.is_ascii_digit() {
                self.number()?
            } else if c == '\'' || c == '"' {
                self.string(c)?
            } else if c.is_alphabetic() || c == '_' || c == '$' && self.is_ident_dollar() {
                self.word()
            } else {
                self.symbol(c)?
            };

            tokens.push(Token {
                kind,
                span: Span::new(start, self.pos),
            });
        }
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.source[self.pos..self.end].chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.source[self.pos..self.end].chars().nth(offset)
    }

    // `$` only starts an identifier when followed by an identifier char
    fn is_ident_dollar(&self) -> bool {
        matches!(self.peek_at(1), Some(c) if c.is_alphanumeric() || c == '_')
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn eat_digits(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn number(&mut self) -> Result<TokenKind> {
        let start = self.pos;
        self.eat_digits();
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            self.pos += 1;
            self.eat_digits();
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            let save = self.pos;
            self.pos += 1;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.pos += 1;
            }
            if matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                self.eat_digits();
            } else {
                self.pos = save;
            }
        }

        let text = &self.source[start..self.pos];
        text.parse::<f64>()
            .map(TokenKind::Number)
            .map_err(|_| ParseError::InvalidNumber {
                text: text.to_string(),
                pos: start,
            })
    }

    fn string(&mut self, quote: char) -> Result<TokenKind> {
        let start = self.pos;
        self.bump();
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString { pos: start }),
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(ParseError::UnterminatedString { pos: start });
                    }
                }
                Some(c) if c == quote => break,
                Some(_) => {}
            }
        }
        unquote(&self.source[start..self.pos])
            .map(TokenKind::Str)
            .ok_or(ParseError::UnterminatedString { pos: start })
    }

    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        self.bump();
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_' || c == '$') {
            self.bump();
        }

        match &self.source[start..self.pos] {
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "null" => TokenKind::Null,
            "empty" => TokenKind::Empty,
            "not" => TokenKind::Not,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "eq" => TokenKind::EqEq,
            "ne" => TokenKind::NotEq,
            "lt" => TokenKind::Lt,
            "gt" => TokenKind::Gt,
            "le" => TokenKind::Le,
            "ge" => TokenKind::Ge,
            "div" => TokenKind::Slash,
            "mod" => TokenKind::Percent,
            name => TokenKind::Ident(name.to_string()),
        }
    }

    fn symbol(&mut self, c: char) -> Result<TokenKind> {
        let pos = self.pos;
        self.bump();
        let kind = match c {
            '=' if self.eat('=') => TokenKind::EqEq,
            '=' => TokenKind::Assign,
            '!' if self.eat('=') => TokenKind::NotEq,
            '!' => TokenKind::Not,
            '<' if self.eat('=') => TokenKind::Le,
            '<' => TokenKind::Lt,
            '>' if self.eat('=') => TokenKind::Ge,
            '>' => TokenKind::Gt,
            '&' if self.eat('&') => TokenKind::And,
            '|' if self.eat('|') => TokenKind::Or,
            '+' if self.eat('=') => TokenKind::PlusAssign,
            '+' => TokenKind::Plus,
            '-' if self.eat('>') => TokenKind::Arrow,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '?' => TokenKind::Question,
            ':' => TokenKind::Colon,
            ',' => TokenKind::Comma,
            '.' => TokenKind::Dot,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            other => return Err(ParseError::UnexpectedChar { ch: other, pos }),
        };
        Ok(kind)
    }
}
