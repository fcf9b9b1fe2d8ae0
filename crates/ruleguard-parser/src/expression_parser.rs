//! Expression parser
//!
//! Parses rule text into a [`SyntaxTree`].
//!
//! Supported syntax, lowest precedence first:
//! - Assignment: `a = b` (right associative)
//! - Lambda: `x -> body`, `(x, y) -> body`
//! - Ternary: `cond ? a : b`
//! - Logical: `||` / `or`, `&&` / `and`
//! - Equality: `==` / `eq`, `!=` / `ne`
//! - Relational: `<` / `lt`, `>` / `gt`, `<=` / `le`, `>=` / `ge`
//! - Concatenation: `+=`
//! - Arithmetic: `+`, `-`, `*`, `/` / `div`, `%` / `mod`
//! - Unary: `-`, `!` / `not`, `empty`
//! - Postfix: `a.b`, `a.b(args)`, `a[b]`
//! - Primary: literals, identifiers, `ns:fn(args)`, `fn(args)`, `(expr)`, `[a, b]`
//!
//! Assignment, concatenation and lambdas are parsed so that callers can
//! reject them with a precise message instead of a generic syntax error.
//!
//! `&&` and `||` chains become a single node with one child per operand.
//! Both the parser recursion and the depth of the resulting tree are capped
//! at [`MAX_DEPTH`], so hostile nesting fails with [`ParseError::TooDeep`]
//! instead of exhausting the stack.

use crate::delimiters::body_range;
use crate::error::{ParseError, Result};
use crate::lexer::{tokenize, Token, TokenKind};
use ruleguard_core::ast::{
    ArithmeticOp, CompareOp, LiteralKind, Node, NodeId, NodeKind, Span, SyntaxTree, TreeBuilder,
};

/// Deepest nesting accepted, counted in tree levels and in nested
/// sub-expressions (parentheses, unary operators, ternary branches)
pub const MAX_DEPTH: usize = 64;

/// Expression parser
pub struct ExpressionParser;

impl ExpressionParser {
    /// Parse rule text, with or without `${ }` delimiters.
    ///
    /// Spans in the resulting tree refer to positions in `text`.
    pub fn parse(text: &str) -> Result<SyntaxTree> {
        let (start, end) = body_range(text);
        let tokens = tokenize(text, start, end)?;
        if tokens.is_empty() {
            return Err(ParseError::Empty);
        }

        let mut parser = Parser {
            source: text,
            tokens,
            pos: 0,
            builder: TreeBuilder::new(),
            depths: Vec::new(),
            nesting: 0,
        };
        let root = parser.parse_expression()?;
        if let Some(token) = parser.tokens.get(parser.pos) {
            return Err(ParseError::TrailingInput {
                found: token.kind.describe(),
                pos: token.span.start,
            });
        }
        Ok(parser.builder.finish(root)?)
    }
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    builder: TreeBuilder,
    // Height of each pushed node, indexed like the builder arena
    depths: Vec<usize>,
    nesting: usize,
}

impl<'a> Parser<'a> {
    // ---- token helpers ----

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> Option<Token> {
        if self.check(kind) {
            self.advance()
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        match self.tokens.get(self.pos) {
            Some(token) if token.kind == kind => {
                let token = token.clone();
                self.pos += 1;
                Ok(token)
            }
            Some(token) => Err(ParseError::UnexpectedToken {
                found: token.kind.describe(),
                expected: format!("'{}'", kind.describe()),
                pos: token.span.start,
            }),
            None => Err(ParseError::UnexpectedEnd {
                expected: format!("'{}'", kind.describe()),
            }),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.tokens.get(self.pos) {
            Some(token) => ParseError::UnexpectedToken {
                found: token.kind.describe(),
                expected: expected.to_string(),
                pos: token.span.start,
            },
            None => ParseError::UnexpectedEnd {
                expected: expected.to_string(),
            },
        }
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|t| t.span.start)
            .unwrap_or(self.source.len())
    }

    /// Run `parse` one nesting level deeper
    fn descend(&mut self, parse: fn(&mut Self) -> Result<NodeId>) -> Result<NodeId> {
        if self.nesting >= MAX_DEPTH {
            return Err(ParseError::TooDeep {
                pos: self.position(),
            });
        }
        self.nesting += 1;
        let result = parse(self);
        self.nesting -= 1;
        result
    }

    // Tokens are adjacent when no whitespace separates them
    fn adjacent(&self, first: usize, second: usize) -> bool {
        match (self.tokens.get(first), self.tokens.get(second)) {
            (Some(a), Some(b)) => a.span.end == b.span.start,
            _ => false,
        }
    }

    // ---- node helpers ----

    fn span_of(&self, id: NodeId) -> Result<Span> {
        Ok(self.builder.node(id)?.span)
    }

    fn push(&mut self, node: Node) -> Result<NodeId> {
        let mut depth = 1;
        for child in &node.children {
            let child_depth = self.depths.get(child.0).copied().unwrap_or_default();
            depth = depth.max(child_depth + 1);
        }
        if depth > MAX_DEPTH {
            return Err(ParseError::TooDeep {
                pos: node.span.start,
            });
        }
        let id = self.builder.push(node)?;
        self.depths.push(depth);
        Ok(id)
    }

    fn leaf(&mut self, kind: NodeKind, span: Span) -> Result<NodeId> {
        let image = &self.source[span.start..span.end];
        let node = Node::new(kind, span).with_image(image);
        self.push(node)
    }

    fn branch(&mut self, kind: NodeKind, children: Vec<NodeId>) -> Result<NodeId> {
        let mut span: Option<Span> = None;
        for child in &children {
            let child_span = self.span_of(*child)?;
            span = Some(match span {
                Some(s) => s.join(child_span),
                None => child_span,
            });
        }
        let node = Node::new(kind, span.unwrap_or_default()).with_children(children);
        self.push(node)
    }

    fn binary(&mut self, kind: NodeKind, left: NodeId, right: NodeId) -> Result<NodeId> {
        self.branch(kind, vec![left, right])
    }

    // ---- grammar ----

    fn parse_expression(&mut self) -> Result<NodeId> {
        self.descend(Self::parse_assign)
    }

    fn parse_assign(&mut self) -> Result<NodeId> {
        let target = self.parse_lambda()?;
        if self.eat(&TokenKind::Assign).is_some() {
            let value = self.descend(Self::parse_assign)?;
            return self.binary(NodeKind::Assign, target, value);
        }
        Ok(target)
    }

    fn parse_lambda(&mut self) -> Result<NodeId> {
        let Some(param_count) = self.lambda_parameters_ahead() else {
            return self.parse_ternary();
        };

        let start = self.tokens[self.pos].span.start;
        let parenthesized = self.eat(&TokenKind::LParen).is_some();
        let mut params = Vec::with_capacity(param_count);
        for i in 0..param_count {
            if i > 0 {
                self.expect(TokenKind::Comma)?;
            }
            let token = self.advance().ok_or_else(|| self.unexpected("parameter"))?;
            params.push(self.leaf(NodeKind::Identifier, token.span)?);
        }
        if parenthesized {
            self.expect(TokenKind::RParen)?;
        }
        let arrow = self.expect(TokenKind::Arrow)?;

        let params = if params.is_empty() {
            self.push(Node::new(
                NodeKind::LambdaParameters,
                Span::new(start, arrow.span.start),
            ))?
        } else {
            self.branch(NodeKind::LambdaParameters, params)?
        };
        let body = self.descend(Self::parse_lambda)?;
        self.binary(NodeKind::Arrow, params, body)
    }

    /// Number of lambda parameters if the upcoming tokens form a parameter
    /// list followed by `->`.
    fn lambda_parameters_ahead(&self) -> Option<usize> {
        match self.peek()? {
            TokenKind::Ident(_) if self.peek_at(1) == Some(&TokenKind::Arrow) => Some(1),
            TokenKind::LParen => {
                let mut offset = 1;
                let mut count = 0;
                if self.peek_at(offset) == Some(&TokenKind::RParen) {
                    return (self.peek_at(offset + 1) == Some(&TokenKind::Arrow)).then_some(0);
                }
                loop {
                    match self.peek_at(offset)? {
                        TokenKind::Ident(_) => count += 1,
                        _ => return None,
                    }
                    offset += 1;
                    match self.peek_at(offset)? {
                        TokenKind::Comma => offset += 1,
                        TokenKind::RParen => {
                            return (self.peek_at(offset + 1) == Some(&TokenKind::Arrow))
                                .then_some(count);
                        }
                        _ => return None,
                    }
                }
            }
            _ => None,
        }
    }

    fn parse_ternary(&mut self) -> Result<NodeId> {
        let condition = self.parse_or()?;
        if self.eat(&TokenKind::Question).is_some() {
            let when_true = self.descend(Self::parse_ternary)?;
            self.expect(TokenKind::Colon)?;
            let when_false = self.descend(Self::parse_ternary)?;
            return self.branch(NodeKind::Ternary, vec![condition, when_true, when_false]);
        }
        Ok(condition)
    }

    fn parse_or(&mut self) -> Result<NodeId> {
        let mut operands = vec![self.parse_and()?];
        while self.eat(&TokenKind::Or).is_some() {
            operands.push(self.parse_and()?);
        }
        self.logical(NodeKind::Or, operands)
    }

    fn parse_and(&mut self) -> Result<NodeId> {
        let mut operands = vec![self.parse_equality()?];
        while self.eat(&TokenKind::And).is_some() {
            operands.push(self.parse_equality()?);
        }
        self.logical(NodeKind::And, operands)
    }

    fn logical(&mut self, kind: NodeKind, mut operands: Vec<NodeId>) -> Result<NodeId> {
        match operands.len() {
            1 => Ok(operands.remove(0)),
            _ => self.branch(kind, operands),
        }
    }

    fn parse_equality(&mut self) -> Result<NodeId> {
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::EqEq) => CompareOp::Eq,
                Some(TokenKind::NotEq) => CompareOp::Ne,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_relational()?;
            left = self.binary(NodeKind::Compare(op), left, right)?;
        }
    }

    fn parse_relational(&mut self) -> Result<NodeId> {
        let mut left = self.parse_concatenation()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Lt) => CompareOp::Lt,
                Some(TokenKind::Gt) => CompareOp::Gt,
                Some(TokenKind::Le) => CompareOp::Le,
                Some(TokenKind::Ge) => CompareOp::Ge,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_concatenation()?;
            left = self.binary(NodeKind::Compare(op), left, right)?;
        }
    }

    fn parse_concatenation(&mut self) -> Result<NodeId> {
        let mut left = self.parse_additive()?;
        while self.eat(&TokenKind::PlusAssign).is_some() {
            let right = self.parse_additive()?;
            left = self.binary(NodeKind::Concatenation, left, right)?;
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<NodeId> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Plus) => ArithmeticOp::Add,
                Some(TokenKind::Minus) => ArithmeticOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(NodeKind::Arithmetic(op), left, right)?;
        }
    }

    fn parse_multiplicative(&mut self) -> Result<NodeId> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Some(TokenKind::Star) => ArithmeticOp::Mul,
                Some(TokenKind::Slash) => ArithmeticOp::Div,
                Some(TokenKind::Percent) => ArithmeticOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = self.binary(NodeKind::Arithmetic(op), left, right)?;
        }
    }

    fn parse_unary(&mut self) -> Result<NodeId> {
        let kind = match self.peek() {
            Some(TokenKind::Minus) => NodeKind::Negate,
            Some(TokenKind::Not) => NodeKind::Not,
            Some(TokenKind::Empty) => NodeKind::Empty,
            _ => return self.parse_postfix(),
        };
        let op = self.advance().ok_or_else(|| self.unexpected("operand"))?;
        let operand = self.descend(Self::parse_unary)?;
        let span = op.span.join(self.span_of(operand)?);
        self.push(Node::new(kind, span).with_children(vec![operand]))
    }

    fn parse_postfix(&mut self) -> Result<NodeId> {
        let mut target = self.parse_primary()?;
        loop {
            if self.eat(&TokenKind::Dot).is_some() {
                let name = match self.tokens.get(self.pos) {
                    Some(Token {
                        kind: TokenKind::Ident(_),
                        span,
                    }) => *span,
                    _ => return Err(self.unexpected("property name")),
                };
                self.pos += 1;
                let member = self.leaf(NodeKind::Member, name)?;
                if self.check(&TokenKind::LParen) {
                    let args = self.parse_arguments()?;
                    target = self.branch(NodeKind::MethodCall, vec![target, member, args])?;
                } else {
                    target = self.binary(NodeKind::Property, target, member)?;
                }
            } else if self.eat(&TokenKind::LBracket).is_some() {
                let index = self.parse_expression()?;
                let close = self.expect(TokenKind::RBracket)?;
                let span = self.span_of(target)?.join(close.span);
                target = self.push(
                    Node::new(NodeKind::Index, span).with_children(vec![target, index]),
                )?;
            } else {
                return Ok(target);
            }
        }
    }

    fn parse_primary(&mut self) -> Result<NodeId> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.unexpected("expression"))?;

        match &token.kind {
            TokenKind::Number(_) => {
                self.pos += 1;
                self.leaf(NodeKind::Literal(LiteralKind::Number), token.span)
            }
            TokenKind::Str(_) => {
                self.pos += 1;
                self.leaf(NodeKind::Literal(LiteralKind::String), token.span)
            }
            TokenKind::True | TokenKind::False => {
                self.pos += 1;
                self.leaf(NodeKind::Literal(LiteralKind::Boolean), token.span)
            }
            TokenKind::Null => {
                self.pos += 1;
                self.leaf(NodeKind::Literal(LiteralKind::Null), token.span)
            }
            TokenKind::Ident(_) => self.parse_identifier_or_function(token),
            TokenKind::LParen => {
                self.pos += 1;
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_identifier_or_function(&mut self, token: Token) -> Result<NodeId> {
        // ns:name(args), written without spaces so `a ? b : c(d)` stays a ternary
        let qualified = matches!(self.peek_at(1), Some(TokenKind::Colon))
            && matches!(self.peek_at(2), Some(TokenKind::Ident(_)))
            && matches!(self.peek_at(3), Some(TokenKind::LParen))
            && self.adjacent(self.pos, self.pos + 1)
            && self.adjacent(self.pos + 1, self.pos + 2);
        if qualified {
            let name_span = token.span.join(self.tokens[self.pos + 2].span);
            self.pos += 3;
            return self.parse_function(name_span);
        }

        if matches!(self.peek_at(1), Some(TokenKind::LParen)) {
            self.pos += 1;
            return self.parse_function(token.span);
        }

        self.pos += 1;
        self.leaf(NodeKind::Identifier, token.span)
    }

    fn parse_function(&mut self, name_span: Span) -> Result<NodeId> {
        let image = self.source[name_span.start..name_span.end].to_string();
        let (args, close) = self.parse_argument_list()?;
        let node = Node::new(NodeKind::Function, name_span.join(close))
            .with_image(image)
            .with_children(args);
        self.push(node)
    }

    fn parse_arguments(&mut self) -> Result<NodeId> {
        let open = self.tokens.get(self.pos).map(|t| t.span).unwrap_or_default();
        let (args, close) = self.parse_argument_list()?;
        let node = Node::new(NodeKind::Arguments, open.join(close)).with_children(args);
        self.push(node)
    }

    /// `( expr, ... )`, returning the arguments and the closing paren span
    fn parse_argument_list(&mut self) -> Result<(Vec<NodeId>, Span)> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if let Some(close) = self.eat(&TokenKind::RParen) {
            return Ok((args, close.span));
        }
        loop {
            args.push(self.parse_expression()?);
            if self.eat(&TokenKind::Comma).is_some() {
                continue;
            }
            let close = self.expect(TokenKind::RParen)?;
            return Ok((args, close.span));
        }
    }

    fn parse_list(&mut self) -> Result<NodeId> {
        let open = self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        let close = if let Some(close) = self.eat(&TokenKind::RBracket) {
            close
        } else {
            loop {
                items.push(self.parse_expression()?);
                if self.eat(&TokenKind::Comma).is_some() {
                    continue;
                }
                break self.expect(TokenKind::RBracket)?;
            }
        };
        let node = Node::new(NodeKind::List, open.span.join(close.span)).with_children(items);
        self.push(node)
    }
}
