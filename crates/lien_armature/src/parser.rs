//! Binding expression parser.
//!
//! Parsing happens in two stages. The source is first split on top-level `|`
//! into a head and filter segments, and each filter segment on top-level `:`
//! into a name and arguments. This stage is the only one that can fail: it
//! defines the filter-pipe grammar. Each piece is then parsed on its own by a
//! precedence-climbing expression parser; a piece that does not parse becomes
//! an [`Expr::Invalid`] node and only fails when evaluated.

use lien_carton::{is_identifier, CompactString};
use lien_relief::ast::{BinaryOp, Expr, FilterCall, Pipeline, Property, UnaryOp};
use lien_relief::errors::ExpressionError;
use serde_json::Value;

use crate::tokenizer::{tokenize, Punct, Token, TokenKind};

/// Parse a full binding expression with its filter chain.
pub fn parse_pipeline(source: &str) -> Result<Pipeline, ExpressionError> {
    let trimmed = source.trim();
    if trimmed.is_empty() {
        return Err(ExpressionError::Empty);
    }

    let segments = split_top_level(trimmed, b'|');
    let head_source = segments[0].trim();
    if head_source.is_empty() {
        return Err(ExpressionError::EmptyFilter {
            expression: CompactString::new(trimmed),
        });
    }

    let mut filters = Vec::with_capacity(segments.len() - 1);
    for segment in &segments[1..] {
        let segment = segment.trim();
        if segment.is_empty() {
            return Err(ExpressionError::EmptyFilter {
                expression: CompactString::new(trimmed),
            });
        }
        let parts = split_top_level(segment, b':');
        let name = parts[0].trim();
        if !is_identifier(name) {
            return Err(ExpressionError::InvalidFilterName {
                name: CompactString::new(name),
                expression: CompactString::new(trimmed),
            });
        }
        filters.push(FilterCall {
            name: CompactString::new(name),
            args: parts[1..].iter().map(|arg| parse_expression(arg)).collect(),
        });
    }

    Ok(Pipeline {
        source: CompactString::new(trimmed),
        head: parse_expression(head_source),
        filters,
    })
}

/// Parse a single expression (no filters). Never fails: unparsable input
/// yields [`Expr::Invalid`].
pub fn parse_expression(source: &str) -> Expr {
    let source = source.trim();
    let invalid = |message: String| Expr::Invalid {
        expression: CompactString::new(source),
        message: CompactString::from(message),
    };

    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(err) => return invalid(err.to_string()),
    };
    let mut parser = ExprParser { tokens, pos: 0 };
    match parser.parse_complete() {
        Ok(expr) => expr,
        Err(message) => invalid(message),
    }
}

/// Split `source` on `delimiter` bytes that sit outside quotes and brackets.
///
/// For `|`, a doubled `||` is the logical operator and never splits. For `:`,
/// a colon answering an open `?` belongs to the conditional and never splits.
fn split_top_level(source: &str, delimiter: u8) -> Vec<&str> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut pending_ternaries = 0usize;
    let mut quote: Option<u8> = None;
    let mut start = 0;
    let mut i = 0;

    while i < len {
        let c = bytes[i];
        if let Some(q) = quote {
            if c == b'\\' {
                i += 2;
                continue;
            }
            if c == q {
                quote = None;
            }
            i += 1;
            continue;
        }
        match c {
            b'\'' | b'"' => quote = Some(c),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' => depth = depth.saturating_sub(1),
            b'|' if delimiter == b'|' && depth == 0 => {
                if bytes.get(i + 1) == Some(&b'|') {
                    i += 2;
                    continue;
                }
                parts.push(&source[start..i]);
                start = i + 1;
            }
            b'?' if depth == 0 => pending_ternaries += 1,
            b':' if delimiter == b':' && depth == 0 => {
                if pending_ternaries > 0 {
                    pending_ternaries -= 1;
                } else {
                    parts.push(&source[start..i]);
                    start = i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    parts.push(&source[start..]);
    parts
}

struct ExprParser {
    tokens: Vec<Token>,
    pos: usize,
}

type ParseResult = Result<Expr, String>;

impl ExprParser {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.pos.min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        kind
    }

    fn eat(&mut self, punct: Punct) -> bool {
        if self.peek() == &TokenKind::Punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: Punct) -> Result<(), String> {
        if self.eat(punct) {
            Ok(())
        } else {
            Err(format!("expected {punct:?}, found {}", self.describe()))
        }
    }

    fn describe(&self) -> String {
        let token = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        match &token.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Number(n) => format!("number {n} at offset {}", token.start),
            TokenKind::String(s) => format!("string '{s}' at offset {}", token.start),
            TokenKind::Identifier(name) => format!("`{name}` at offset {}", token.start),
            TokenKind::Punct(p) => format!("{p:?} at offset {}", token.start),
        }
    }

    fn parse_complete(&mut self) -> ParseResult {
        let expr = self.parse_conditional()?;
        if self.peek() != &TokenKind::Eof {
            return Err(format!("unexpected {}", self.describe()));
        }
        Ok(expr)
    }

    fn parse_conditional(&mut self) -> ParseResult {
        let test = self.parse_binary(1)?;
        if !self.eat(Punct::Question) {
            return Ok(test);
        }
        let consequent = self.parse_conditional()?;
        self.expect(Punct::Colon)?;
        let alternate = self.parse_conditional()?;
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        })
    }

    fn binary_op(&self) -> Option<BinaryOp> {
        let TokenKind::Punct(p) = self.peek() else {
            return None;
        };
        Some(match p {
            Punct::Plus => BinaryOp::Add,
            Punct::Minus => BinaryOp::Sub,
            Punct::Star => BinaryOp::Mul,
            Punct::Slash => BinaryOp::Div,
            Punct::Percent => BinaryOp::Rem,
            Punct::Lt => BinaryOp::Lt,
            Punct::LtEq => BinaryOp::LtEq,
            Punct::Gt => BinaryOp::Gt,
            Punct::GtEq => BinaryOp::GtEq,
            Punct::EqEq => BinaryOp::Eq,
            Punct::NotEq => BinaryOp::NotEq,
            Punct::EqEqEq => BinaryOp::StrictEq,
            Punct::NotEqEq => BinaryOp::StrictNotEq,
            Punct::AndAnd => BinaryOp::And,
            Punct::OrOr => BinaryOp::Or,
            _ => return None,
        })
    }

    fn parse_binary(&mut self, min_precedence: u8) -> ParseResult {
        let mut left = self.parse_unary()?;
        while let Some(op) = self.binary_op() {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }
            self.advance();
            let right = self.parse_binary(precedence + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult {
        let op = match self.peek() {
            TokenKind::Punct(Punct::Not) => UnaryOp::Not,
            TokenKind::Punct(Punct::Minus) => UnaryOp::Negate,
            TokenKind::Punct(Punct::Plus) => UnaryOp::Plus,
            _ => return self.parse_postfix(),
        };
        self.advance();
        let operand = self.parse_unary()?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_postfix(&mut self) -> ParseResult {
        let mut expr = self.parse_primary()?;
        loop {
            if self.eat(Punct::Dot) {
                match self.advance() {
                    TokenKind::Identifier(name) => {
                        expr = Expr::Member {
                            object: Box::new(expr),
                            property: Property::Named(name),
                            null_safe: false,
                        };
                    }
                    _ => return Err("expected property name after `.`".to_string()),
                }
            } else if self.eat(Punct::LBracket) {
                let index = self.parse_conditional()?;
                self.expect(Punct::RBracket)?;
                expr = Expr::Member {
                    object: Box::new(expr),
                    property: Property::Computed(Box::new(index)),
                    null_safe: false,
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_primary(&mut self) -> ParseResult {
        match self.advance() {
            TokenKind::Number(n) => Ok(Expr::Literal(lien_carton::value::from_number(n))),
            TokenKind::String(s) => Ok(Expr::Literal(Value::String(s))),
            TokenKind::Identifier(name) => Ok(match name.as_str() {
                "true" => Expr::Literal(Value::Bool(true)),
                "false" => Expr::Literal(Value::Bool(false)),
                "null" | "undefined" => Expr::Literal(Value::Null),
                "this" => Expr::This,
                _ => Expr::Identifier(name),
            }),
            TokenKind::Punct(Punct::LParen) => {
                let inner = self.parse_conditional()?;
                self.expect(Punct::RParen)?;
                Ok(inner)
            }
            TokenKind::Punct(Punct::LBracket) => {
                let mut items = Vec::new();
                if !self.eat(Punct::RBracket) {
                    loop {
                        items.push(self.parse_conditional()?);
                        if self.eat(Punct::RBracket) {
                            break;
                        }
                        self.expect(Punct::Comma)?;
                    }
                }
                Ok(Expr::Array(items))
            }
            TokenKind::Punct(Punct::LBrace) => self.parse_object(),
            TokenKind::Eof => Err("unexpected end of input".to_string()),
            other => Err(format!("unexpected token {other:?}")),
        }
    }

    fn parse_object(&mut self) -> ParseResult {
        let mut entries = Vec::new();
        if self.eat(Punct::RBrace) {
            return Ok(Expr::Object(entries));
        }
        loop {
            let key = match self.advance() {
                TokenKind::Identifier(name) => name,
                TokenKind::String(s) => CompactString::from(s),
                TokenKind::Number(n) => CompactString::from(lien_carton::f64_to_string(n)),
                other => return Err(format!("invalid object key {other:?}")),
            };
            self.expect(Punct::Colon)?;
            entries.push((key, self.parse_conditional()?));
            if self.eat(Punct::RBrace) {
                return Ok(Expr::Object(entries));
            }
            self.expect(Punct::Comma)?;
        }
    }
}
