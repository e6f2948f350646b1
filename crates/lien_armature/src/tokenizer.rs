//! Expression tokenizer.
//!
//! Turns a binding expression into a flat token stream. The tokenizer knows
//! nothing about filters: the `|` pipe is split off before tokenizing, so a
//! lone `|` here is an error.

use lien_carton::{is_identifier_part, is_identifier_start, CompactString};
use thiserror::Error;

/// Character codes for fast comparison
pub mod char_codes {
    pub const DOUBLE_QUOTE: u8 = 0x22;
    pub const SINGLE_QUOTE: u8 = 0x27;
    pub const BACKSLASH: u8 = 0x5C;
    pub const DOT: u8 = 0x2E;
    pub const ZERO: u8 = 0x30;
    pub const NINE: u8 = 0x39;
}

use char_codes::*;

/// Punctuators and operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Dot,
    Comma,
    Colon,
    Question,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Not,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Lt,
    LtEq,
    Gt,
    GtEq,
    EqEq,
    NotEq,
    EqEqEq,
    NotEqEq,
    AndAnd,
    OrOr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(f64),
    String(String),
    Identifier(CompactString),
    Punct(Punct),
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Byte offset of the first character
    pub start: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at offset {offset}")]
pub struct TokenizeError {
    pub message: CompactString,
    pub offset: usize,
}

impl TokenizeError {
    fn new(message: &str, offset: usize) -> Self {
        Self {
            message: CompactString::new(message),
            offset,
        }
    }
}

/// Tokenize a full expression, ending with an `Eof` token.
pub fn tokenize(source: &str) -> Result<Vec<Token>, TokenizeError> {
    let bytes = source.as_bytes();
    let len = bytes.len();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < len {
        let c = bytes[i];
        if c.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;

        if is_identifier_start(c) {
            while i < len && is_identifier_part(bytes[i]) {
                i += 1;
            }
            tokens.push(Token {
                kind: TokenKind::Identifier(CompactString::new(&source[start..i])),
                start,
            });
            continue;
        }

        if is_digit(c) || (c == DOT && i + 1 < len && is_digit(bytes[i + 1])) {
            i = scan_number(bytes, i);
            let text = &source[start..i];
            let number = text
                .parse::<f64>()
                .map_err(|_| TokenizeError::new("malformed number", start))?;
            tokens.push(Token {
                kind: TokenKind::Number(number),
                start,
            });
            continue;
        }

        if c == SINGLE_QUOTE || c == DOUBLE_QUOTE {
            let (text, next) = scan_string(source, i)?;
            tokens.push(Token {
                kind: TokenKind::String(text),
                start,
            });
            i = next;
            continue;
        }

        let (punct, width) = scan_punct(bytes, i)
            .ok_or_else(|| TokenizeError::new("unexpected character", start))?;
        tokens.push(Token {
            kind: TokenKind::Punct(punct),
            start,
        });
        i += width;
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        start: len,
    });
    Ok(tokens)
}

#[inline]
fn is_digit(c: u8) -> bool {
    (ZERO..=NINE).contains(&c)
}

fn scan_number(bytes: &[u8], mut i: usize) -> usize {
    let len = bytes.len();
    while i < len && is_digit(bytes[i]) {
        i += 1;
    }
    if i < len && bytes[i] == DOT && i + 1 < len && is_digit(bytes[i + 1]) {
        i += 1;
        while i < len && is_digit(bytes[i]) {
            i += 1;
        }
    }
    if i < len && (bytes[i] == b'e' || bytes[i] == b'E') {
        let mut j = i + 1;
        if j < len && (bytes[j] == b'+' || bytes[j] == b'-') {
            j += 1;
        }
        if j < len && is_digit(bytes[j]) {
            i = j;
            while i < len && is_digit(bytes[i]) {
                i += 1;
            }
        }
    }
    i
}

/// Scan a quoted string starting at `start`, returning its unescaped content
/// and the offset just past the closing quote.
fn scan_string(source: &str, start: usize) -> Result<(String, usize), TokenizeError> {
    let bytes = source.as_bytes();
    let quote = bytes[start];
    let mut out = String::new();
    let mut chars = source[start + 1..].char_indices();

    while let Some((offset, ch)) = chars.next() {
        let at = start + 1 + offset;
        match ch {
            c if c as u32 == quote as u32 => return Ok((out, at + 1)),
            '\\' => match chars.next() {
                Some((_, 'n')) => out.push('\n'),
                Some((_, 't')) => out.push('\t'),
                Some((_, 'r')) => out.push('\r'),
                Some((_, other)) => out.push(other),
                None => break,
            },
            c => out.push(c),
        }
    }
    Err(TokenizeError::new("unterminated string literal", start))
}

fn scan_punct(bytes: &[u8], i: usize) -> Option<(Punct, usize)> {
    let at = |k: usize| bytes.get(i + k).copied().unwrap_or(0);
    let punct = match (at(0), at(1), at(2)) {
        (b'=', b'=', b'=') => (Punct::EqEqEq, 3),
        (b'!', b'=', b'=') => (Punct::NotEqEq, 3),
        (b'=', b'=', _) => (Punct::EqEq, 2),
        (b'!', b'=', _) => (Punct::NotEq, 2),
        (b'<', b'=', _) => (Punct::LtEq, 2),
        (b'>', b'=', _) => (Punct::GtEq, 2),
        (b'&', b'&', _) => (Punct::AndAnd, 2),
        (b'|', b'|', _) => (Punct::OrOr, 2),
        (b'.', _, _) => (Punct::Dot, 1),
        (b',', _, _) => (Punct::Comma, 1),
        (b':', _, _) => (Punct::Colon, 1),
        (b'?', _, _) => (Punct::Question, 1),
        (b'(', _, _) => (Punct::LParen, 1),
        (b')', _, _) => (Punct::RParen, 1),
        (b'[', _, _) => (Punct::LBracket, 1),
        (b']', _, _) => (Punct::RBracket, 1),
        (b'{', _, _) => (Punct::LBrace, 1),
        (b'}', _, _) => (Punct::RBrace, 1),
        (b'!', _, _) => (Punct::Not, 1),
        (b'+', _, _) => (Punct::Plus, 1),
        (b'-', _, _) => (Punct::Minus, 1),
        (b'*', _, _) => (Punct::Star, 1),
        (b'/', _, _) => (Punct::Slash, 1),
        (b'%', _, _) => (Punct::Percent, 1),
        (b'<', _, _) => (Punct::Lt, 1),
        (b'>', _, _) => (Punct::Gt, 1),
        _ => return None,
    };
    Some(punct)
}
