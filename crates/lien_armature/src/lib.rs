//! Armature - The structural framework of Lien.
//!
//! Parsers that give structure to raw text:
//!
//! - [`tokenizer`] / [`parser`]: binding expressions and their filter chains
//! - [`repeat`]: the `[key,] value in collection` clause
//! - [`markup`]: element trees for the in-memory host
//!
//! # Example
//!
//! ```
//! use lien_armature::parse_pipeline;
//!
//! let pipeline = parse_pipeline("items | orderBy:'-date' | limitTo:5").unwrap();
//! assert_eq!(pipeline.filters.len(), 2);
//! ```

pub mod markup;
pub mod parser;
pub mod repeat;
pub mod tokenizer;

pub use markup::{parse_markup, MarkupElement, MarkupError, MarkupNode};
pub use parser::{parse_expression, parse_pipeline};
pub use repeat::parse_repeat;
pub use tokenizer::{tokenize, Token, TokenKind, TokenizeError};
