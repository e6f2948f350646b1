//! Relief - The sculptured expression surface for Lien.
//!
//! This crate defines the data shapes every other layer agrees on:
//!
//! - [`ast`]: the expression tree produced by `lien_armature` and rewritten
//!   and interpreted by `lien_atelier_core`
//! - [`errors`]: compile-time and evaluation-time error types
//! - [`options`]: the formatting options shared by the filter library

pub mod ast;
pub mod errors;
pub mod options;

pub use ast::*;
pub use errors::{EvaluationError, ExpressionError};
pub use options::BinderOptions;
