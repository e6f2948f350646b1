//! Binder errors.

use lien_relief::{EvaluationError, ExpressionError};
use thiserror::Error;

/// Anything that can go wrong while binding or synchronizing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
    /// A binding or repeat expression did not compile
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    /// A getter, setter or element write failed during a sync step
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

impl BindError {
    /// Whether this is a compile-time error
    pub fn is_expression(&self) -> bool {
        matches!(self, Self::Expression(_))
    }
}
