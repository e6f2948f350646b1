//! Error types for compiling and evaluating binding expressions.

use lien_carton::CompactString;
use thiserror::Error;

/// Errors raised while compiling an expression.
///
/// Only the filter-pipe grammar and the repeat clause are checked at compile
/// time; a head expression that does not parse compiles fine and fails when
/// evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpressionError {
    /// Nothing to compile
    #[error("empty binding expression")]
    Empty,

    /// A `|` with nothing after it, or a leading `|`
    #[error("empty filter segment in `{expression}`")]
    EmptyFilter { expression: CompactString },

    /// The word after `|` is not an identifier
    #[error("invalid filter name `{name}` in `{expression}`")]
    InvalidFilterName {
        name: CompactString,
        expression: CompactString,
    },

    /// The repeat clause does not read `[key,] value in collection`
    #[error("invalid repeat expression `{0}`: expected `[key,] value in collection`")]
    InvalidRepeat(CompactString),
}

/// Errors raised while evaluating a compiled getter or setter, or while
/// writing a value to an element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    /// The expression did not parse
    #[error("syntax error in `{expression}`: {message}")]
    Syntax {
        expression: CompactString,
        message: CompactString,
    },

    /// A filter name that is not registered
    #[error("unknown filter `{0}`")]
    UnknownFilter(CompactString),

    /// A filter rejected its input or arguments
    #[error("filter `{filter}` failed: {message}")]
    Filter {
        filter: CompactString,
        message: String,
    },

    /// Strict member access on a missing object
    #[error("cannot read property `{property}` of null")]
    NullAccess { property: CompactString },

    /// The scope a binding points at no longer exists
    #[error("scope #{0} has been disposed")]
    DisposedScope(u32),

    /// The element a binding points at no longer exists
    #[error("element `{0}` not found")]
    MissingElement(CompactString),
}

impl EvaluationError {
    pub fn filter(filter: &str, message: impl Into<String>) -> Self {
        Self::Filter {
            filter: CompactString::new(filter),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ExpressionError::InvalidFilterName {
            name: "1x".into(),
            expression: "a | 1x".into(),
        };
        assert_eq!(err.to_string(), "invalid filter name `1x` in `a | 1x`");
        assert_eq!(
            EvaluationError::UnknownFilter("nope".into()).to_string(),
            "unknown filter `nope`"
        );
        assert_eq!(
            EvaluationError::filter("limitTo", "bad limit").to_string(),
            "filter `limitTo` failed: bad limit"
        );
    }
}
