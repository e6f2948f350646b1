//! AST transforms applied by the compiler.
//!
//! The parser produces expressions exactly as written. Before they can be
//! evaluated against a scope chain they go through two rewrites:
//!
//! - [`qualify`]: bare identifiers become scope references
//! - [`null_safe`]: every member access yields `null` on a missing object
//!
//! [`lower_pipeline`] then folds the filter chain around the head expression.

pub mod null_safe;
pub mod qualify;

use lien_relief::ast::{Expr, Pipeline};

pub use null_safe::mark_null_safe;
pub use qualify::qualify_identifiers;

/// Apply every transform to a single expression
pub fn transform_expression(expr: Expr) -> Expr {
    mark_null_safe(qualify_identifiers(expr))
}

/// Turn `head | f1:a | f2:b` into `f2(f1(head, a), b)`, transforming the head
/// and every argument on the way.
pub fn lower_pipeline(pipeline: Pipeline) -> Expr {
    pipeline
        .filters
        .into_iter()
        .fold(transform_expression(pipeline.head), |input, filter| {
            Expr::Filter {
                name: filter.name,
                input: Box::new(input),
                args: filter.args.into_iter().map(transform_expression).collect(),
            }
        })
}
