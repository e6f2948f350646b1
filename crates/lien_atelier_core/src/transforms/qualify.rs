//! Identifier qualification.
//!
//! Rewrites every bare identifier into a [`Expr::ScopeRef`] so the interpreter
//! resolves it through the scope chain. Reserved words never reach this pass
//! as identifiers: the parser already turned them into literals or `this`.
//! Named properties (`a.name`) and object-literal keys are not identifiers
//! and stay untouched.

use lien_relief::ast::{Expr, Property};

/// Qualify all identifiers in an expression
pub fn qualify_identifiers(expr: Expr) -> Expr {
    match expr {
        Expr::Identifier(name) => Expr::ScopeRef(name),
        Expr::Member {
            object,
            property,
            null_safe,
        } => Expr::Member {
            object: Box::new(qualify_identifiers(*object)),
            property: match property {
                Property::Computed(key) => Property::Computed(Box::new(qualify_identifiers(*key))),
                named => named,
            },
            null_safe,
        },
        Expr::Array(items) => Expr::Array(items.into_iter().map(qualify_identifiers).collect()),
        Expr::Object(entries) => Expr::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, qualify_identifiers(value)))
                .collect(),
        ),
        Expr::Unary { op, operand } => Expr::Unary {
            op,
            operand: Box::new(qualify_identifiers(*operand)),
        },
        Expr::Binary { op, left, right } => Expr::Binary {
            op,
            left: Box::new(qualify_identifiers(*left)),
            right: Box::new(qualify_identifiers(*right)),
        },
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => Expr::Conditional {
            test: Box::new(qualify_identifiers(*test)),
            consequent: Box::new(qualify_identifiers(*consequent)),
            alternate: Box::new(qualify_identifiers(*alternate)),
        },
        Expr::Filter { name, input, args } => Expr::Filter {
            name,
            input: Box::new(qualify_identifiers(*input)),
            args: args.into_iter().map(qualify_identifiers).collect(),
        },
        other @ (Expr::Literal(_) | Expr::ScopeRef(_) | Expr::This | Expr::Invalid { .. }) => {
            other
        }
    }
}
