//! Null-safety transform.
//!
//! Marks every member access as null-safe, innermost first, so `a.b.c`
//! yields `null` when `a` or `a.b` is missing instead of failing.

use lien_relief::ast::{Expr, Property};

/// Mark all member accesses in an expression null-safe
pub fn mark_null_safe(expr: Expr) -> Expr {
    match expr {
        Expr::Member {
            object, property, ..
        } => Expr::Member {
            object: Box::new(mark_null_safe(*object)),
            property: match property {
                Property::Computed(key) => Property::Computed(Box::new(mark_null_safe(*key))),
                named => named,
            },
            null_safe: true,
        },
        Expr::Array(items) => Expr::Array(items.into_iter().map(mark_null_safe).collect()),
        Expr::Object(entries) => Expr::Object(
            entries
                .into_iter()
                .map(|(key, value)| (key, mark_null_safe(value)))
                .collect(),
        ),
        Expr::Unary { op, operand } => Expr::Unary {
            op,
            operand: Box::new(mark_null_safe(*operand)),
        },
        Expr::Binary { op, left, right } => Expr::Binary {
            op,
            left: Box::new(mark_null_safe(*left)),
            right: Box::new(mark_null_safe(*right)),
        },
        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => Expr::Conditional {
            test: Box::new(mark_null_safe(*test)),
            consequent: Box::new(mark_null_safe(*consequent)),
            alternate: Box::new(mark_null_safe(*alternate)),
        },
        Expr::Filter { name, input, args } => Expr::Filter {
            name,
            input: Box::new(mark_null_safe(*input)),
            args: args.into_iter().map(mark_null_safe).collect(),
        },
        leaf => leaf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lien_armature::parse_expression;

    fn all_null_safe(expr: &Expr) -> bool {
        match expr {
            Expr::Member {
                object,
                property,
                null_safe,
            } => {
                *null_safe
                    && all_null_safe(object)
                    && match property {
                        Property::Computed(key) => all_null_safe(key),
                        Property::Named(_) => true,
                    }
            }
            Expr::Binary { left, right, .. } => all_null_safe(left) && all_null_safe(right),
            _ => true,
        }
    }

    #[test]
    fn test_marks_every_depth() {
        let raw = parse_expression("a.b[c.d].e + f.g");
        assert!(!all_null_safe(&raw));
        assert!(all_null_safe(&mark_null_safe(raw)));
    }
}
