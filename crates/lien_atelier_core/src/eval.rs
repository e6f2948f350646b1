//! Expression interpreter.
//!
//! Evaluates a transformed [`Expr`] against a scope chain. Operators follow
//! loose scripting semantics over the value model: `+` concatenates when
//! either side is a string, other arithmetic coerces to numbers, `&&` and
//! `||` return one of their operands.

use std::cmp::Ordering;

use lien_carton::value::{from_number, is_composite, is_truthy, loose_eq, member, to_number};
use lien_carton::{to_js_string, CompactString, Map, Value};
use lien_croquis::{ScopeId, Scopes};
use lien_relief::ast::{BinaryOp, Expr, Property, UnaryOp};
use lien_relief::{BinderOptions, EvaluationError};

use crate::filters::FilterLibrary;

/// Everything an expression can see while it is evaluated
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    pub scopes: &'a Scopes,
    pub scope: ScopeId,
    pub filters: &'a FilterLibrary,
    pub options: &'a BinderOptions,
}

impl<'a> EvalContext<'a> {
    pub fn new(
        scopes: &'a Scopes,
        scope: ScopeId,
        filters: &'a FilterLibrary,
        options: &'a BinderOptions,
    ) -> Self {
        Self {
            scopes,
            scope,
            filters,
            options,
        }
    }

    fn check_scope(&self) -> Result<(), EvaluationError> {
        if self.scopes.is_alive(self.scope) {
            Ok(())
        } else {
            Err(EvaluationError::DisposedScope(self.scope.as_u32()))
        }
    }
}

/// Evaluate an expression
pub fn evaluate(expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvaluationError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),

        Expr::Identifier(name) | Expr::ScopeRef(name) => {
            ctx.check_scope()?;
            Ok(ctx
                .scopes
                .lookup(ctx.scope, name)
                .cloned()
                .unwrap_or(Value::Null))
        }

        Expr::This => {
            ctx.check_scope()?;
            Ok(ctx.scopes.as_value(ctx.scope))
        }

        Expr::Member {
            object,
            property,
            null_safe,
        } => {
            let target = evaluate(object, ctx)?;
            let key = match property {
                Property::Named(name) => Value::String(name.to_string()),
                Property::Computed(key) => evaluate(key, ctx)?,
            };
            if target.is_null() {
                if *null_safe {
                    return Ok(Value::Null);
                }
                return Err(EvaluationError::NullAccess {
                    property: CompactString::from(to_js_string(&key)),
                });
            }
            Ok(member(&target, &key))
        }

        Expr::Array(items) => items
            .iter()
            .map(|item| evaluate(item, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),

        Expr::Object(entries) => {
            let mut map = Map::new();
            for (key, value) in entries {
                map.insert(key.to_string(), evaluate(value, ctx)?);
            }
            Ok(Value::Object(map))
        }

        Expr::Unary { op, operand } => {
            let value = evaluate(operand, ctx)?;
            Ok(match op {
                UnaryOp::Not => Value::Bool(!is_truthy(&value)),
                UnaryOp::Negate => from_number(-number_of(&value)),
                UnaryOp::Plus => from_number(number_of(&value)),
            })
        }

        Expr::Binary { op, left, right } => match op {
            BinaryOp::And => {
                let left = evaluate(left, ctx)?;
                if is_truthy(&left) {
                    evaluate(right, ctx)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                let left = evaluate(left, ctx)?;
                if is_truthy(&left) {
                    Ok(left)
                } else {
                    evaluate(right, ctx)
                }
            }
            _ => {
                let left = evaluate(left, ctx)?;
                let right = evaluate(right, ctx)?;
                Ok(binary(*op, &left, &right))
            }
        },

        Expr::Conditional {
            test,
            consequent,
            alternate,
        } => {
            if is_truthy(&evaluate(test, ctx)?) {
                evaluate(consequent, ctx)
            } else {
                evaluate(alternate, ctx)
            }
        }

        Expr::Filter { name, input, args } => {
            let input = evaluate(input, ctx)?;
            let args = args
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            ctx.filters.apply(name, &input, &args, ctx.options)
        }

        Expr::Invalid {
            expression,
            message,
        } => Err(EvaluationError::Syntax {
            expression: expression.clone(),
            message: message.clone(),
        }),
    }
}

#[inline]
fn number_of(value: &Value) -> f64 {
    to_number(value).unwrap_or(f64::NAN)
}

/// Composites take part in arithmetic and comparison through their string form
fn to_primitive(value: &Value) -> Value {
    if is_composite(value) {
        Value::String(to_js_string(value))
    } else {
        value.clone()
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            let (l, r) = (to_primitive(left), to_primitive(right));
            if l.is_string() || r.is_string() {
                Value::String(to_js_string(&l) + &to_js_string(&r))
            } else {
                from_number(number_of(&l) + number_of(&r))
            }
        }
        BinaryOp::Sub => from_number(number_of(left) - number_of(right)),
        BinaryOp::Mul => from_number(number_of(left) * number_of(right)),
        BinaryOp::Div => from_number(number_of(left) / number_of(right)),
        BinaryOp::Rem => from_number(number_of(left) % number_of(right)),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::LtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::GtEq => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Eq => Value::Bool(loose_eq(left, right)),
        BinaryOp::NotEq => Value::Bool(!loose_eq(left, right)),
        BinaryOp::StrictEq => Value::Bool(strict_eq(left, right)),
        BinaryOp::StrictNotEq => Value::Bool(!strict_eq(left, right)),
        // Short-circuiting operators are handled by `evaluate`
        BinaryOp::And | BinaryOp::Or => Value::Null,
    }
}

/// Relational comparison: lexical for two strings, numeric otherwise. `None`
/// when a side is not a number, which makes every relation false.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let (l, r) = (to_primitive(left), to_primitive(right));
    match (&l, &r) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => number_of(&l).partial_cmp(&number_of(&r)),
    }
}

/// `===`: same kind and same value. Composites compare by content.
fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => std::mem::discriminant(left) == std::mem::discriminant(right) && left == right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transforms::transform_expression;
    use lien_armature::parse_expression;
    use serde_json::json;

    fn eval_in(source: &str, scope: Value) -> Result<Value, EvaluationError> {
        let scopes = match scope {
            Value::Object(map) => Scopes::with_global(map),
            _ => Scopes::new(),
        };
        let filters = FilterLibrary::new();
        let options = BinderOptions::default();
        let ctx = EvalContext::new(&scopes, Scopes::global(), &filters, &options);
        evaluate(&transform_expression(parse_expression(source)), &ctx)
    }

    fn eval(source: &str) -> Value {
        eval_in(source, json!({})).unwrap()
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(eval("1 + 2 * 3"), json!(7));
        assert_eq!(eval("(1 + 2) * 3"), json!(9));
        assert_eq!(eval("7 % 4 - 1"), json!(2));
        assert_eq!(eval("1 / 4"), json!(0.25));
        assert_eq!(eval("-'3' + +'2'"), json!(-1));
    }

    #[test]
    fn test_string_concatenation() {
        assert_eq!(eval("'a' + 1"), json!("a1"));
        assert_eq!(eval("1 + 2 + 'x'"), json!("3x"));
        assert_eq!(eval("'n: ' + null"), json!("n: null"));
    }

    #[test]
    fn test_comparison() {
        assert_eq!(eval("2 < 10"), json!(true));
        assert_eq!(eval("'2' < '10'"), json!(false));
        assert_eq!(eval("'2' < 10"), json!(true));
        assert_eq!(eval("'x' < 1"), json!(false));
        assert_eq!(eval("'x' >= 1"), json!(false));
        assert_eq!(eval("3 >= 3"), json!(true));
    }

    #[test]
    fn test_equality() {
        assert_eq!(eval("'1' == 1"), json!(true));
        assert_eq!(eval("'1' === 1"), json!(false));
        assert_eq!(eval("1 === 1.0"), json!(true));
        assert_eq!(eval("null == undefined"), json!(true));
        assert_eq!(eval("null != 0"), json!(true));
        assert_eq!(eval("[1, 2] === [1, 2]"), json!(true));
    }

    #[test]
    fn test_logical_operators_return_operands() {
        assert_eq!(eval("0 || 'fallback'"), json!("fallback"));
        assert_eq!(eval("'a' && 'b'"), json!("b"));
        assert_eq!(eval("'' && missing.deep"), json!(""));
        assert_eq!(eval("!0"), json!(true));
        assert_eq!(eval("1 ? 'yes' : 'no'"), json!("yes"));
    }

    #[test]
    fn test_literals() {
        assert_eq!(
            eval("{a: 1, 'b c': [true, null]}"),
            json!({"a": 1, "b c": [true, null]})
        );
    }

    #[test]
    fn test_scope_references() {
        let scope = json!({"user": {"name": "Ann", "tags": ["x", "y"]}, "i": 1});
        assert_eq!(eval_in("user.name", scope.clone()).unwrap(), json!("Ann"));
        assert_eq!(eval_in("user.tags[i]", scope.clone()).unwrap(), json!("y"));
        assert_eq!(eval_in("user.tags.length", scope.clone()).unwrap(), json!(2));
        assert_eq!(eval_in("user['name'].length", scope).unwrap(), json!(3));
    }

    #[test]
    fn test_null_safe_at_any_depth() {
        assert_eq!(eval("a.b.c"), Value::Null);
        assert_eq!(eval("a.b.c.d.e"), Value::Null);
        assert_eq!(eval("a[b].c"), Value::Null);
    }

    #[test]
    fn test_strict_member_access_fails() {
        let scopes = Scopes::new();
        let filters = FilterLibrary::new();
        let options = BinderOptions::default();
        let ctx = EvalContext::new(&scopes, Scopes::global(), &filters, &options);
        // Raw parser output keeps member accesses strict
        let err = evaluate(&parse_expression("a.b"), &ctx).unwrap_err();
        assert_eq!(err, EvaluationError::NullAccess { property: "b".into() });
    }

    #[test]
    fn test_this_is_the_scope() {
        let scope = json!({"title": "t"});
        assert_eq!(eval_in("this", scope.clone()).unwrap(), scope);
        assert_eq!(eval_in("this.title", json!({"title": "t"})).unwrap(), json!("t"));
    }

    #[test]
    fn test_invalid_fails_on_evaluation() {
        let err = eval_in("a +", json!({})).unwrap_err();
        assert!(matches!(err, EvaluationError::Syntax { .. }));
    }

    #[test]
    fn test_disposed_scope() {
        let mut scopes = Scopes::new();
        let child = scopes.child(Scopes::global()).unwrap();
        scopes.dispose(child);
        let filters = FilterLibrary::new();
        let options = BinderOptions::default();
        let ctx = EvalContext::new(&scopes, child, &filters, &options);
        let err = evaluate(&Expr::ScopeRef("x".into()), &ctx).unwrap_err();
        assert_eq!(err, EvaluationError::DisposedScope(child.as_u32()));
    }
}
