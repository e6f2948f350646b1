//! Binding expression compiler.
//!
//! Compiling an expression yields a [`Getter`] that evaluates it against a
//! scope chain and, when the expression is a plain dotted path without
//! filters, a [`Setter`] that writes back through the same path.
//!
//! ```text
//! "user.name | uppercase"
//!         ↓ parse_pipeline
//! Pipeline { head: user.name, filters: [uppercase] }
//!         ↓ qualify + null-safe + lower
//! uppercase(scope.user?.name)          → Getter only
//!
//! "user.profile.name"                  → Getter + Setter
//! ```

use lien_armature::parse_pipeline;
use lien_carton::{CompactString, Value};
use lien_croquis::{ScopeId, Scopes};
use lien_relief::ast::{Expr, Path};
use lien_relief::{EvaluationError, ExpressionError};

use crate::eval::{evaluate, EvalContext};
use crate::transforms::lower_pipeline;

/// Reads a binding's model value
#[derive(Debug, Clone, PartialEq)]
pub struct Getter {
    expr: Expr,
}

impl Getter {
    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluate against the scope in `ctx`; resolution is late-bound
    pub fn get(&self, ctx: &EvalContext<'_>) -> Result<Value, EvaluationError> {
        evaluate(&self.expr, ctx)
    }
}

/// Writes a binding's model value back through a dotted path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setter {
    path: Path,
}

impl Setter {
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Assign `value`; returns whether the write happened
    pub fn set(
        &self,
        scopes: &mut Scopes,
        scope: ScopeId,
        value: Value,
    ) -> Result<bool, EvaluationError> {
        scopes.set_path(scope, &self.path, value)
    }
}

/// A compiled binding expression
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledExpression {
    source: CompactString,
    getter: Getter,
    setter: Option<Setter>,
}

impl CompiledExpression {
    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn getter(&self) -> &Getter {
        &self.getter
    }

    #[inline]
    pub fn setter(&self) -> Option<&Setter> {
        self.setter.as_ref()
    }

    /// Whether the expression can be written back to
    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.setter.is_some()
    }

    /// Drop the setter, keeping a read-only expression
    pub fn read_only(mut self) -> Self {
        self.setter = None;
        self
    }

    pub fn into_parts(self) -> (Getter, Option<Setter>) {
        (self.getter, self.setter)
    }
}

/// Compile a binding expression.
///
/// Only a malformed filter pipe is rejected here. A head or argument that
/// does not parse compiles into a getter that fails when evaluated.
pub fn compile(source: &str) -> Result<CompiledExpression, ExpressionError> {
    let pipeline = parse_pipeline(source)?;
    let setter = if pipeline.filters.is_empty() {
        pipeline.head.as_path().map(|path| Setter { path })
    } else {
        None
    };
    tracing::trace!(
        source = %pipeline.source,
        assignable = setter.is_some(),
        "compiled binding expression"
    );
    Ok(CompiledExpression {
        source: pipeline.source.clone(),
        setter,
        getter: Getter {
            expr: lower_pipeline(pipeline),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::FilterLibrary;
    use lien_relief::BinderOptions;
    use serde_json::json;

    #[test]
    fn test_setter_eligibility() {
        for source in [
            "user.name | uppercase",
            "'literal'",
            "42",
            "true",
            "a + b",
            "!done",
            "items[0]",
            "items[i].name",
            "a ? b : c",
            "this",
            "this.name",
        ] {
            assert!(!compile(source).unwrap().is_assignable(), "{source}");
        }
        let compiled = compile("user.profile.name").unwrap();
        assert!(compiled.is_assignable());
        assert_eq!(
            compiled.setter().unwrap().path().to_string(),
            "user.profile.name"
        );
        assert!(compile("  title ").unwrap().is_assignable());
    }

    #[test]
    fn test_pipe_grammar_errors() {
        assert_eq!(compile("   "), Err(ExpressionError::Empty));
        assert!(matches!(
            compile("a |"),
            Err(ExpressionError::EmptyFilter { .. })
        ));
        assert!(matches!(
            compile("a | 1x"),
            Err(ExpressionError::InvalidFilterName { .. })
        ));
        // A bad head only fails on evaluation
        assert!(compile("a +* b").is_ok());
    }

    #[test]
    fn test_getter_and_setter_round_trip() {
        let mut scopes = Scopes::new();
        let filters = FilterLibrary::new();
        let options = BinderOptions::default();
        let compiled = compile("user.profile.name").unwrap();

        let global = Scopes::global();
        let ctx = EvalContext::new(&scopes, global, &filters, &options);
        assert_eq!(compiled.getter().get(&ctx).unwrap(), Value::Null);

        let setter = compiled.setter().unwrap();
        assert!(setter.set(&mut scopes, global, json!("Ann")).unwrap());
        let ctx = EvalContext::new(&scopes, global, &filters, &options);
        assert_eq!(compiled.getter().get(&ctx).unwrap(), json!("Ann"));
        assert_eq!(
            scopes.lookup(global, "user"),
            Some(&json!({"profile": {"name": "Ann"}}))
        );
    }

    #[test]
    fn test_filters_compose_left_to_right() {
        let mut scopes = Scopes::new();
        scopes
            .set_local(Scopes::global(), "items", json!([5, 3, 9, 1]))
            .unwrap();
        let filters = FilterLibrary::new();
        let options = BinderOptions::default();
        let ctx = EvalContext::new(&scopes, Scopes::global(), &filters, &options);

        let compiled = compile("items | orderBy:'' | limitTo:2 | json").unwrap();
        assert_eq!(compiled.getter().get(&ctx).unwrap(), json!("[1,3]"));

        let compiled = compile("items.length > 3 ? 'many' : 'few' | uppercase").unwrap();
        assert_eq!(compiled.getter().get(&ctx).unwrap(), json!("MANY"));
    }

    #[test]
    fn test_unknown_filter_fails_on_evaluation() {
        let scopes = Scopes::new();
        let filters = FilterLibrary::new();
        let options = BinderOptions::default();
        let ctx = EvalContext::new(&scopes, Scopes::global(), &filters, &options);
        let compiled = compile("x | nope").unwrap();
        assert_eq!(
            compiled.getter().get(&ctx),
            Err(EvaluationError::UnknownFilter("nope".into()))
        );
    }
}
