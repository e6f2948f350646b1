//! Initialization sweep: bind every declaration in a sub-tree.

use lien_carton::{phf_set, CompactString, PhfSet};
use lien_croquis::ScopeId;

use crate::binder::Binder;
use crate::error::BindError;
use crate::host::Host;
use crate::repeat::REPEAT_ATTRIBUTES;

/// Targets accepted after `bind-`
static BIND_TARGETS: PhfSet<&'static str> = phf_set! {
    "checked", "class", "disabled", "readonly", "selected", "src", "style",
};

/// A binding declaration found by the sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Declaration {
    pub expression: String,
    /// `bind-<target>`, or `None` for a plain `bind`
    pub property: Option<CompactString>,
}

/// Read the binding declarations carried by an attribute list
pub(crate) fn declarations(attributes: &[(CompactString, String)]) -> Vec<Declaration> {
    attributes
        .iter()
        .filter_map(|(name, value)| {
            let name = name.as_str();
            let name = name.strip_prefix("data-").unwrap_or(name);
            let property = match name.strip_prefix("bind") {
                Some("") => None,
                Some(rest) => {
                    let target = rest.strip_prefix('-')?;
                    if !BIND_TARGETS.contains(target) {
                        return None;
                    }
                    Some(CompactString::new(target))
                }
                None => return None,
            };
            Some(Declaration {
                expression: value.clone(),
                property,
            })
        })
        .collect()
}

fn repeat_declaration(attributes: &[(CompactString, String)]) -> Option<&str> {
    REPEAT_ATTRIBUTES.iter().find_map(|wanted| {
        attributes
            .iter()
            .find(|(name, _)| name.as_str() == *wanted)
            .map(|(_, value)| value.as_str())
    })
}

impl Binder {
    /// Bind every declaration in the sub-tree at `root`, root included.
    ///
    /// Repeat elements are not descended into; their content is bound per
    /// clone. Plain bindings are created first, then repeats, each in
    /// document order. Returns the number of bindings created.
    pub fn init<H: Host>(
        &mut self,
        host: &mut H,
        root: H::Node,
        scope: ScopeId,
    ) -> Result<usize, BindError> {
        let mut binds = Vec::new();
        let mut repeats = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            let attributes = host.attributes(node);
            if let Some(expression) = repeat_declaration(&attributes) {
                repeats.push((node, expression.to_string()));
                continue;
            }
            binds.extend(
                declarations(&attributes)
                    .into_iter()
                    .map(|declaration| (node, declaration)),
            );
            stack.extend(host.children(node).into_iter().rev());
        }
        tracing::debug!(
            binds = binds.len(),
            repeats = repeats.len(),
            %scope,
            "init sweep"
        );

        let mut created = 0;
        for (node, declaration) in binds {
            let property = declaration.property.as_deref();
            if self
                .bind_node(host, node, &declaration.expression, scope, property)?
                .is_some()
            {
                created += 1;
            }
        }
        for (node, expression) in repeats {
            if self.repeat_node(host, node, &expression, scope)?.is_some() {
                created += 1;
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> Vec<(CompactString, String)> {
        pairs
            .iter()
            .map(|(name, value)| (CompactString::new(name), value.to_string()))
            .collect()
    }

    #[test]
    fn test_declarations() {
        let found = declarations(&attrs(&[
            ("id", "x"),
            ("bind", "title"),
            ("data-bind-class", "style"),
            ("bind-href", "link"),
            ("binder", "nope"),
            ("bind-checked", "done"),
        ]));
        assert_eq!(
            found,
            vec![
                Declaration {
                    expression: "title".into(),
                    property: None,
                },
                Declaration {
                    expression: "style".into(),
                    property: Some("class".into()),
                },
                Declaration {
                    expression: "done".into(),
                    property: Some("checked".into()),
                },
            ]
        );
    }

    #[test]
    fn test_repeat_declaration_prefers_plain_attribute() {
        assert_eq!(
            repeat_declaration(&attrs(&[("data-repeat", "b in c"), ("repeat", "a in c")])),
            Some("a in c")
        );
        assert_eq!(repeat_declaration(&attrs(&[("bind", "x")])), None);
    }
}
