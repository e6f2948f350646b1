//! Bindings: one compiled model accessor paired with one element accessor.

use lien_atelier_core::{Getter, Setter};
use lien_carton::{to_display_string, CompactString, Value};
use lien_croquis::ScopeId;
use lien_relief::EvaluationError;

use crate::host::Host;
use crate::repeat::RepeatState;

/// Unique identifier of a binding within a binder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct BindingId(u32);

impl BindingId {
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Which part of an element a binding reads and writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Text content of an ordinary element
    Text,
    /// Form value of an input-capable element
    Value,
    /// A property or attribute (`checked`, `class`, `src`, ...)
    Property(CompactString),
}

impl Target {
    /// The target a `bind` or `bind-<name>` declaration selects
    pub fn select(is_input: bool, property: Option<&str>) -> Self {
        match property {
            Some(name) => Self::Property(CompactString::new(name)),
            None if is_input => Self::Value,
            None => Self::Text,
        }
    }
}

/// What a binding does when its model value changes
#[derive(Debug)]
pub enum BindingKind {
    /// Write the value into the element
    Element(Target),
    /// Reconcile repeat clones against the collection
    Repeat(RepeatState),
}

/// A live binding
#[derive(Debug)]
pub struct Binding {
    pub(crate) id: BindingId,
    pub(crate) element: CompactString,
    pub(crate) scope: ScopeId,
    pub(crate) getter: Getter,
    pub(crate) setter: Option<Setter>,
    pub(crate) kind: BindingKind,
    pub(crate) last_value: Value,
}

impl Binding {
    #[inline]
    pub fn id(&self) -> BindingId {
        self.id
    }

    /// Identity of the bound element
    #[inline]
    pub fn element(&self) -> &str {
        &self.element
    }

    #[inline]
    pub fn scope(&self) -> ScopeId {
        self.scope
    }

    /// The last value seen on either side
    #[inline]
    pub fn last_value(&self) -> &Value {
        &self.last_value
    }

    #[inline]
    pub fn kind(&self) -> &BindingKind {
        &self.kind
    }

    #[inline]
    pub fn is_repeat(&self) -> bool {
        matches!(self.kind, BindingKind::Repeat(_))
    }

    /// Whether element edits flow back into the model
    #[inline]
    pub fn is_two_way(&self) -> bool {
        self.setter.is_some() && matches!(self.kind, BindingKind::Element(_))
    }
}

/// Write a model value into an element.
///
/// Text and form values receive the display string (`null` clears them).
/// Properties take booleans as properties; other values become attributes,
/// and `null` removes the attribute.
pub(crate) fn write_element<H: Host>(
    host: &mut H,
    element: &str,
    target: &Target,
    value: &Value,
) -> Result<(), EvaluationError> {
    let node = host
        .find(element)
        .ok_or_else(|| EvaluationError::MissingElement(CompactString::new(element)))?;
    match target {
        Target::Text => host.set_text(node, &to_display_string(value)),
        Target::Value => host.set_value(node, &to_display_string(value)),
        Target::Property(name) => match value {
            Value::Bool(flag) => host.set_prop(node, name, *flag),
            Value::Null => host.remove_attr(node, name),
            other => host.set_attr(node, name, &to_display_string(other)),
        },
    }
    Ok(())
}

/// Read the element side of a two-way binding
pub(crate) fn read_element<H: Host>(
    host: &H,
    element: &str,
    target: &Target,
) -> Result<Value, EvaluationError> {
    let node = host
        .find(element)
        .ok_or_else(|| EvaluationError::MissingElement(CompactString::new(element)))?;
    Ok(match target {
        Target::Text => Value::String(host.text(node)),
        Target::Value => Value::String(host.value(node)),
        Target::Property(name) => host.prop(node, name),
    })
}

/// Whether a declaration attribute value turns a feature on
#[inline]
pub(crate) fn flag_enabled(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.trim().eq_ignore_ascii_case("false"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_target() {
        assert_eq!(Target::select(true, None), Target::Value);
        assert_eq!(Target::select(false, None), Target::Text);
        assert_eq!(
            Target::select(true, Some("checked")),
            Target::Property("checked".into())
        );
    }

    #[test]
    fn test_flag_enabled() {
        assert!(flag_enabled(Some("")));
        assert!(flag_enabled(Some("true")));
        assert!(!flag_enabled(Some("false")));
        assert!(!flag_enabled(None));
    }
}
