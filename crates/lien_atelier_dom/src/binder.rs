//! The binder context.
//!
//! A [`Binder`] owns everything the bindings of one element tree share: the
//! registry, the scope arena, the formatting options and the filter library.
//! The application owns the binder and passes the host in on every call.

use lien_atelier_core::{compile, EvalContext, FilterLibrary};
use lien_carton::{CompactString, Map, Value};
use lien_croquis::{ScopeId, Scopes};
use lien_relief::{BinderOptions, EvaluationError};

use crate::binding::{flag_enabled, Binding, BindingId, BindingKind, Target};
use crate::error::BindError;
use crate::host::{ChangeTrigger, Host};
use crate::registry::Registry;

/// Prefix of identities given to bound elements that have none
pub const AUTO_ID_PREFIX: &str = "_lien_id_";

/// Binding context for one element tree
#[derive(Debug, Default)]
pub struct Binder {
    pub(crate) registry: Registry,
    pub(crate) scopes: Scopes,
    pub(crate) options: BinderOptions,
    pub(crate) filters: FilterLibrary,
    next_auto_id: u32,
}

impl Binder {
    /// A binder with an empty global scope
    pub fn new() -> Self {
        Self::default()
    }

    /// A binder whose global scope starts with `values`
    pub fn with_scope(values: Map<String, Value>) -> Self {
        Self {
            scopes: Scopes::with_global(values),
            ..Self::default()
        }
    }

    /// The global scope
    #[inline]
    pub fn global(&self) -> ScopeId {
        Scopes::global()
    }

    #[inline]
    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    #[inline]
    pub fn scopes_mut(&mut self) -> &mut Scopes {
        &mut self.scopes
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn options(&self) -> &BinderOptions {
        &self.options
    }

    /// Replace the formatting options; takes effect on the next sync
    pub fn set_options(&mut self, options: BinderOptions) {
        self.options = options;
    }

    #[inline]
    pub fn filters(&self) -> &FilterLibrary {
        &self.filters
    }

    #[inline]
    pub fn filters_mut(&mut self) -> &mut FilterLibrary {
        &mut self.filters
    }

    /// Evaluation context for expressions in `scope`
    pub fn eval_context(&self, scope: ScopeId) -> EvalContext<'_> {
        EvalContext::new(&self.scopes, scope, &self.filters, &self.options)
    }

    /// Read a name from the global scope
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.scopes.lookup(Scopes::global(), name)
    }

    /// Set a name on the global scope
    pub fn set(&mut self, name: &str, value: Value) {
        // The global scope is never disposed
        let _ = self.scopes.set_local(Scopes::global(), name, value);
    }

    /// The identity of `node`, assigning `_lien_id_<n>` when it has none
    pub(crate) fn ensure_id<H: Host>(&mut self, host: &mut H, node: H::Node) -> CompactString {
        if let Some(id) = host.id_of(node).filter(|id| !id.is_empty()) {
            return id;
        }
        let mut id = CompactString::new(AUTO_ID_PREFIX);
        id.push_str(&self.next_auto_id.to_string());
        self.next_auto_id += 1;
        host.set_id(node, &id);
        id
    }

    /// Bind the element identified by `id`.
    ///
    /// `property` selects a `bind-<property>` target; without it, inputs bind
    /// their form value and other elements their text. Returns `None` for a
    /// blank expression.
    pub fn bind<H: Host>(
        &mut self,
        host: &mut H,
        id: &str,
        expression: &str,
        scope: ScopeId,
        property: Option<&str>,
    ) -> Result<Option<BindingId>, BindError> {
        let node = find(host, id)?;
        self.bind_node(host, node, expression, scope, property)
    }

    pub(crate) fn bind_node<H: Host>(
        &mut self,
        host: &mut H,
        node: H::Node,
        expression: &str,
        scope: ScopeId,
        property: Option<&str>,
    ) -> Result<Option<BindingId>, BindError> {
        if expression.trim().is_empty() {
            return Ok(None);
        }
        let is_input = host.is_input(node);
        let compiled = compile(expression)?;
        let compiled = if is_input {
            compiled
        } else {
            compiled.read_only()
        };

        if is_input {
            host.listen(node, ChangeTrigger::Commit);
            let immediate = host
                .attr(node, "immediate")
                .or_else(|| host.attr(node, "data-immediate"));
            if flag_enabled(immediate.as_deref()) {
                host.listen(node, ChangeTrigger::Keystroke);
            }
        }

        let element = self.ensure_id(host, node);
        let (getter, setter) = compiled.into_parts();
        let binding = Binding {
            id: self.registry.next_id(),
            element,
            scope,
            getter,
            setter,
            kind: BindingKind::Element(Target::select(is_input, property)),
            last_value: Value::Null,
        };
        tracing::debug!(
            element = %binding.element,
            expression,
            two_way = binding.is_two_way(),
            "bind"
        );
        self.attach(host, binding).map(Some)
    }

    /// Register a binding and synchronize it once
    pub(crate) fn attach<H: Host>(
        &mut self,
        host: &mut H,
        binding: Binding,
    ) -> Result<BindingId, BindError> {
        let id = binding.id;
        self.registry.register(binding);
        self.sync_binding(host, id)?;
        Ok(id)
    }

    /// Remove every binding of an element. Unbinding a repeat also unbinds
    /// its clones and disposes their scopes. Returns how many bindings of
    /// the element itself were removed; unbinding twice removes nothing.
    pub fn unbind(&mut self, id: &str) -> usize {
        let removed = self.registry.unregister(id);
        let count = removed.len();
        for binding in removed {
            if let BindingKind::Repeat(state) = binding.kind {
                self.release_clones(state);
            }
        }
        count
    }

    /// Unbind every element of the sub-tree rooted at `id`, root included
    pub fn unbind_within<H: Host>(&mut self, host: &mut H, id: &str) -> Result<usize, BindError> {
        let node = find(host, id)?;
        Ok(self.unbind_node_within(host, node, true))
    }

    pub(crate) fn unbind_node_within<H: Host>(
        &mut self,
        host: &H,
        node: H::Node,
        include_root: bool,
    ) -> usize {
        let ids = host.identities_within(node);
        let root = host.id_of(node);
        ids.iter()
            .filter(|id| include_root || Some(*id) != root.as_ref())
            .map(|id| self.unbind(id))
            .sum()
    }

    /// Number of live bindings
    pub fn binding_count(&self) -> usize {
        self.registry.len()
    }

    pub fn binding(&self, id: BindingId) -> Option<&Binding> {
        self.registry.get(id)
    }
}

pub(crate) fn find<H: Host>(host: &H, id: &str) -> Result<H::Node, EvaluationError> {
    host.find(id)
        .ok_or_else(|| EvaluationError::MissingElement(CompactString::new(id)))
}
