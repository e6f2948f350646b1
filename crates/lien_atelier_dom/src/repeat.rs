//! Repeat reconciler.
//!
//! A repeat element becomes a hidden template. Every entry of the bound
//! collection gets a clone of it, inserted after the template in entry
//! order and bound against a child scope holding the loop variables:
//!
//! ```text
//! <li repeat="(key, row) in rows" bind="row.name">   (template, hidden)
//! <li id="..._clone_a">   scope { row, key: "a", index: "a", first: true,  ... }
//! <li id="..._clone_b">   scope { row, key: "b", index: "b", middle: true, ... }
//! ```
//!
//! Clones are keyed by entry key and reused across reconciles, so a clone
//! keeps its element identities for as long as its key stays present.

use lien_armature::parse_repeat;
use lien_carton::{CompactString, FxHashMap, FxHashSet, Value};
use lien_croquis::{Alias, ScopeId};
use lien_relief::ast::Path;
use serde_json::json;

use crate::binder::{find, Binder};
use crate::binding::{Binding, BindingId, BindingKind};
use crate::error::BindError;
use crate::host::Host;
use crate::identity::{clone_suffix, suffix_identities};

/// Name of the signal dispatched on a clone before it is discarded
pub const REMOVE_SIGNAL: &str = "removerepeat";

/// Attributes declaring a repeat
pub const REPEAT_ATTRIBUTES: [&str; 2] = ["repeat", "data-repeat"];

/// One materialized collection entry
#[derive(Debug, Clone)]
pub struct RepeatClone {
    /// Identity of the clone root
    pub root: CompactString,
    pub scope: ScopeId,
    /// Every identity inside the clone, root included
    pub identities: Vec<CompactString>,
}

/// Reconciler state held by a repeat binding
#[derive(Debug)]
pub struct RepeatState {
    pub(crate) key_name: Option<CompactString>,
    pub(crate) value_name: CompactString,
    pub(crate) template: CompactString,
    /// Collection path, when writes through the value variable reach it
    pub(crate) source: Option<Path>,
    pub(crate) clones: FxHashMap<CompactString, RepeatClone>,
    /// Live clone keys in collection order
    pub(crate) order: Vec<CompactString>,
}

impl RepeatState {
    /// Identity of the template element
    #[inline]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Live clones in collection order
    pub fn clones(&self) -> impl Iterator<Item = (&CompactString, &RepeatClone)> + '_ {
        self.order
            .iter()
            .filter_map(|key| self.clones.get_key_value(key))
    }

    #[inline]
    pub fn clone_for(&self, key: &str) -> Option<&RepeatClone> {
        self.clones.get(key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// A collection entry: clone key, key variable value, entry value
struct Entry<'a> {
    key: CompactString,
    key_value: Value,
    value: &'a Value,
}

/// Entries of a collection in iteration order. Scalars have none.
fn entries(collection: &Value) -> Vec<Entry<'_>> {
    match collection {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| Entry {
                key: CompactString::new(key),
                key_value: Value::String(key.clone()),
                value,
            })
            .collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, value)| Entry {
                key: CompactString::new(index.to_string()),
                key_value: json!(index),
                value,
            })
            .collect(),
        _ => Vec::new(),
    }
}

impl Binder {
    /// Bind a repeat declaration on the element identified by `id`.
    ///
    /// The element is hidden and becomes the template; bindings already
    /// registered inside it are removed since its content is bound per clone.
    pub fn repeat<H: Host>(
        &mut self,
        host: &mut H,
        id: &str,
        expression: &str,
        scope: ScopeId,
    ) -> Result<Option<BindingId>, BindError> {
        let node = find(host, id)?;
        self.repeat_node(host, node, expression, scope)
    }

    pub(crate) fn repeat_node<H: Host>(
        &mut self,
        host: &mut H,
        node: H::Node,
        expression: &str,
        scope: ScopeId,
    ) -> Result<Option<BindingId>, BindError> {
        if expression.trim().is_empty() {
            return Ok(None);
        }
        let clause = parse_repeat(expression)?;
        let compiled = lien_atelier_core::compile(&clause.collection)?;

        let template = self.ensure_id(host, node);
        host.hide(node);
        self.unbind_node_within(host, node, false);

        let (getter, setter) = compiled.into_parts();
        let state = RepeatState {
            key_name: clause.key_name,
            value_name: clause.value_name,
            template: template.clone(),
            source: setter.map(|setter| setter.path().clone()),
            clones: FxHashMap::default(),
            order: Vec::new(),
        };
        tracing::debug!(
            template = %template,
            collection = %clause.collection,
            write_through = state.source.is_some(),
            "repeat"
        );
        let binding = Binding {
            id: self.registry.next_id(),
            element: template,
            scope,
            getter,
            setter: None,
            kind: BindingKind::Repeat(state),
            last_value: Value::Null,
        };
        self.attach(host, binding).map(Some)
    }

    /// Bring the clones of a repeat in line with `collection`
    pub(crate) fn reconcile<H: Host>(
        &mut self,
        host: &mut H,
        state: &mut RepeatState,
        scope: ScopeId,
        collection: &Value,
    ) -> Result<(), BindError> {
        let template = find(host, &state.template)?;
        let entries = entries(collection);
        let count = entries.len();
        let mut previous = template;
        let mut order = Vec::with_capacity(count);

        for (position, entry) in entries.into_iter().enumerate() {
            let flags = [
                ("first", position == 0),
                ("middle", position != 0 && position + 1 != count),
                ("last", position + 1 == count),
            ];
            let reused = state.clones.get(&entry.key).map(|c| (c.scope, c.root.clone()));
            match reused {
                Some((child, root)) => {
                    self.assign_loop_variables(state, child, &entry, &flags)?;
                    if let Some(node) = host.find(&root) {
                        previous = node;
                    }
                }
                None => {
                    let clone = self.materialize(host, state, scope, template, previous, &entry, &flags)?;
                    if let Some(node) = host.find(&clone.root) {
                        previous = node;
                    }
                    state.clones.insert(entry.key.clone(), clone);
                }
            }
            order.push(entry.key);
        }

        // Clones recorded by a reconcile that failed part way are not in
        // `state.order` yet
        let live: FxHashSet<&CompactString> = order.iter().collect();
        let mut stale: Vec<CompactString> = state
            .clones
            .keys()
            .filter(|key| !live.contains(key))
            .cloned()
            .collect();
        stale.sort_by_key(|key| state.order.iter().position(|k| k == key));
        for key in stale {
            if let Some(clone) = state.clones.remove(&key) {
                self.discard(host, &key, clone);
            }
        }
        state.order = order;
        Ok(())
    }

    fn assign_loop_variables(
        &mut self,
        state: &RepeatState,
        child: ScopeId,
        entry: &Entry<'_>,
        flags: &[(&str, bool); 3],
    ) -> Result<(), BindError> {
        let scopes = &mut self.scopes;
        scopes.set_local(child, &state.value_name, entry.value.clone())?;
        if let Some(key_name) = &state.key_name {
            scopes.set_local(child, key_name, entry.key_value.clone())?;
        }
        scopes.set_local(child, "index", entry.key_value.clone())?;
        for (name, flag) in flags {
            scopes.set_local(child, name, Value::Bool(*flag))?;
        }
        Ok(())
    }

    fn seed_clone_scope(
        &mut self,
        state: &RepeatState,
        scope: ScopeId,
        child: ScopeId,
        entry: &Entry<'_>,
        flags: &[(&str, bool); 3],
    ) -> Result<(), BindError> {
        self.assign_loop_variables(state, child, entry, flags)?;
        if let Some(source) = &state.source {
            let alias = Alias::new(scope, source.clone(), entry.key.clone());
            self.scopes.set_alias(child, &state.value_name, alias)?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn materialize<H: Host>(
        &mut self,
        host: &mut H,
        state: &RepeatState,
        scope: ScopeId,
        template: H::Node,
        previous: H::Node,
        entry: &Entry<'_>,
        flags: &[(&str, bool); 3],
    ) -> Result<RepeatClone, BindError> {
        let child = self.scopes.child(scope)?;
        if let Err(err) = self.seed_clone_scope(state, scope, child, entry, flags) {
            self.scopes.dispose(child);
            return Err(err);
        }

        let copy = host.clone_subtree(template);
        for name in REPEAT_ATTRIBUTES {
            host.remove_attr(copy, name);
        }
        let renaming = suffix_identities(&host.identities_within(copy), &clone_suffix(&entry.key));
        host.rename(copy, &renaming);
        host.insert_after(copy, previous);

        let root = self.ensure_id(host, copy);
        if let Err(err) = self.init(host, copy, child) {
            // Leave nothing behind, so the entry is created afresh next sync
            self.unbind_node_within(host, copy, true);
            self.scopes.dispose(child);
            host.remove(copy);
            tracing::debug!(
                template = %state.template,
                key = %entry.key,
                error = %err,
                "repeat clone rolled back"
            );
            return Err(err);
        }
        host.show(copy);

        let identities = host.identities_within(copy);
        tracing::debug!(
            template = %state.template,
            key = %entry.key,
            clone = %root,
            "repeat clone created"
        );
        Ok(RepeatClone {
            root,
            scope: child,
            identities,
        })
    }

    /// Drop a stale clone: signal it, unbind everything inside, free its
    /// scope and detach it
    fn discard<H: Host>(&mut self, host: &mut H, key: &str, clone: RepeatClone) {
        let node = host.find(&clone.root);
        if let Some(node) = node {
            host.dispatch(node, REMOVE_SIGNAL);
        }
        for identity in &clone.identities {
            self.unbind(identity);
        }
        self.scopes.dispose(clone.scope);
        if let Some(node) = node {
            host.remove(node);
        }
        tracing::debug!(key, clone = %clone.root, "repeat clone discarded");
    }

    /// Release the clones of an unbound repeat. Their elements stay in the
    /// tree; only their bindings and scopes go.
    pub(crate) fn release_clones(&mut self, state: RepeatState) {
        for (_, clone) in state.clones {
            for identity in &clone.identities {
                self.unbind(identity);
            }
            self.scopes.dispose(clone.scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_of_mapping_keep_insertion_order() {
        let collection = json!({"b": 2, "a": 1});
        let keys: Vec<_> = entries(&collection).into_iter().map(|e| e.key).collect();
        assert_eq!(keys, ["b", "a"]);
    }

    #[test]
    fn test_entries_of_sequence_use_numeric_positions() {
        let collection = json!(["x", "y"]);
        let entries = entries(&collection);
        assert_eq!(entries[1].key, "1");
        assert_eq!(entries[1].key_value, json!(1));
        assert_eq!(entries[1].value, &json!("y"));
    }

    #[test]
    fn test_scalar_collection_has_no_entries() {
        assert!(entries(&json!(null)).is_empty());
        assert!(entries(&json!("abc")).is_empty());
        assert!(entries(&json!(3)).is_empty());
    }
}
