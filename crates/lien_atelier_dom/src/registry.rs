//! Binding registry.
//!
//! Bindings are grouped by element identity. Sync passes visit elements in
//! the order they were first bound, and each element's bindings in the order
//! they were added.
//!
//! During a sync step the binding being processed is taken out of the
//! registry so the binder can mutate everything else (including creating and
//! removing other bindings). It is put back afterwards unless its element was
//! unbound in the meantime.

use lien_carton::{CompactString, FxHashMap, SmallVec};

use crate::binding::{Binding, BindingId};

type ElementBindings = SmallVec<[BindingId; 2]>;

#[derive(Debug, Default)]
pub struct Registry {
    bindings: FxHashMap<BindingId, Binding>,
    /// Element identities, in first-bound order
    elements: Vec<CompactString>,
    by_element: FxHashMap<CompactString, ElementBindings>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn next_id(&mut self) -> BindingId {
        let id = BindingId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a binding after the existing bindings of its element
    pub(crate) fn register(&mut self, binding: Binding) {
        if !self.by_element.contains_key(binding.element.as_str()) {
            self.elements.push(binding.element.clone());
        }
        self.by_element
            .entry(binding.element.clone())
            .or_default()
            .push(binding.id);
        self.bindings.insert(binding.id, binding);
    }

    /// Remove every binding of an element, returning those that were not
    /// checked out by a running sync step
    pub(crate) fn unregister(&mut self, element: &str) -> Vec<Binding> {
        let Some(ids) = self.by_element.remove(element) else {
            return Vec::new();
        };
        self.elements.retain(|e| e.as_str() != element);
        ids.into_iter()
            .filter_map(|id| self.bindings.remove(&id))
            .collect()
    }

    /// Binding ids in processing order
    pub fn snapshot(&self) -> Vec<BindingId> {
        self.elements
            .iter()
            .filter_map(|element| self.by_element.get(element))
            .flat_map(|ids| ids.iter().copied())
            .collect()
    }

    pub(crate) fn take(&mut self, id: BindingId) -> Option<Binding> {
        self.bindings.remove(&id)
    }

    /// Put a checked-out binding back. Returns `false` (dropping it) when its
    /// element was unbound while it was out.
    pub(crate) fn restore(&mut self, binding: Binding) -> bool {
        let registered = self
            .by_element
            .get(binding.element.as_str())
            .is_some_and(|ids| ids.contains(&binding.id));
        if registered {
            self.bindings.insert(binding.id, binding);
        }
        registered
    }

    pub fn get(&self, id: BindingId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    /// Bindings of an element, in registration order
    pub fn bindings_for<'a>(&'a self, element: &str) -> impl Iterator<Item = &'a Binding> + 'a {
        self.by_element
            .get(element)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.bindings.get(id))
    }

    #[inline]
    pub fn contains_element(&self, element: &str) -> bool {
        self.by_element.contains_key(element)
    }

    /// Number of live bindings
    #[inline]
    pub fn len(&self) -> usize {
        self.by_element.values().map(|ids| ids.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }

    /// Bound element identities, in first-bound order
    pub fn elements(&self) -> &[CompactString] {
        &self.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::{BindingKind, Target};
    use lien_atelier_core::compile;
    use lien_carton::Value;
    use lien_croquis::ScopeId;

    fn binding(registry: &mut Registry, element: &str) -> Binding {
        let (getter, setter) = compile("x").unwrap().into_parts();
        Binding {
            id: registry.next_id(),
            element: element.into(),
            scope: ScopeId::GLOBAL,
            getter,
            setter,
            kind: BindingKind::Element(Target::Text),
            last_value: Value::Null,
        }
    }

    #[test]
    fn test_snapshot_order() {
        let mut registry = Registry::new();
        let a1 = binding(&mut registry, "a");
        let b1 = binding(&mut registry, "b");
        let a2 = binding(&mut registry, "a");
        let ids = [a1.id, b1.id, a2.id];
        registry.register(a1);
        registry.register(b1);
        registry.register(a2);

        assert_eq!(registry.snapshot(), vec![ids[0], ids[2], ids[1]]);
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.bindings_for("a").count(), 2);
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let mut registry = Registry::new();
        let a = binding(&mut registry, "a");
        registry.register(a);
        assert_eq!(registry.unregister("a").len(), 1);
        assert!(registry.unregister("a").is_empty());
        assert!(registry.is_empty());
        assert!(registry.elements().is_empty());
    }

    #[test]
    fn test_restore_after_unbind_drops_binding() {
        let mut registry = Registry::new();
        let a = binding(&mut registry, "a");
        let id = a.id;
        registry.register(a);

        let taken = registry.take(id).unwrap();
        assert!(registry.get(id).is_none());
        assert!(registry.restore(taken));
        assert!(registry.get(id).is_some());

        let taken = registry.take(id).unwrap();
        // Unbinding while checked out returns nothing for that binding
        assert!(registry.unregister("a").is_empty());
        assert!(!registry.restore(taken));
        assert!(registry.get(id).is_none());
    }
}
