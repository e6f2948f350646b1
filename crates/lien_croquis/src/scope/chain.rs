//! Scope arena and chain resolution.
//!
//! This module provides the core scope management functionality:
//! - `Scope` - One mapping of names to values, with an optional parent
//! - `Scopes` - The arena owning every scope of a binder
//!
//! Reads walk the chain from the local scope to the global one. Writes land on
//! the nearest scope that already owns the first path segment, or on the local
//! scope when none does.

use lien_carton::{CompactString, FxHashMap, Map, Value};
use lien_relief::{EvaluationError, Path};

use super::types::{Alias, ScopeId};

/// A single scope in the chain
#[derive(Debug, Clone)]
pub struct Scope {
    /// Unique identifier
    pub id: ScopeId,
    /// Parent scope (`None` only for the global scope)
    pub parent: Option<ScopeId>,
    /// Names defined directly on this scope
    values: Map<String, Value>,
    /// Write-through aliases of loop variables
    aliases: FxHashMap<CompactString, Alias>,
}

impl Scope {
    #[inline]
    fn new(id: ScopeId, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            parent,
            values: Map::new(),
            aliases: FxHashMap::default(),
        }
    }

    /// Names defined directly on this scope
    #[inline]
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Whether this scope defines `name` itself
    #[inline]
    pub fn owns(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    #[inline]
    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }
}

/// Arena of every scope a binder works with.
///
/// Slot 0 holds the global scope. Disposed slots stay empty; ids are never
/// handed out twice.
#[derive(Debug, Clone)]
pub struct Scopes {
    slots: Vec<Option<Scope>>,
}

impl Default for Scopes {
    fn default() -> Self {
        Self::new()
    }
}

impl Scopes {
    /// Create an arena holding an empty global scope
    pub fn new() -> Self {
        Self {
            slots: vec![Some(Scope::new(ScopeId::GLOBAL, None))],
        }
    }

    /// Create an arena whose global scope starts with `values`
    pub fn with_global(values: Map<String, Value>) -> Self {
        let mut scopes = Self::new();
        if let Some(Some(global)) = scopes.slots.first_mut() {
            global.values = values;
        }
        scopes
    }

    /// The global scope
    #[inline(always)]
    pub const fn global() -> ScopeId {
        ScopeId::GLOBAL
    }

    /// Create a child scope chained to `parent`
    pub fn child(&mut self, parent: ScopeId) -> Result<ScopeId, EvaluationError> {
        self.scope(parent)?;
        let id = ScopeId::new(self.slots.len() as u32);
        self.slots.push(Some(Scope::new(id, Some(parent))));
        Ok(id)
    }

    /// Free a scope. Disposing the global scope, or a scope that is already
    /// gone, does nothing. Returns whether a scope was freed.
    pub fn dispose(&mut self, id: ScopeId) -> bool {
        if id.is_global() {
            return false;
        }
        self.slots
            .get_mut(id.as_u32() as usize)
            .and_then(Option::take)
            .is_some()
    }

    #[inline]
    pub fn is_alive(&self, id: ScopeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live scopes, the global one included
    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[inline]
    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.slots.get(id.as_u32() as usize)?.as_ref()
    }

    fn scope(&self, id: ScopeId) -> Result<&Scope, EvaluationError> {
        self.get(id)
            .ok_or(EvaluationError::DisposedScope(id.as_u32()))
    }

    fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope, EvaluationError> {
        self.slots
            .get_mut(id.as_u32() as usize)
            .and_then(Option::as_mut)
            .ok_or(EvaluationError::DisposedScope(id.as_u32()))
    }

    /// Iterate `id` and its ancestors, nearest first
    pub fn ancestors(&self, id: ScopeId) -> impl Iterator<Item = &Scope> + '_ {
        let mut next = self.get(id);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.and_then(|parent| self.get(parent));
            Some(current)
        })
    }

    /// Resolve a name through the chain
    pub fn lookup(&self, id: ScopeId, name: &str) -> Option<&Value> {
        self.ancestors(id).find_map(|scope| scope.get(name))
    }

    /// The nearest scope on the chain that defines `name`
    pub fn owner(&self, id: ScopeId, name: &str) -> Option<ScopeId> {
        self.ancestors(id)
            .find(|scope| scope.owns(name))
            .map(|scope| scope.id)
    }

    /// Define `name` directly on scope `id`, shadowing any ancestor
    pub fn set_local(
        &mut self,
        id: ScopeId,
        name: &str,
        value: Value,
    ) -> Result<(), EvaluationError> {
        self.scope_mut(id)?.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Forward writes through local `name` to the entry `alias` points at
    pub fn set_alias(
        &mut self,
        id: ScopeId,
        name: &str,
        alias: Alias,
    ) -> Result<(), EvaluationError> {
        self.scope_mut(id)?
            .aliases
            .insert(CompactString::new(name), alias);
        Ok(())
    }

    /// Read a dotted path. Missing names and intermediates read as `null`.
    pub fn get_path(&self, id: ScopeId, path: &Path) -> Value {
        let mut segments = path.segments.iter();
        let Some(root) = segments.next() else {
            return Value::Null;
        };
        let mut current = match self.lookup(id, root) {
            Some(value) => value,
            None => return Value::Null,
        };
        for segment in segments {
            current = match lien_carton::value::entry(current, segment) {
                Some(value) => value,
                None => return Value::Null,
            };
        }
        current.clone()
    }

    /// Assign `value` at a dotted path.
    ///
    /// The write lands on the scope owning the first segment, or on `id` when
    /// no scope on the chain owns it. Missing or `null` intermediates become
    /// empty mappings. A scalar intermediate drops the write.
    ///
    /// Writes through an aliased loop variable are repeated on the aliased
    /// collection entry. Returns whether the primary write happened.
    pub fn set_path(
        &mut self,
        id: ScopeId,
        path: &Path,
        value: Value,
    ) -> Result<bool, EvaluationError> {
        let Some(root) = path.root() else {
            return Ok(false);
        };
        self.scope(id)?;
        let target = self.owner(id, root).unwrap_or(id);

        let scope = self.scope_mut(target)?;
        let written = write_root(&mut scope.values, &path.segments, value.clone());
        if !written {
            tracing::debug!(path = %path, scope = %target, "write dropped at a scalar intermediate");
        }

        let forward = scope
            .alias(root)
            .map(|alias| (alias.scope, alias.target(&path.segments[1..])));
        if let Some((alias_scope, alias_path)) = forward {
            if self.is_alive(alias_scope) {
                self.set_path(alias_scope, &alias_path, value)?;
            }
        }
        Ok(written)
    }

    /// Flattened view of the chain at `id`: ancestors first, nearer scopes
    /// overriding. This is what `this` evaluates to.
    pub fn as_value(&self, id: ScopeId) -> Value {
        let chain: Vec<&Scope> = self.ancestors(id).collect();
        let mut merged = Map::new();
        for scope in chain.into_iter().rev() {
            for (name, value) in &scope.values {
                merged.insert(name.clone(), value.clone());
            }
        }
        Value::Object(merged)
    }
}

fn write_root(values: &mut Map<String, Value>, segments: &[CompactString], value: Value) -> bool {
    let Some((root, rest)) = segments.split_first() else {
        return false;
    };
    if rest.is_empty() {
        values.insert(root.to_string(), value);
        return true;
    }
    let slot = values.entry(root.to_string()).or_insert(Value::Null);
    write_into(slot, rest, value)
}

fn write_into(target: &mut Value, segments: &[CompactString], value: Value) -> bool {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return true;
    };
    if target.is_null() {
        *target = Value::Object(Map::new());
    }
    match target {
        Value::Object(map) => {
            if rest.is_empty() {
                map.insert(head.to_string(), value);
                return true;
            }
            let slot = map.entry(head.to_string()).or_insert(Value::Null);
            write_into(slot, rest, value)
        }
        Value::Array(items) => {
            let Some(slot) = head
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get_mut(index))
            else {
                return false;
            };
            if rest.is_empty() {
                *slot = value;
                return true;
            }
            write_into(slot, rest, value)
        }
        _ => false,
    }
}
