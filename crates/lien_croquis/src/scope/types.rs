//! Type definitions for scope chains.

use lien_carton::CompactString;
use lien_relief::Path;

/// Unique identifier for a scope in a [`Scopes`](super::Scopes) arena.
///
/// Ids are never reused, so a stale id held by a binding always resolves to
/// a disposed slot rather than to somebody else's scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ScopeId(u32);

impl ScopeId {
    /// The global scope, created with the arena
    pub const GLOBAL: Self = Self(0);

    /// Create a new scope ID
    #[inline(always)]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn is_global(self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a loop variable was copied from.
///
/// A repeat clone's child scope holds a copy of its collection entry. When the
/// collection expression is a plain path, the loop variable carries an alias
/// so that writes through it (`row.done = true`) also land on
/// `collection[key]` in the scope that owns the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alias {
    /// Scope the collection path resolves from
    pub scope: ScopeId,
    /// Path of the collection itself
    pub collection: Path,
    /// Entry key (mapping key, or sequence index as text)
    pub key: CompactString,
}

impl Alias {
    pub fn new(scope: ScopeId, collection: Path, key: impl Into<CompactString>) -> Self {
        Self {
            scope,
            collection,
            key: key.into(),
        }
    }

    /// The path of the aliased entry, followed by `rest`.
    pub fn target(&self, rest: &[CompactString]) -> Path {
        let mut path = self.collection.clone();
        path.segments.push(self.key.clone());
        path.segments.extend(rest.iter().cloned());
        path
    }
}
