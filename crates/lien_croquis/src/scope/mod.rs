//! Scope chains for binding expressions.
//!
//! Every scope a binder uses lives in one [`Scopes`] arena. Each repeat clone
//! gets a child scope holding its loop variables; everything else resolves
//! through the parent chain up to the global scope.
//!
//! ## Module Structure
//!
//! - [`types`] - Identifiers and write-through aliases
//! - [`chain`] - The scope arena and chain resolution

mod chain;
mod types;

#[cfg(test)]
mod chain_tests;

pub use chain::{Scope, Scopes};
pub use types::{Alias, ScopeId};
