//! # Lien
//!
//! Two-way data binding between a scope model and an element tree.
//!
//! This crate re-exports all Lien sub-crates for unified documentation.
//!
//! ## Crates
//!
//! - [`carton`] - Shared utilities and the value model helpers
//! - [`relief`] - Expression AST, errors and binder options
//! - [`armature`] - Expression, repeat-clause and markup parsers
//! - [`croquis`] - Scope arena and scope-chain resolution
//! - [`atelier_core`] - Expression compiler and filter library
//! - [`atelier_dom`] - Bindings, synchronizer, repeats and the in-memory host

/// Shared utilities and the value model helpers.
pub use lien_carton as carton;

/// Expression AST, errors and binder options.
pub use lien_relief as relief;

/// Expression, repeat-clause and markup parsers.
pub use lien_armature as armature;

/// Scope arena and scope-chain resolution.
pub use lien_croquis as croquis;

/// Expression compiler and filter library.
pub use lien_atelier_core as atelier_core;

/// Bindings, synchronizer, repeats and the in-memory host.
pub use lien_atelier_dom as atelier_dom;

pub use lien_atelier_dom::{
    BindError, Binder, BinderOptions, EvaluationError, ExpressionError, FilterLibrary, Host,
    MemoryDom, ScopeId, SyncReport,
};
