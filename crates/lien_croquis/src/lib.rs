//! # lien_croquis
//!
//! Croquis - The scope layer for Lien.
//!
//! ## Name Origin
//!
//! **Croquis** (/kʁɔ.ki/) is a French term for a quick, sketchy drawing that
//! captures the essential features of a subject. `lien_croquis` sketches where
//! each name in a binding expression lives: in the clone-local scope of a
//! repeated element, or further up the chain in the global scope.
//!
//! ## Purpose
//!
//! - **Scope Arena**: every scope lives in one [`Scopes`] arena addressed by
//!   [`ScopeId`]; the global scope is created with the arena and never freed
//! - **Chain Resolution**: reads fall back to the parent scope, writes land on
//!   the nearest scope that owns the name
//! - **Write-through**: loop variables can forward writes to the collection
//!   entry they were copied from
//!
//! ## Architecture
//!
//! ```text
//! lien_armature (Parse)
//!        ↓
//!   lien_relief (AST)
//!        ↓
//!  lien_croquis (Scopes)  ← This crate
//!        ↓
//! lien_atelier_core (Compile + Evaluate)
//! ```

mod scope;

pub use scope::*;
