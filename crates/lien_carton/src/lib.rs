//! Carton - The toolbox for Lien.
//!
//! This crate provides the foundational utilities shared by every Lien crate,
//! much like a carton (artist's portfolio case) holds the tools an artist
//! reaches for before starting any piece.
//!
//! # Modules
//!
//! - **value**: coercion and equality rules for the dynamic value model
//!   (truthiness, numeric coercion, loose and structural equality)
//! - **display**: turning values into the strings written to elements
//! - **general**: identifier and keyword helpers used by the parsers
//!
//! # Example
//!
//! ```
//! use lien_carton::value::{loose_eq, structural_eq};
//! use serde_json::json;
//!
//! assert!(loose_eq(&json!("1"), &json!(1)));
//! assert!(structural_eq(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
//! ```

pub mod display;
pub mod general;
pub mod value;

// Re-export compact_str::CompactString for convenience
pub use compact_str::CompactString;

// Re-export smallvec for stack-optimized collections
pub use smallvec::{smallvec, SmallVec};

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_set, Set as PhfSet};

// Re-export the dynamic value model
pub use serde_json::{Map, Number, Value};

pub use display::*;
pub use general::*;
