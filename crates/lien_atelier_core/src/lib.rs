//! # lien_atelier_core
//!
//! Atelier Core - The core workshop for Lien.
//!
//! ## Name Origin
//!
//! **Atelier** (/ˌætəlˈjeɪ/) is French for "workshop" or "studio", the place
//! where artists craft their works. `lien_atelier_core` is where binding
//! expressions are worked into getters and setters.
//!
//! ## Components
//!
//! - [`compile`]: turns `path | filter:arg` sources into a [`Getter`] and an
//!   optional [`Setter`]
//! - [`transforms`]: identifier qualification and null-safety rewrites
//! - [`eval`]: the interpreter the getter runs
//! - [`filters`]: the filter library (`filter`, `orderBy`, `limitTo`,
//!   `number`, `currency`, `date`, `json`, `lowercase`, `uppercase`)
//!
//! ## Example
//!
//! ```
//! use lien_atelier_core::{compile, EvalContext, FilterLibrary};
//! use lien_croquis::Scopes;
//! use lien_relief::BinderOptions;
//! use serde_json::json;
//!
//! let mut scopes = Scopes::new();
//! let compiled = compile("user.name | uppercase").unwrap();
//! assert!(!compiled.is_assignable());
//!
//! scopes.set_local(Scopes::global(), "user", json!({"name": "ann"})).unwrap();
//! let filters = FilterLibrary::new();
//! let options = BinderOptions::default();
//! let ctx = EvalContext::new(&scopes, Scopes::global(), &filters, &options);
//! assert_eq!(compiled.getter().get(&ctx).unwrap(), json!("ANN"));
//! ```

pub mod compile;
pub mod eval;
pub mod filters;
pub mod transforms;

pub use compile::{compile, CompiledExpression, Getter, Setter};
pub use eval::{evaluate, EvalContext};
pub use filters::{Criterion, Filter, FilterLibrary, OrderKey};

// Re-export the shared layers
pub use lien_croquis::{Alias, ScopeId, Scopes};
pub use lien_relief::{BinderOptions, EvaluationError, ExpressionError};
