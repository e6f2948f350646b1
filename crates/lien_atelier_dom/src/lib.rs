//! # lien_atelier_dom
//!
//! Atelier DOM - The element workshop for Lien.
//!
//! ## Name Origin
//!
//! **Atelier** (/ˌætəlˈjeɪ/) is French for "workshop" or "studio".
//! `lien_atelier_dom` is the bench where compiled expressions meet elements:
//! bindings are registered, kept in sync, and repeated.
//!
//! ## Components
//!
//! - [`Host`]: the element-tree interface the binder drives
//! - [`Binder`]: the binding context (registry, scopes, options, filters)
//! - [`Binder::sync`]: the bounded fixed-point synchronizer
//! - [`Binder::repeat`]: the keyed repeat reconciler
//! - [`Binder::init`]: the declaration sweep (`bind`, `bind-<target>`,
//!   `repeat`)
//! - [`MemoryDom`]: an in-memory element tree implementing [`Host`]
//!
//! ## Example
//!
//! ```
//! use lien_atelier_dom::{Binder, Host, MemoryDom};
//! use serde_json::json;
//!
//! let mut dom = MemoryDom::parse(r#"<input id="name" bind="user.name"><p id="out" bind="user.name | uppercase"></p>"#).unwrap();
//! let mut binder = Binder::new();
//! binder.set("user", json!({"name": "ann"}));
//! let root = dom.root();
//! binder.init(&mut dom, root, binder.global()).unwrap();
//! binder.sync(&mut dom).unwrap();
//! assert_eq!(dom.render(), r#"<input id="name" bind="user.name" value="ann"><p id="out" bind="user.name | uppercase">ANN</p>"#);
//!
//! dom.input("name", "bob");
//! dom.commit("name");
//! assert!(dom.take_pending_sync());
//! binder.sync(&mut dom).unwrap();
//! assert_eq!(binder.get("user"), Some(&json!({"name": "bob"})));
//! let out = dom.find("out").unwrap();
//! assert_eq!(dom.text(out), "BOB");
//! ```

mod binder;
mod binding;
mod error;
mod host;
mod identity;
mod memory;
mod registry;
mod repeat;
mod sweep;
mod sync;

pub use binder::{Binder, AUTO_ID_PREFIX};
pub use binding::{Binding, BindingId, BindingKind, Target};
pub use error::BindError;
pub use host::{ChangeTrigger, Host};
pub use identity::{clone_suffix, suffix_identities, Renaming};
pub use memory::{MemoryDom, NodeId, Signal};
pub use registry::Registry;
pub use repeat::{RepeatClone, RepeatState, REMOVE_SIGNAL, REPEAT_ATTRIBUTES};
pub use sync::{SyncReport, MAX_PASSES};

// Re-export the layers below for convenience
pub use lien_atelier_core::{compile, BinderOptions, EvaluationError, ExpressionError, FilterLibrary};
pub use lien_croquis::{ScopeId, Scopes};
