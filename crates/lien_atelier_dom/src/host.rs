//! The element-tree interface the binder drives.
//!
//! The binder never touches a concrete UI toolkit. Everything it needs from
//! the element tree goes through [`Host`]: reading and writing element
//! content, toggling visibility, cloning and moving sub-trees for repeats,
//! and registering interest in user edits.
//!
//! Bindings refer to elements by identity (the `id` attribute) and resolve
//! them through [`Host::find`] on every access, so a binding whose element
//! was removed fails cleanly instead of writing into a detached node.

use std::fmt::Debug;

use lien_carton::{CompactString, Value};

use crate::identity::Renaming;

/// When an input element reports a user edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeTrigger {
    /// The edit was committed (`change`)
    Commit,
    /// Every keystroke (`immediate` elements)
    Keystroke,
}

/// Operations the binder needs from an element tree
pub trait Host {
    /// Handle to an element. Handles stay valid while the element exists.
    type Node: Copy + Eq + Debug;

    /// Find an attached element by identity
    fn find(&self, id: &str) -> Option<Self::Node>;

    /// The identity of an element, if it has one
    fn id_of(&self, node: Self::Node) -> Option<CompactString>;

    /// Give an element an identity
    fn set_id(&mut self, node: Self::Node, id: &str);

    /// Whether the element holds a user-editable value
    fn is_input(&self, node: Self::Node) -> bool;

    /// Attributes in document order
    fn attributes(&self, node: Self::Node) -> Vec<(CompactString, String)>;

    fn attr(&self, node: Self::Node, name: &str) -> Option<String>;

    fn set_attr(&mut self, node: Self::Node, name: &str, value: &str);

    fn remove_attr(&mut self, node: Self::Node, name: &str);

    /// Text content of the element and its descendants
    fn text(&self, node: Self::Node) -> String;

    /// Replace the element's content with text
    fn set_text(&mut self, node: Self::Node, text: &str);

    /// Form value of an input-capable element
    fn value(&self, node: Self::Node) -> String;

    fn set_value(&mut self, node: Self::Node, value: &str);

    /// Property value (`checked` reads as a boolean)
    fn prop(&self, node: Self::Node, name: &str) -> Value;

    /// Set a boolean property
    fn set_prop(&mut self, node: Self::Node, name: &str, value: bool);

    fn show(&mut self, node: Self::Node);

    fn hide(&mut self, node: Self::Node);

    /// Deep-copy a sub-tree. The copy is detached until inserted.
    fn clone_subtree(&mut self, node: Self::Node) -> Self::Node;

    /// Apply an identity renaming to every element of a sub-tree, root
    /// included, rewriting `for` references along with the identities.
    fn rename(&mut self, root: Self::Node, renaming: &Renaming);

    /// Insert a detached sub-tree right after `reference`
    fn insert_after(&mut self, node: Self::Node, reference: Self::Node);

    /// Detach and drop a sub-tree
    fn remove(&mut self, node: Self::Node);

    /// Identities of every element in a sub-tree, root included, in
    /// document order
    fn identities_within(&self, node: Self::Node) -> Vec<CompactString>;

    /// Child elements in document order
    fn children(&self, node: Self::Node) -> Vec<Self::Node>;

    /// Ask to be notified when the user edits the element
    fn listen(&mut self, node: Self::Node, trigger: ChangeTrigger);

    /// Dispatch a named signal on an element
    fn dispatch(&mut self, node: Self::Node, signal: &str);
}
