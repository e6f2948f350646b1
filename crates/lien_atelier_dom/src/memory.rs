//! In-memory element tree.
//!
//! [`MemoryDom`] is an arena-backed [`Host`] used by the CLI and by tests.
//! It keeps just enough of a browser document for binding: tags, attributes,
//! text, form values, boolean properties, a hidden flag, listeners and a log
//! of dispatched signals.
//!
//! Nodes live in a `Vec` and are addressed by [`NodeId`]. Slot 0 is the
//! document. Removed sub-trees leave empty slots behind; ids are never
//! reused. An identity index covers attached elements only, so lookups
//! never reach a detached clone or a removed row.

use lien_armature::markup::is_void_tag;
use lien_armature::{parse_markup, MarkupError, MarkupNode};
use lien_carton::{is_input_tag, phf_set, CompactString, FxHashMap, PhfSet, SmallVec, Value};
use serde::Serialize;

use crate::host::{ChangeTrigger, Host};
use crate::identity::Renaming;

/// Properties that read as booleans and map onto attribute presence
static BOOLEAN_PROPS: PhfSet<&'static str> = phf_set! {
    "checked", "disabled", "readonly", "selected", "hidden", "multiple", "required",
};

/// Handle to a node of a [`MemoryDom`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    pub const DOCUMENT: Self = Self(0);

    #[inline(always)]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    #[inline(always)]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A signal dispatched on an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signal {
    /// Identity of the target element at dispatch time
    pub target: CompactString,
    pub name: CompactString,
}

#[derive(Debug, Clone)]
enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

#[derive(Debug, Clone)]
struct ElementData {
    tag: CompactString,
    attrs: Vec<(CompactString, String)>,
    hidden: bool,
}

impl ElementData {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n.as_str() == name)
            .map(|(_, v)| v.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|(n, _)| n.as_str() == name) {
            Some((_, existing)) => {
                existing.clear();
                existing.push_str(value);
            }
            None => self.attrs.push((CompactString::new(name), value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(n, _)| n.as_str() != name);
    }
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed element tree
#[derive(Debug, Clone)]
pub struct MemoryDom {
    nodes: Vec<Option<Node>>,
    ids: FxHashMap<CompactString, NodeId>,
    listeners: FxHashMap<NodeId, SmallVec<[ChangeTrigger; 2]>>,
    signals: Vec<Signal>,
    pending_sync: bool,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// An empty document
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            })],
            ids: FxHashMap::default(),
            listeners: FxHashMap::default(),
            signals: Vec::new(),
            pending_sync: false,
        }
    }

    /// Build a document from markup.
    ///
    /// A `hidden` attribute in the markup becomes the element's hidden flag.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        let mut dom = Self::new();
        for node in parse_markup(markup)? {
            dom.build(node, NodeId::DOCUMENT);
        }
        Ok(dom)
    }

    fn build(&mut self, markup: MarkupNode, parent: NodeId) {
        let id = match markup {
            MarkupNode::Text(text) => self.alloc(NodeData::Text(text)),
            MarkupNode::Element(element) => {
                let hidden = element.attr("hidden").is_some();
                let mut attrs = element.attrs;
                attrs.retain(|(name, _)| name.as_str() != "hidden");
                let id = self.alloc(NodeData::Element(ElementData {
                    tag: element.tag,
                    attrs,
                    hidden,
                }));
                for child in element.children {
                    self.build(child, id);
                }
                id
            }
        };
        self.append(parent, id);
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Some(Node {
            data,
            parent: None,
            children: Vec::new(),
        }));
        id
    }

    fn append(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.node_mut(parent) {
            node.children.push(child);
        }
        if self.is_attached(parent) {
            self.index_subtree(child);
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::DOCUMENT
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())?.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())?.as_mut()
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match &self.node(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Tag name of an element
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|element| element.tag.as_str())
    }

    /// Whether the node is reachable from the document
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if node_id == NodeId::DOCUMENT {
                return true;
            }
            current = self.node(node_id).and_then(|node| node.parent);
        }
        false
    }

    /// Whether the element is hidden, or sits inside a hidden element
    pub fn is_hidden(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node_id) = current {
            if self.element(node_id).is_some_and(|element| element.hidden) {
                return true;
            }
            current = self.node(node_id).and_then(|node| node.parent);
        }
        false
    }

    /// Nodes of a sub-tree in document order, root included
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            out.push(id);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    fn index_subtree(&mut self, root: NodeId) {
        for id in self.descendants(root) {
            let identity = self
                .element(id)
                .and_then(|e| e.attr("id"))
                .filter(|identity| !identity.is_empty())
                .map(CompactString::new);
            if let Some(identity) = identity {
                self.ids.insert(identity, id);
            }
        }
    }

    fn unindex_subtree(&mut self, root: NodeId) {
        for id in self.descendants(root) {
            let identity = self
                .element(id)
                .and_then(|e| e.attr("id"))
                .map(CompactString::new);
            if let Some(identity) = identity {
                if self.ids.get(&identity) == Some(&id) {
                    self.ids.remove(&identity);
                }
            }
        }
    }

    fn detach(&mut self, id: NodeId) {
        if self.is_attached(id) {
            self.unindex_subtree(id);
        }
        let parent = self.node_mut(id).and_then(|node| node.parent.take());
        if let Some(parent) = parent.and_then(|parent| self.node_mut(parent)) {
            parent.children.retain(|child| *child != id);
        }
    }

    /// Simulate the user typing into an input. Raises the pending-sync flag
    /// when the element listens for keystrokes. Returns whether the element
    /// was found.
    pub fn input(&mut self, id: &str, value: &str) -> bool {
        let Some(node) = self.find(id) else {
            return false;
        };
        self.set_value(node, value);
        if self.listens(node, ChangeTrigger::Keystroke) {
            self.pending_sync = true;
        }
        true
    }

    /// Simulate the user committing an edit (leaving the field, picking an
    /// option). Raises the pending-sync flag when the element listens.
    pub fn commit(&mut self, id: &str) -> bool {
        let Some(node) = self.find(id) else {
            return false;
        };
        if self.listens(node, ChangeTrigger::Commit) {
            self.pending_sync = true;
        }
        true
    }

    /// Simulate the user ticking or clearing a checkbox
    pub fn check(&mut self, id: &str, checked: bool) -> bool {
        let Some(node) = self.find(id) else {
            return false;
        };
        self.set_prop(node, "checked", checked);
        self.commit(id)
    }

    /// Whether `node` has a listener for `trigger`
    pub fn listens(&self, node: NodeId, trigger: ChangeTrigger) -> bool {
        self.listeners
            .get(&node)
            .is_some_and(|triggers| triggers.contains(&trigger))
    }

    /// Read and clear the pending-sync flag
    pub fn take_pending_sync(&mut self) -> bool {
        std::mem::take(&mut self.pending_sync)
    }

    /// Signals dispatched so far, oldest first
    pub fn signals(&self) -> &[Signal] {
        &self.signals
    }

    pub fn take_signals(&mut self) -> Vec<Signal> {
        std::mem::take(&mut self.signals)
    }

    /// Serialize the document. Hidden elements carry a `hidden` attribute.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_children(NodeId::DOCUMENT, true, &mut out);
        out
    }

    /// Serialize the document without hidden elements
    pub fn render_visible(&self) -> String {
        let mut out = String::new();
        self.render_children(NodeId::DOCUMENT, false, &mut out);
        out
    }

    fn render_children(&self, id: NodeId, include_hidden: bool, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        for child in &node.children {
            self.render_node(*child, include_hidden, out);
        }
    }

    fn render_node(&self, id: NodeId, include_hidden: bool, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.data {
            NodeData::Document => self.render_children(id, include_hidden, out),
            NodeData::Text(text) => out.push_str(&htmlize::escape_text(text.as_str())),
            NodeData::Element(element) => {
                if element.hidden && !include_hidden {
                    return;
                }
                out.push('<');
                out.push_str(&element.tag);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !value.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&htmlize::escape_attribute(value.as_str()));
                        out.push('"');
                    }
                }
                if element.hidden {
                    out.push_str(" hidden");
                }
                out.push('>');
                if is_void_tag(&element.tag) {
                    return;
                }
                self.render_children(id, include_hidden, out);
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    fn options_of(&self, select: NodeId) -> Vec<NodeId> {
        self.descendants(select)
            .into_iter()
            .filter(|id| self.tag(*id) == Some("option"))
            .collect()
    }

    fn option_value(&self, option: NodeId) -> String {
        match self.element(option).and_then(|e| e.attr("value")) {
            Some(value) => value.to_string(),
            None => self.text(option),
        }
    }
}

impl Host for MemoryDom {
    type Node = NodeId;

    fn find(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    fn id_of(&self, node: NodeId) -> Option<CompactString> {
        self.element(node)?.attr("id").map(CompactString::new)
    }

    fn set_id(&mut self, node: NodeId, id: &str) {
        let attached = self.is_attached(node);
        if attached {
            if let Some(old) = self.id_of(node) {
                if self.ids.get(&old) == Some(&node) {
                    self.ids.remove(&old);
                }
            }
        }
        let Some(element) = self.element_mut(node) else {
            return;
        };
        element.set_attr("id", id);
        if attached && !id.is_empty() {
            self.ids.insert(CompactString::new(id), node);
        }
    }

    fn is_input(&self, node: NodeId) -> bool {
        self.tag(node).is_some_and(is_input_tag)
    }

    fn attributes(&self, node: NodeId) -> Vec<(CompactString, String)> {
        self.element(node)
            .map(|element| element.attrs.clone())
            .unwrap_or_default()
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<String> {
        self.element(node)?.attr(name).map(str::to_string)
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if name == "id" {
            self.set_id(node, value);
        } else if let Some(element) = self.element_mut(node) {
            element.set_attr(name, value);
        }
    }

    fn remove_attr(&mut self, node: NodeId, name: &str) {
        if name == "id" && self.is_attached(node) {
            if let Some(old) = self.id_of(node) {
                if self.ids.get(&old) == Some(&node) {
                    self.ids.remove(&old);
                }
            }
        }
        if let Some(element) = self.element_mut(node) {
            element.remove_attr(name);
        }
    }

    fn text(&self, node: NodeId) -> String {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| match &self.node(id)?.data {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let children = match self.node(node) {
            Some(n) if matches!(n.data, NodeData::Element(_)) => n.children.clone(),
            _ => return,
        };
        for child in children {
            self.remove(child);
        }
        if !text.is_empty() {
            let child = self.alloc(NodeData::Text(text.to_string()));
            self.append(node, child);
        }
    }

    fn value(&self, node: NodeId) -> String {
        match self.tag(node) {
            Some("textarea") => self.text(node),
            Some("select") => {
                let options = self.options_of(node);
                options
                    .iter()
                    .find(|option| {
                        self.element(**option)
                            .is_some_and(|e| e.attr("selected").is_some())
                    })
                    .or_else(|| options.first())
                    .map(|option| self.option_value(*option))
                    .unwrap_or_default()
            }
            _ => self.attr(node, "value").unwrap_or_default(),
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        let tag = self.tag(node).map(CompactString::new);
        match tag.as_deref() {
            Some("textarea") => self.set_text(node, value),
            Some("select") => {
                for option in self.options_of(node) {
                    let selected = self.option_value(option) == value;
                    self.set_prop(option, "selected", selected);
                }
            }
            _ => self.set_attr(node, "value", value),
        }
    }

    fn prop(&self, node: NodeId, name: &str) -> Value {
        if BOOLEAN_PROPS.contains(name) {
            return Value::Bool(self.attr(node, name).is_some());
        }
        if name == "value" {
            return Value::String(self.value(node));
        }
        self.attr(node, name).map_or(Value::Null, Value::String)
    }

    fn set_prop(&mut self, node: NodeId, name: &str, value: bool) {
        if name == "hidden" {
            if value {
                self.hide(node);
            } else {
                self.show(node);
            }
        } else if value {
            self.set_attr(node, name, "");
        } else {
            self.remove_attr(node, name);
        }
    }

    fn show(&mut self, node: NodeId) {
        if let Some(element) = self.element_mut(node) {
            element.hidden = false;
        }
    }

    fn hide(&mut self, node: NodeId) {
        if let Some(element) = self.element_mut(node) {
            element.hidden = true;
        }
    }

    fn clone_subtree(&mut self, node: NodeId) -> NodeId {
        let Some(source) = self.node(node).cloned() else {
            return node;
        };
        let copy = self.alloc(source.data);
        for child in source.children {
            let child_copy = self.clone_subtree(child);
            if let Some(n) = self.node_mut(child_copy) {
                n.parent = Some(copy);
            }
            if let Some(n) = self.node_mut(copy) {
                n.children.push(child_copy);
            }
        }
        copy
    }

    fn rename(&mut self, root: NodeId, renaming: &Renaming) {
        let attached = self.is_attached(root);
        if attached {
            self.unindex_subtree(root);
        }
        for id in self.descendants(root) {
            let Some(element) = self.element_mut(id) else {
                continue;
            };
            for attr in ["id", "for"] {
                let renamed = element.attr(attr).and_then(|old| renaming.get(old));
                if let Some(new) = renamed.map(str::to_string) {
                    element.set_attr(attr, &new);
                }
            }
        }
        if attached {
            self.index_subtree(root);
        }
    }

    fn insert_after(&mut self, node: NodeId, reference: NodeId) {
        let Some(parent) = self.node(reference).and_then(|n| n.parent) else {
            return;
        };
        self.detach(node);
        if let Some(p) = self.node_mut(parent) {
            let at = p
                .children
                .iter()
                .position(|child| *child == reference)
                .map_or(p.children.len(), |i| i + 1);
            p.children.insert(at, node);
        }
        if let Some(n) = self.node_mut(node) {
            n.parent = Some(parent);
        }
        if self.is_attached(parent) {
            self.index_subtree(node);
        }
    }

    fn remove(&mut self, node: NodeId) {
        if node == NodeId::DOCUMENT {
            return;
        }
        self.detach(node);
        for id in self.descendants(node) {
            self.listeners.remove(&id);
            if let Some(slot) = self.nodes.get_mut(id.index()) {
                *slot = None;
            }
        }
    }

    fn identities_within(&self, node: NodeId) -> Vec<CompactString> {
        self.descendants(node)
            .into_iter()
            .filter_map(|id| self.id_of(id))
            .filter(|id| !id.is_empty())
            .collect()
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node)
            .map(|n| {
                n.children
                    .iter()
                    .copied()
                    .filter(|child| self.element(*child).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn listen(&mut self, node: NodeId, trigger: ChangeTrigger) {
        let triggers = self.listeners.entry(node).or_default();
        if !triggers.contains(&trigger) {
            triggers.push(trigger);
        }
    }

    fn dispatch(&mut self, node: NodeId, signal: &str) {
        let target = self.id_of(node).unwrap_or_default();
        self.signals.push(Signal {
            target,
            name: CompactString::new(signal),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_render() {
        let dom = MemoryDom::parse(
            r#"<div id="a" class="x"><p>Tom &amp; Jerry</p><input id="i" value="1"><p hidden>gone</p></div>"#,
        )
        .unwrap();
        insta::assert_snapshot!(dom.render(), @r#"<div id="a" class="x"><p>Tom &amp; Jerry</p><input id="i" value="1"><p hidden>gone</p></div>"#);
        insta::assert_snapshot!(dom.render_visible(), @r#"<div id="a" class="x"><p>Tom &amp; Jerry</p><input id="i" value="1"></div>"#);
    }

    #[test]
    fn test_form_values() {
        let mut dom = MemoryDom::parse(
            r#"<select id="s"><option value="a">A</option><option selected>b</option></select><textarea id="t">hi</textarea>"#,
        )
        .unwrap();
        let select = dom.find("s").unwrap();
        assert_eq!(dom.value(select), "b");
        dom.set_value(select, "a");
        assert_eq!(dom.value(select), "a");

        let textarea = dom.find("t").unwrap();
        assert_eq!(dom.value(textarea), "hi");
        dom.set_value(textarea, "there");
        assert_eq!(dom.text(textarea), "there");
    }

    #[test]
    fn test_clone_is_detached_until_inserted() {
        let mut dom = MemoryDom::parse(r#"<ul><li id="row"><b id="cell">x</b></li></ul>"#).unwrap();
        let row = dom.find("row").unwrap();
        let copy = dom.clone_subtree(row);
        assert!(!dom.is_attached(copy));

        let mut renaming = Renaming::default();
        renaming.insert("row", "row_2");
        renaming.insert("cell", "cell_2");
        dom.rename(copy, &renaming);
        assert_eq!(dom.find("cell_2"), None);

        dom.insert_after(copy, row);
        assert_eq!(dom.find("row_2"), Some(copy));
        assert!(dom.find("cell_2").is_some());
        assert_eq!(dom.find("row"), Some(row));
        insta::assert_snapshot!(dom.render(), @r#"<ul><li id="row"><b id="cell">x</b></li><li id="row_2"><b id="cell_2">x</b></li></ul>"#);

        dom.remove(copy);
        assert_eq!(dom.find("row_2"), None);
        assert_eq!(dom.find("cell_2"), None);
    }

    #[test]
    fn test_rename_follows_label_references() {
        let mut dom =
            MemoryDom::parse(r#"<div id="d"><label for="f">F</label><input id="f"></div>"#)
                .unwrap();
        let d = dom.find("d").unwrap();
        let mut renaming = Renaming::default();
        renaming.insert("f", "f_1");
        dom.rename(d, &renaming);
        insta::assert_snapshot!(dom.render(), @r#"<div id="d"><label for="f_1">F</label><input id="f_1"></div>"#);
    }

    #[test]
    fn test_listeners_raise_pending_sync() {
        let mut dom = MemoryDom::parse(r#"<input id="a"><input id="b">"#).unwrap();
        let a = dom.find("a").unwrap();
        dom.listen(a, ChangeTrigger::Commit);

        assert!(dom.input("a", "typed"));
        assert!(!dom.take_pending_sync());
        assert!(dom.commit("a"));
        assert!(dom.take_pending_sync());
        assert!(!dom.take_pending_sync());

        assert!(dom.commit("b"));
        assert!(!dom.take_pending_sync());
        assert!(!dom.input("missing", "x"));
    }

    #[test]
    fn test_boolean_props() {
        let mut dom = MemoryDom::parse(r#"<input id="c" type="checkbox" checked>"#).unwrap();
        let c = dom.find("c").unwrap();
        assert_eq!(dom.prop(c, "checked"), Value::Bool(true));
        dom.set_prop(c, "checked", false);
        assert_eq!(dom.prop(c, "checked"), Value::Bool(false));
        assert_eq!(dom.prop(c, "type"), Value::String("checkbox".into()));
        assert_eq!(dom.prop(c, "title"), Value::Null);
    }
}
