//! In-memory document.
//!
//! A small arena DOM with browser-like mutation delivery: while an observer
//! is registered, connected insertions and filtered attribute writes are
//! queued as [`MutationRecord`]s until [`Document::take_records`]. Like a
//! real `MutationObserver`, writing an attribute queues a record even when
//! the value does not change.

use tracing::debug;

use super::dom::{self, Dom, MutationRecord, ObserveOptions, ReadyState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        /// `src` set through the property by a host that does not reflect it.
        src_override: Option<String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    root: NodeId,
    body: NodeId,
    ready_state: ReadyState,
    observer: Option<ObserveOptions>,
    records: Vec<MutationRecord<NodeId>>,
    attribute_writes: usize,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Empty `<html><body></body></html>` document in the `Loading` state.
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            root: NodeId(0),
            body: NodeId(0),
            ready_state: ReadyState::Loading,
            observer: None,
            records: Vec::new(),
            attribute_writes: 0,
        };
        doc.root = doc.create_element("html");
        doc.body = doc.create_element("body");
        doc.link(doc.root, doc.body);
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            src_override: None,
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Insert `child` as the last child of `parent`, moving it if attached elsewhere.
    ///
    /// Returns `false` and leaves the tree unchanged if `parent` is not an
    /// element or the insertion would make `child` its own ancestor.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if !self.is_element(&parent) || self.is_inclusive_ancestor(child, parent) {
            debug!(?parent, ?child, "rejected append_child");
            return false;
        }
        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.link(parent, child);

        let observed = self
            .observer
            .as_ref()
            .is_some_and(|o| o.child_list && (o.subtree || parent == self.root));
        if observed && self.is_connected(parent) {
            self.records.push(MutationRecord::ChildList {
                target: parent,
                added: vec![child],
            });
        }
        true
    }

    /// Create an `<img src=...>` and append it under `parent`.
    pub fn append_image(&mut self, parent: NodeId, src: &str) -> NodeId {
        let img = self.create_element("img");
        self.set_attribute(&img, dom::SRC, src);
        self.append_child(parent, img);
        img
    }

    /// Set the live `src` property without reflecting it to the attribute.
    pub fn set_src_property_only(&mut self, node: &NodeId, value: &str) {
        if let NodeKind::Element { src_override, .. } = &mut self.nodes[node.0].kind {
            *src_override = Some(value.to_string());
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes[id.0].parent;
        }
        false
    }

    pub fn is_observed(&self) -> bool {
        self.observer.is_some()
    }

    /// Drain queued mutation records.
    pub fn take_records(&mut self) -> Vec<MutationRecord<NodeId>> {
        std::mem::take(&mut self.records)
    }

    pub fn pending_records(&self) -> usize {
        self.records.len()
    }

    /// Number of attribute writes performed so far.
    pub fn attribute_writes(&self) -> usize {
        self.attribute_writes
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    fn link(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn collect_images(&self, node: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.nodes[node.0].children {
            if self.is_image(&child) {
                out.push(child);
            }
            self.collect_images(child, out);
        }
    }
}

impl Dom for Document {
    type Node = NodeId;

    fn images(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.is_image(&self.root) {
            out.push(self.root);
        }
        self.collect_images(self.root, &mut out);
        out
    }

    fn images_within(&self, node: &NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_images(*node, &mut out);
        out
    }

    fn is_element(&self, node: &NodeId) -> bool {
        matches!(self.nodes[node.0].kind, NodeKind::Element { .. })
    }

    fn is_image(&self, node: &NodeId) -> bool {
        self.tag_name(*node) == Some("img")
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.clone()),
            NodeKind::Text(_) => None,
        }
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
        let NodeKind::Element {
            attributes,
            src_override,
            ..
        } = &mut self.nodes[node.0].kind
        else {
            return;
        };

        let name = name.to_ascii_lowercase();
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => attributes.push((name.clone(), value.to_string())),
        }
        if name == dom::SRC {
            *src_override = None;
        }
        self.attribute_writes += 1;

        let observed = self.observer.as_ref().is_some_and(|o| {
            o.wants_attribute(&name) && (o.subtree || *node == self.root)
        });
        if observed && self.is_connected(*node) {
            self.records.push(MutationRecord::Attributes {
                target: *node,
                name,
            });
        }
    }

    fn src_property(&self, node: &NodeId) -> Option<String> {
        match &self.nodes[node.0].kind {
            NodeKind::Element { src_override, .. } => src_override
                .clone()
                .or_else(|| self.attribute(node, dom::SRC))
                .or_else(|| Some(String::new())),
            NodeKind::Text(_) => None,
        }
    }

    fn set_src_property(&mut self, node: &NodeId, value: &str) {
        // The property reflects to the attribute.
        self.set_attribute(node, dom::SRC, value);
    }

    fn srcset_property(&self, node: &NodeId) -> Option<String> {
        if !self.is_element(node) {
            return None;
        }
        Some(self.attribute(node, dom::SRCSET).unwrap_or_default())
    }

    fn set_srcset_property(&mut self, node: &NodeId, value: &str) {
        self.set_attribute(node, dom::SRCSET, value);
    }

    fn observe(&mut self, options: &ObserveOptions) {
        self.observer = Some(options.clone());
    }
}
