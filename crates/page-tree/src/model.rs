//! Node arena and read/mutation surface.

use pinpoint_core_types::{NodeId, Rect, Size};
use serde::{Deserialize, Serialize};

/// Tags that are natively interactive.
pub const INTERACTIVE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea"];

/// Attributes whose presence marks an element as interactive.
pub const INTERACTIVE_ATTRIBUTES: &[&str] = &["onclick", "role", "tabindex"];

/// Landmark, structural and form-control tags that provide semantic context.
pub const SEMANTIC_TAGS: &[&str] = &[
    "header", "nav", "main", "section", "article", "aside", "footer", "button", "input", "select",
    "textarea", "form", "label", "h1", "h2", "h3", "h4", "h5", "h6", "p", "a", "img",
];

/// Tags that act as the document's root containers and are never useful
/// resolution targets.
pub const ROOT_CONTAINER_TAGS: &[&str] = &["html", "body"];

pub fn is_interactive_tag(tag: &str) -> bool {
    INTERACTIVE_TAGS.contains(&tag)
}

pub fn is_semantic_tag(tag: &str) -> bool {
    SEMANTIC_TAGS.contains(&tag)
}

pub fn is_root_container_tag(tag: &str) -> bool {
    ROOT_CONTAINER_TAGS.contains(&tag)
}

/// CSS positioning scheme, as far as overlay detection cares about it.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// Resolved layout of one node in viewport coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub rect: Rect,
    pub position: Position,
    pub z_index: Option<i32>,
    /// Whether the node participates in hit-testing.
    pub pointer_events: bool,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            rect: Rect::default(),
            position: Position::Static,
            z_index: None,
            pointer_events: true,
        }
    }
}

impl Layout {
    /// Z value used when ordering the paint stack. Unpositioned nodes sit at
    /// the base level regardless of any declared z-index.
    pub fn effective_z(&self) -> i32 {
        match self.position {
            Position::Static => 0,
            _ => self.z_index.unwrap_or(0),
        }
    }
}

/// One element in the arena.
#[derive(Clone, Debug)]
pub struct NodeData {
    pub tag: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Direct (non-descendant) text runs in document order.
    pub text_runs: Vec<String>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub layout: Layout,
    /// Cosmetic outline applied by test feedback; `None` when untouched.
    pub outline: Option<String>,
}

impl NodeData {
    fn new(tag: &str, parent: Option<NodeId>) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            text_runs: Vec::new(),
            parent,
            children: Vec::new(),
            layout: Layout::default(),
            outline: None,
        }
    }
}

/// The live document tree. Nodes are arena-allocated; a [`NodeId`] is an
/// index into this tree and must not be used across trees.
#[derive(Clone, Debug)]
pub struct PageTree {
    nodes: Vec<NodeData>,
    root: NodeId,
    viewport: Size,
}

impl PageTree {
    pub fn new(root_tag: &str, viewport: Size) -> Self {
        Self {
            nodes: vec![NodeData::new(root_tag, None)],
            root: NodeId(0),
            viewport,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index())
    }

    // --- construction & host-side mutation ---

    pub fn append_child(&mut self, parent: NodeId, tag: &str) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(tag, Some(parent)));
        self.nodes[parent.index()].children.push(id);
        id
    }

    /// Set an attribute, replacing the value in place when the name already
    /// exists so attribute order stays stable.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        let node = &mut self.nodes[id.index()];
        if let Some(entry) = node.attrs.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            node.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        self.nodes[id.index()].attrs.retain(|(n, _)| n != name);
    }

    pub fn add_text(&mut self, id: NodeId, run: &str) {
        self.nodes[id.index()].text_runs.push(run.to_string());
    }

    pub fn clear_text(&mut self, id: NodeId) {
        self.nodes[id.index()].text_runs.clear();
    }

    pub fn set_layout(&mut self, id: NodeId, layout: Layout) {
        self.nodes[id.index()].layout = layout;
    }

    pub fn set_pointer_events(&mut self, id: NodeId, enabled: bool) {
        self.nodes[id.index()].layout.pointer_events = enabled;
    }

    pub fn set_outline(&mut self, id: NodeId, outline: Option<String>) {
        self.nodes[id.index()].outline = outline;
    }

    // --- reads ---

    pub fn tag(&self, id: NodeId) -> &str {
        &self.node(id).tag
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn id_attr(&self, id: NodeId) -> Option<&str> {
        self.attr(id, "id")
    }

    /// Class tokens in document order.
    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.attr(id, "class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Ancestors from the parent upward to the root.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// The node itself, then its ancestors (the `closest()` walk).
    pub fn self_and_ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |&n| self.parent(n))
    }

    /// Direct text of the node: trimmed non-empty runs joined by a space.
    pub fn direct_text(&self, id: NodeId) -> String {
        let runs: Vec<&str> = self
            .node(id)
            .text_runs
            .iter()
            .map(|r| r.trim())
            .filter(|r| !r.is_empty())
            .collect();
        runs.join(" ")
    }

    /// Concatenated text of the node and all descendants, in document order.
    pub fn full_text(&self, id: NodeId) -> String {
        let mut out = Vec::new();
        self.collect_text(id, &mut out);
        out.join(" ")
    }

    fn collect_text(&self, id: NodeId, out: &mut Vec<String>) {
        for run in &self.node(id).text_runs {
            let trimmed = run.trim();
            if !trimmed.is_empty() {
                out.push(trimmed.to_string());
            }
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }

    /// Pre-order (document order) traversal of every element.
    pub fn document_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            order.push(id);
            for &child in self.children(id).iter().rev() {
                stack.push(child);
            }
        }
        order
    }

    /// 1-based position of the node among same-tag siblings.
    pub fn same_tag_ordinal(&self, id: NodeId) -> usize {
        match self.parent(id) {
            Some(parent) => {
                let tag = self.tag(id);
                self.children(parent)
                    .iter()
                    .filter(|&&c| self.tag(c) == tag)
                    .position(|&c| c == id)
                    .map(|p| p + 1)
                    .unwrap_or(1)
            }
            None => 1,
        }
    }

    /// Number of siblings (including the node) sharing its tag.
    pub fn same_tag_sibling_count(&self, id: NodeId) -> usize {
        match self.parent(id) {
            Some(parent) => {
                let tag = self.tag(id);
                self.children(parent)
                    .iter()
                    .filter(|&&c| self.tag(c) == tag)
                    .count()
            }
            None => 1,
        }
    }

    pub fn is_root_container(&self, id: NodeId) -> bool {
        is_root_container_tag(self.tag(id))
    }

    /// Whether the node is interactive: natively interactive tag, or a
    /// role/tabindex/click-handler marker.
    pub fn is_interactive(&self, id: NodeId) -> bool {
        is_interactive_tag(self.tag(id))
            || INTERACTIVE_ATTRIBUTES
                .iter()
                .any(|attr| self.has_attr(id, attr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> (PageTree, NodeId, NodeId, NodeId) {
        let mut tree = PageTree::new("html", Size::new(1280.0, 800.0));
        let body = tree.append_child(tree.root(), "body");
        let div = tree.append_child(body, "div");
        let button = tree.append_child(div, "button");
        tree.set_attr(button, "id", "submit");
        tree.set_attr(button, "class", "btn primary");
        tree.add_text(button, "  Send  ");
        (tree, body, div, button)
    }

    #[test]
    fn attribute_order_is_preserved_on_update() {
        let (mut tree, _, _, button) = sample_tree();
        tree.set_attr(button, "id", "submit-2");
        let names: Vec<&str> = tree
            .node(button)
            .attrs
            .iter()
            .map(|(n, _)| n.as_str())
            .collect();
        assert_eq!(names, vec!["id", "class"]);
        assert_eq!(tree.id_attr(button), Some("submit-2"));
    }

    #[test]
    fn direct_text_is_trimmed_and_joined() {
        let (mut tree, _, div, button) = sample_tree();
        assert_eq!(tree.direct_text(button), "Send");
        tree.add_text(div, "before");
        assert_eq!(tree.full_text(div), "before Send");
        assert_eq!(tree.direct_text(div), "before");
    }

    #[test]
    fn ordinals_count_same_tag_siblings_only() {
        let (mut tree, body, _, _) = sample_tree();
        let s1 = tree.append_child(body, "span");
        let _d2 = tree.append_child(body, "div");
        let s2 = tree.append_child(body, "span");
        assert_eq!(tree.same_tag_ordinal(s1), 1);
        assert_eq!(tree.same_tag_ordinal(s2), 2);
        assert_eq!(tree.same_tag_sibling_count(s2), 2);
    }

    #[test]
    fn document_order_is_preorder() {
        let (tree, body, div, button) = sample_tree();
        assert_eq!(
            tree.document_order(),
            vec![tree.root(), body, div, button]
        );
    }

    #[test]
    fn interactivity_covers_tags_and_markers() {
        let (mut tree, body, div, button) = sample_tree();
        assert!(tree.is_interactive(button));
        assert!(!tree.is_interactive(div));
        tree.set_attr(div, "role", "button");
        assert!(tree.is_interactive(div));
        let plain = tree.append_child(body, "span");
        tree.set_attr(plain, "tabindex", "0");
        assert!(tree.is_interactive(plain));
    }
}
