//! Per-node analysis snapshot.
//!
//! A [`NodeProfile`] is rebuilt on every call and never cached: the tree may
//! have mutated between invocations.

use bitflags::bitflags;
use page_tree::{is_semantic_tag, PageTree};
use pinpoint_core_types::NodeId;
use serde::{Deserialize, Serialize};

use crate::stability::{attribute_rank, is_durable_class, is_durable_id, is_unstable_attribute};

/// How many ancestors the semantic-context walk inspects.
const SEMANTIC_ANCESTOR_DEPTH: usize = 5;

/// Cap on durable classes kept per node.
const MAX_DURABLE_CLASSES: usize = 3;

/// Cap on captured direct text, in characters.
const MAX_DIRECT_TEXT: usize = 50;

/// Attributes that mark a node as belonging to Radix primitives.
const RADIX_SELF_ATTRIBUTES: &[&str] = &[
    "data-radix-collection-item",
    "data-state",
    "data-radix-dropdown-menu-trigger",
    "data-radix-popover-trigger",
    "data-radix-dialog-trigger",
];

/// Attributes that mark a subtree as Radix-portaled content; matched on the
/// node or any ancestor.
const RADIX_SCOPE_ATTRIBUTES: &[&str] = &[
    "data-radix-collection-item",
    "data-radix-dropdown-menu-content",
    "data-radix-popover-content",
    "data-radix-dialog-content",
];

/// Utility classes that, combined, read as the shadcn component idiom.
pub const SHADCN_COMMON_CLASSES: &[&str] =
    &["inline-flex", "items-center", "justify-center", "rounded-md"];

bitflags! {
    /// Accessibility facts about a node.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
    pub struct AccessFlags: u8 {
        const ARIA_LABEL = 0b001;
        const ROLE = 0b010;
        const INTERACTIVE = 0b100;
    }
}

/// UI library affiliation detected from fingerprints on the node or its
/// ancestors.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiLibrary {
    #[default]
    None,
    Radix,
    Shadcn,
}

/// A durable attribute with its allowlist rank.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DurableAttr {
    pub name: String,
    pub value: String,
    pub rank: usize,
}

/// A semantic ancestor and its distance from the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SemanticAncestor {
    pub tag: String,
    pub depth: usize,
}

/// Immutable per-invocation snapshot of one node.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeProfile {
    pub tag: String,
    pub durable_id: Option<String>,
    pub durable_attributes: Vec<DurableAttr>,
    pub durable_classes: Vec<String>,
    pub direct_text: String,
    pub ui_library: UiLibrary,
    pub semantic_ancestry: Vec<SemanticAncestor>,
    pub accessibility: AccessFlags,
}

/// Build a profile of the node from the current tree state. Deterministic
/// for a fixed tree.
pub fn analyze(tree: &PageTree, id: NodeId) -> NodeProfile {
    let tag = tree.tag(id).to_string();

    let durable_id = tree
        .id_attr(id)
        .filter(|value| is_durable_id(value))
        .map(str::to_string);

    let mut durable_attributes: Vec<DurableAttr> = tree
        .node(id)
        .attrs
        .iter()
        .filter_map(|(name, value)| {
            let trimmed = value.trim();
            if trimmed.is_empty() || is_unstable_attribute(name) {
                return None;
            }
            attribute_rank(name).map(|rank| DurableAttr {
                name: name.clone(),
                value: trimmed.to_string(),
                rank,
            })
        })
        .collect();
    durable_attributes.sort_by_key(|attr| attr.rank);

    let durable_classes: Vec<String> = tree
        .classes(id)
        .filter(|class| is_durable_class(class))
        .take(MAX_DURABLE_CLASSES)
        .map(str::to_string)
        .collect();

    let direct_text: String = tree.direct_text(id).chars().take(MAX_DIRECT_TEXT).collect();

    let mut accessibility = AccessFlags::empty();
    if tree.has_attr(id, "aria-label") {
        accessibility |= AccessFlags::ARIA_LABEL;
    }
    if tree.has_attr(id, "role") {
        accessibility |= AccessFlags::ROLE;
    }
    if tree.is_interactive(id) {
        accessibility |= AccessFlags::INTERACTIVE;
    }

    NodeProfile {
        tag,
        durable_id,
        durable_attributes,
        durable_classes,
        direct_text,
        ui_library: detect_ui_library(tree, id),
        semantic_ancestry: semantic_ancestry(tree, id),
        accessibility,
    }
}

fn semantic_ancestry(tree: &PageTree, id: NodeId) -> Vec<SemanticAncestor> {
    tree.ancestors(id)
        .take(SEMANTIC_ANCESTOR_DEPTH)
        .enumerate()
        .filter(|(_, ancestor)| is_semantic_tag(tree.tag(*ancestor)))
        .map(|(i, ancestor)| SemanticAncestor {
            tag: tree.tag(ancestor).to_string(),
            depth: i + 1,
        })
        .collect()
}

fn detect_ui_library(tree: &PageTree, id: NodeId) -> UiLibrary {
    let radix_on_self = RADIX_SELF_ATTRIBUTES
        .iter()
        .any(|attr| tree.has_attr(id, attr));
    let radix_in_scope = RADIX_SCOPE_ATTRIBUTES.iter().any(|attr| {
        tree.self_and_ancestors(id)
            .any(|node| tree.has_attr(node, attr))
    });
    if radix_on_self || radix_in_scope {
        return UiLibrary::Radix;
    }

    let has = |class: &str| tree.has_class(id, class);
    if (has("inline-flex") && has("items-center"))
        || has("rounded-md")
        || has("border")
        || has("shadow-sm")
    {
        return UiLibrary::Shadcn;
    }

    UiLibrary::None
}
