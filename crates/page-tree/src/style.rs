//! Scoped cosmetic mutations with guaranteed restore.
//!
//! Both guards capture the previous value on acquisition and put it back in
//! `Drop`, so the host document is left untouched even when the caller
//! unwinds mid-operation.

use pinpoint_core_types::NodeId;
use tracing::debug;

use crate::model::PageTree;

/// Temporarily removes one node from hit-testing.
pub struct HitTestSuppression<'a> {
    tree: &'a mut PageTree,
    id: NodeId,
    prev: bool,
}

impl<'a> HitTestSuppression<'a> {
    pub fn new(tree: &'a mut PageTree, id: NodeId) -> Self {
        let prev = tree.node(id).layout.pointer_events;
        tree.set_pointer_events(id, false);
        debug!(node = %id, "hit-testing suppressed");
        Self { tree, id, prev }
    }

    pub fn tree(&self) -> &PageTree {
        self.tree
    }
}

impl Drop for HitTestSuppression<'_> {
    fn drop(&mut self) {
        self.tree.set_pointer_events(self.id, self.prev);
        debug!(node = %self.id, "hit-testing restored");
    }
}

/// Temporarily outlines a set of nodes (test feedback), restoring whatever
/// outline each node carried before.
pub struct OutlineFlash<'a> {
    tree: &'a mut PageTree,
    saved: Vec<(NodeId, Option<String>)>,
}

impl<'a> OutlineFlash<'a> {
    pub fn new(tree: &'a mut PageTree, ids: &[NodeId], outline: &str) -> Self {
        let mut saved = Vec::with_capacity(ids.len());
        for &id in ids {
            saved.push((id, tree.node(id).outline.clone()));
            tree.set_outline(id, Some(outline.to_string()));
        }
        Self { tree, saved }
    }

    pub fn tree(&self) -> &PageTree {
        self.tree
    }
}

impl Drop for OutlineFlash<'_> {
    fn drop(&mut self) {
        for (id, prev) in self.saved.drain(..) {
            self.tree.set_outline(id, prev);
        }
    }
}
