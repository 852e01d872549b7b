//! Hit-testing over the paint order.

use pinpoint_core_types::NodeId;

use crate::model::PageTree;

impl PageTree {
    /// Every node whose box contains the point and that participates in
    /// hit-testing, topmost first. Ordering is effective z-index descending,
    /// ties broken by reverse document order (later nodes paint on top).
    pub fn hit_test_all(&self, x: f64, y: f64) -> Vec<NodeId> {
        let mut hits: Vec<(i32, usize, NodeId)> = Vec::new();
        for (doc_index, id) in self.document_order().into_iter().enumerate() {
            let layout = &self.node(id).layout;
            if !layout.pointer_events {
                continue;
            }
            if layout.rect.contains(x, y) {
                hits.push((layout.effective_z(), doc_index, id));
            }
        }
        hits.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));
        hits.into_iter().map(|(_, _, id)| id).collect()
    }

    /// The topmost node at the point, if any.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<NodeId> {
        self.hit_test_all(x, y).into_iter().next()
    }
}
