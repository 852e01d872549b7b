//! Recognition of the engine's own UI nodes.

use page_tree::PageTree;
use pinpoint_core_types::NodeId;

use crate::policy::ChromePolicy;

/// Whether the node belongs to the engine's own overlay/tooltip/panel
/// chrome (directly or through an ancestor). Such nodes are never valid
/// resolution targets.
pub fn is_engine_node(tree: &PageTree, id: NodeId, policy: &ChromePolicy) -> bool {
    tree.self_and_ancestors(id).any(|node| {
        tree.id_attr(node)
            .is_some_and(|value| value.starts_with(&policy.id_prefix))
            || tree.has_attr(node, &policy.marker_attribute)
    })
}
