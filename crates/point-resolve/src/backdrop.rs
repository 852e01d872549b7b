//! Backdrop/portal-scrim classification.

use page_tree::{is_interactive_tag, PageTree, Position};
use pinpoint_core_types::NodeId;

use crate::policy::BackdropPolicy;

/// Whether the node is a non-interactive overlay layer (modal backdrop,
/// dropdown scrim) rather than a real resolution target.
///
/// Natively interactive nodes and nodes carrying direct text are never
/// backdrops, whatever their geometry says: a full-screen `<button>` is a
/// legitimate surface.
pub fn is_backdrop(tree: &PageTree, id: NodeId, policy: &BackdropPolicy) -> bool {
    if is_interactive_tag(tree.tag(id)) {
        return false;
    }
    if !tree.direct_text(id).is_empty() {
        return false;
    }

    let has_marker_class = tree.classes(id).any(|class| {
        let lower = class.to_ascii_lowercase();
        policy.class_markers.iter().any(|marker| lower.contains(marker.as_str()))
    });
    if has_marker_class {
        return true;
    }

    if policy
        .overlay_attributes
        .iter()
        .any(|attr| tree.has_attr(id, attr))
    {
        return true;
    }

    let layout = &tree.node(id).layout;
    let full_viewport =
        layout.position == Position::Fixed && layout.rect.covers_viewport(tree.viewport());
    let very_high_z = layout.z_index.unwrap_or(0) > policy.z_index_threshold;
    if full_viewport && very_high_z {
        return true;
    }

    // Utility-class idiom: fixed, zero-inset, explicit stacking level.
    let mut has_fixed = false;
    let mut has_inset = false;
    let mut has_z = false;
    for class in tree.classes(id) {
        has_fixed |= class.contains("fixed");
        has_inset |= class == "inset-0";
        has_z |= class.starts_with("z-");
    }
    has_fixed && has_inset && has_z
}

#[cfg(test)]
mod tests {
    use page_tree::{Layout, PageTree};
    use pinpoint_core_types::{Rect, Size};

    use super::*;

    fn tree() -> PageTree {
        PageTree::new("html", Size::new(1000.0, 700.0))
    }

    fn full_viewport_layout(z: i32) -> Layout {
        Layout {
            rect: Rect::new(0.0, 0.0, 1000.0, 700.0),
            position: Position::Fixed,
            z_index: Some(z),
            pointer_events: true,
        }
    }

    #[test]
    fn marker_class_flags_backdrop() {
        let mut tree = tree();
        let div = tree.append_child(tree.root(), "div");
        tree.set_attr(div, "class", "MyModal-Backdrop");
        assert!(is_backdrop(&tree, div, &BackdropPolicy::default()));
    }

    #[test]
    fn overlay_attribute_flags_backdrop() {
        let mut tree = tree();
        let div = tree.append_child(tree.root(), "div");
        tree.set_attr(div, "data-radix-dialog-overlay", "");
        assert!(is_backdrop(&tree, div, &BackdropPolicy::default()));
    }

    #[test]
    fn full_viewport_needs_extreme_stacking() {
        let mut tree = tree();
        let low = tree.append_child(tree.root(), "div");
        tree.set_layout(low, full_viewport_layout(100));
        assert!(!is_backdrop(&tree, low, &BackdropPolicy::default()));

        let high = tree.append_child(tree.root(), "div");
        tree.set_layout(high, full_viewport_layout(10_000));
        assert!(is_backdrop(&tree, high, &BackdropPolicy::default()));
    }

    #[test]
    fn utility_combo_flags_backdrop() {
        let mut tree = tree();
        let div = tree.append_child(tree.root(), "div");
        tree.set_attr(div, "class", "fixed inset-0 z-50");
        assert!(is_backdrop(&tree, div, &BackdropPolicy::default()));

        let partial = tree.append_child(tree.root(), "div");
        tree.set_attr(partial, "class", "fixed inset-0");
        assert!(!is_backdrop(&tree, partial, &BackdropPolicy::default()));
    }

    #[test]
    fn interactive_tags_are_exempt() {
        let mut tree = tree();
        let button = tree.append_child(tree.root(), "button");
        tree.set_layout(button, full_viewport_layout(10_000));
        tree.set_attr(button, "class", "backdrop");
        assert!(!is_backdrop(&tree, button, &BackdropPolicy::default()));
    }

    #[test]
    fn text_bearing_nodes_are_exempt() {
        let mut tree = tree();
        let div = tree.append_child(tree.root(), "div");
        tree.set_attr(div, "class", "overlay");
        tree.add_text(div, "Loading…");
        assert!(!is_backdrop(&tree, div, &BackdropPolicy::default()));
    }
}
