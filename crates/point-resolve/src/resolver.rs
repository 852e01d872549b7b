//! The layered point-resolution protocol.
//!
//! Layer 1: standard hit-testing. Layer 2: if the hit is a backdrop,
//! suppress it and look behind. Layer 3: if the hit is still a root
//! container (or a theme-classed `html`), filter the full z-order stack and
//! pick the most interactive survivor. Layer 4: a small-radius grid search.
//! Only when all four come up dry does resolution report nothing.

use page_tree::{HitTestSuppression, PageTree};
use pinpoint_core_types::NodeId;
use tracing::debug;

use crate::backdrop::is_backdrop;
use crate::chrome::is_engine_node;
use crate::policy::ResolvePolicies;

/// Markers that identify dropdown/menu machinery worth preferring when a
/// portal hides the semantic wrapper.
const LIBRARY_MARKER_ATTRIBUTES: &[&str] = &[
    "data-radix-dropdown-menu-trigger",
    "data-radix-popover-trigger",
    "data-state",
    "aria-haspopup",
    "data-radix-collection-item",
];

/// Theme tokens on the root element that make a hit on `html` meaningless.
const THEME_CLASS_TOKENS: &[&str] = &["dark", "light", "theme-", "mode-"];

/// Resolve the node a user pointing at `(x, y)` actually means.
///
/// The tree is borrowed mutably only for the scoped hit-test suppression in
/// layer 2; it is always restored before returning.
pub fn resolve_point(
    tree: &mut PageTree,
    x: f64,
    y: f64,
    policies: &ResolvePolicies,
) -> Option<NodeId> {
    let first = tree.hit_test(x, y);

    let mut current = match first {
        Some(hit) => hit,
        None => return grid_search(tree, x, y, policies),
    };

    let problematic = tree.is_root_container(current)
        || is_theme_wrapper(tree, current)
        || is_backdrop(tree, current, &policies.backdrop);
    if !problematic {
        return Some(current);
    }

    if is_backdrop(tree, current, &policies.backdrop) {
        let behind = {
            let guard = HitTestSuppression::new(tree, current);
            guard.tree().hit_test(x, y)
        };
        if let Some(node) = behind {
            if node != current && !tree.is_root_container(node) {
                debug!(from = %current, to = %node, "backdrop bypassed");
                current = node;
            }
        }
    }

    if !tree.is_root_container(current) && !is_theme_wrapper(tree, current) {
        return Some(current);
    }

    // Portal case: content stacked above everything with no semantic
    // wrapper. Walk the whole stack and pick the best survivor.
    let stack: Vec<NodeId> = tree
        .hit_test_all(x, y)
        .into_iter()
        .filter(|&node| {
            !tree.is_root_container(node)
                && !is_engine_node(tree, node, &policies.chrome)
                && !is_backdrop(tree, node, &policies.backdrop)
        })
        .collect();

    if let Some(&library) = stack.iter().find(|&&node| has_library_marker(tree, node)) {
        debug!(node = %library, "stack filter chose library-marked node");
        return Some(library);
    }
    if let Some(&interactive) = stack.iter().find(|&&node| tree.is_interactive(node)) {
        debug!(node = %interactive, "stack filter chose interactive node");
        return Some(interactive);
    }
    if let Some(&fallback) = stack.first() {
        return Some(fallback);
    }

    grid_search(tree, x, y, policies)
}

fn is_theme_wrapper(tree: &PageTree, id: NodeId) -> bool {
    tree.tag(id) == "html"
        && tree.classes(id).any(|class| {
            THEME_CLASS_TOKENS
                .iter()
                .any(|token| class.contains(token))
        })
}

fn has_library_marker(tree: &PageTree, id: NodeId) -> bool {
    LIBRARY_MARKER_ATTRIBUTES
        .iter()
        .any(|attr| tree.has_attr(id, attr))
        || tree.attr(id, "role") == Some("button")
}

/// Layer 4: probe nearby points on a small grid and take the first
/// acceptable hit.
fn grid_search(
    tree: &PageTree,
    x: f64,
    y: f64,
    policies: &ResolvePolicies,
) -> Option<NodeId> {
    let radius = policies.resolve.search_radius;
    let step = policies.resolve.search_step.max(1);
    let viewport = tree.viewport();

    let mut dx = -radius;
    while dx <= radius {
        let mut dy = -radius;
        while dy <= radius {
            let tx = x + dx as f64;
            let ty = y + dy as f64;
            if viewport.contains(tx, ty) {
                if let Some(hit) = tree.hit_test(tx, ty) {
                    if !tree.is_root_container(hit)
                        && !is_engine_node(tree, hit, &policies.chrome)
                    {
                        debug!(node = %hit, dx, dy, "grid search hit");
                        return Some(hit);
                    }
                }
            }
            dy += step;
        }
        dx += step;
    }
    None
}
