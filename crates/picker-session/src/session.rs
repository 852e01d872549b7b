//! The engine facade: session lifecycle, pointer events, and the direct
//! synthesis/testing entry points.

use locator_synth::{synthesize, LocatorSet};
use page_tree::PageTree;
use pinpoint_core_types::{Dialect, NodeId, Point, SessionId};
use point_resolve::{is_engine_node, resolve_point};
use query_engine::{test_expression, TestOutcome};
use tracing::{debug, info};

use crate::model::{CommitOutcome, EnginePolicies, Phase, PickingSession, RejectReason};

/// The locator engine. Owns the tree it reads; hosts mutate it through
/// [`PickerEngine::tree_mut`] between events.
pub struct PickerEngine {
    tree: PageTree,
    policies: EnginePolicies,
    session: Option<PickingSession>,
}

impl PickerEngine {
    pub fn new(tree: PageTree, policies: EnginePolicies) -> Self {
        Self {
            tree,
            policies,
            session: None,
        }
    }

    pub fn with_defaults(tree: PageTree) -> Self {
        Self::new(tree, EnginePolicies::default())
    }

    pub fn tree(&self) -> &PageTree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut PageTree {
        &mut self.tree
    }

    pub fn policies(&self) -> &EnginePolicies {
        &self.policies
    }

    /// Replace the tree wholesale (after the host re-snapshots a mutated
    /// page). Any live session keeps running; stale hover state clears.
    pub fn replace_tree(&mut self, tree: PageTree) {
        self.tree = tree;
        if let Some(session) = &mut self.session {
            session.hovered = None;
            session.selected = None;
        }
    }

    pub fn phase(&self) -> Phase {
        self.session
            .as_ref()
            .map_or(Phase::Idle, |session| session.phase)
    }

    pub fn hovered(&self) -> Option<NodeId> {
        self.session.as_ref().and_then(|session| session.hovered)
    }

    /// Start a session. At most one session is active at a time: an
    /// existing session is forced back to Idle before the new one arms.
    pub fn start_session(&mut self) -> SessionId {
        if self.session.is_some() {
            debug!("forcing prior session to idle");
            self.stop_session();
        }
        let session = PickingSession::new();
        let id = session.id.clone();
        info!(session = %id, "picking session started");
        self.session = Some(session);
        id
    }

    /// Stop picking and tear down all transient state.
    pub fn stop_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session = %session.id, "picking session stopped");
        }
    }

    /// Cancel is stop, reached from the cancel key instead of the UI.
    pub fn cancel_session(&mut self) {
        if let Some(session) = self.session.take() {
            info!(session = %session.id, "picking session cancelled");
        }
    }

    /// Track the pointer while hovering. The hovered node only changes when
    /// resolution lands on a different, non-engine node; a dead probe
    /// leaves the previous hover in place.
    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        let Some(session) = &mut self.session else {
            return;
        };
        if session.phase != Phase::Hovering {
            return;
        }
        session.last_pointer = Some(Point::new(x, y));

        let resolved = resolve_point(&mut self.tree, x, y, &self.policies.resolve);
        let Some(session) = &mut self.session else {
            return;
        };
        if let Some(node) = resolved {
            if Some(node) != session.hovered
                && !is_engine_node(&self.tree, node, &self.policies.resolve.chrome)
            {
                debug!(node = %node, "hover target changed");
                session.hovered = Some(node);
            }
        }
    }

    /// Commit the pick at `(x, y)`.
    ///
    /// Resolution runs the full layered protocol, then a fallback ladder
    /// recovered from field behavior: a root-container (or empty) result
    /// falls back to the hovered node, then to re-resolution at the last
    /// recorded pointer position. An engine-owned result re-arms Hovering
    /// instead of committing. On success the session is consumed and the
    /// synthesized locators are returned.
    pub fn on_commit_click(&mut self, x: f64, y: f64) -> CommitOutcome {
        if self.phase() != Phase::Hovering {
            return CommitOutcome::Rejected {
                reason: RejectReason::NotActive,
            };
        }

        let mut target = self.resolve_usable(x, y);
        if target.is_none() {
            target = self.session.as_ref().and_then(|s| s.hovered);
        }

        if target.is_none() {
            let last = self.session.as_ref().and_then(|s| s.last_pointer);
            if let Some(point) = last {
                if point.x != x || point.y != y {
                    target = self.resolve_usable(point.x, point.y);
                }
            }
        }

        let Some(node) = target else {
            debug!("commit found no usable target");
            return CommitOutcome::Rejected {
                reason: RejectReason::NoTarget,
            };
        };

        if is_engine_node(&self.tree, node, &self.policies.resolve.chrome) {
            debug!(node = %node, "commit rejected: engine-owned node");
            return CommitOutcome::Rejected {
                reason: RejectReason::EngineNode,
            };
        }

        if let Some(session) = &mut self.session {
            session.phase = Phase::Committed;
            session.selected = Some(node);
        }
        let locator_set = self.synthesize_for_node(node);
        if let Some(session) = self.session.take() {
            info!(session = %session.id, node = %node, "pick committed");
        }
        CommitOutcome::Committed {
            locator_set: Box::new(locator_set),
        }
    }

    fn resolve_usable(&mut self, x: f64, y: f64) -> Option<NodeId> {
        resolve_point(&mut self.tree, x, y, &self.policies.resolve)
            .filter(|&node| !self.tree.is_root_container(node))
    }

    /// Direct synthesis entry point for a node the caller already holds.
    pub fn synthesize_for_node(&self, node: NodeId) -> LocatorSet {
        synthesize(
            &self.tree,
            node,
            &self.policies.score,
            &self.policies.synthesis,
        )
    }

    /// Test an expression on behalf of the presentation layer. Never
    /// panics; failures come back as a typed outcome.
    pub fn test_expression(&self, expression: &str, dialect: Dialect) -> TestOutcome {
        test_expression(&self.tree, expression, dialect)
    }
}

#[cfg(test)]
mod tests {
    use page_tree::Layout;
    use pinpoint_core_types::{Rect, Size};

    use super::*;

    fn engine_with_button() -> (PickerEngine, NodeId) {
        let mut tree = PageTree::new("html", Size::new(1000.0, 700.0));
        let body = tree.append_child(tree.root(), "body");
        for id in [tree.root(), body] {
            tree.set_layout(
                id,
                Layout {
                    rect: Rect::new(0.0, 0.0, 1000.0, 700.0),
                    ..Layout::default()
                },
            );
        }
        let button = tree.append_child(body, "button");
        tree.set_attr(button, "id", "submit");
        tree.set_attr(button, "data-testid", "submit");
        tree.set_layout(
            button,
            Layout {
                rect: Rect::new(100.0, 100.0, 200.0, 50.0),
                ..Layout::default()
            },
        );
        (PickerEngine::with_defaults(tree), button)
    }

    #[test]
    fn lifecycle_idle_hover_commit() {
        let (mut engine, button) = engine_with_button();
        assert_eq!(engine.phase(), Phase::Idle);

        engine.start_session();
        assert_eq!(engine.phase(), Phase::Hovering);

        engine.on_pointer_move(150.0, 120.0);
        assert_eq!(engine.hovered(), Some(button));

        let outcome = engine.on_commit_click(150.0, 120.0);
        assert!(outcome.is_committed());
        let set = outcome.locator_set().unwrap();
        assert!(set.default_choice.contains("submit"));
        // Commit consumed the session.
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn hover_is_idempotent_at_the_same_point() {
        let (mut engine, button) = engine_with_button();
        engine.start_session();
        engine.on_pointer_move(150.0, 120.0);
        let first = engine.hovered();
        engine.on_pointer_move(150.0, 120.0);
        engine.on_pointer_move(150.0, 120.0);
        assert_eq!(engine.hovered(), first);
        assert_eq!(first, Some(button));
    }

    #[test]
    fn dead_probe_keeps_previous_hover() {
        let (mut engine, button) = engine_with_button();
        engine.start_session();
        engine.on_pointer_move(150.0, 120.0);
        assert_eq!(engine.hovered(), Some(button));
        // Only root containers live at this point.
        engine.on_pointer_move(900.0, 650.0);
        assert_eq!(engine.hovered(), Some(button));
    }

    #[test]
    fn starting_twice_replaces_the_session() {
        let (mut engine, _button) = engine_with_button();
        let first = engine.start_session();
        engine.on_pointer_move(150.0, 120.0);
        let second = engine.start_session();
        assert_ne!(first, second);
        assert_eq!(engine.phase(), Phase::Hovering);
        // Hover state from the prior session is gone.
        assert_eq!(engine.hovered(), None);
    }

    #[test]
    fn commit_over_engine_chrome_rearms_hovering() {
        let (mut engine, button) = engine_with_button();
        let panel = {
            let tree = engine.tree_mut();
            let body = tree.parent(button).unwrap();
            let panel = tree.append_child(body, "div");
            tree.set_attr(panel, "id", "__pp_panel");
            tree.add_text(panel, "chrome");
            tree.set_layout(
                panel,
                Layout {
                    rect: Rect::new(500.0, 0.0, 400.0, 300.0),
                    ..Layout::default()
                },
            );
            panel
        };
        engine.start_session();
        let outcome = engine.on_commit_click(600.0, 100.0);
        match outcome {
            CommitOutcome::Rejected { reason } => assert_eq!(reason, RejectReason::EngineNode),
            CommitOutcome::Committed { .. } => panic!("engine chrome must not commit"),
        }
        assert_eq!(engine.phase(), Phase::Hovering);
        assert!(engine.tree().contains(panel));
    }

    #[test]
    fn commit_without_session_is_rejected() {
        let (mut engine, _button) = engine_with_button();
        let outcome = engine.on_commit_click(150.0, 120.0);
        match outcome {
            CommitOutcome::Rejected { reason } => assert_eq!(reason, RejectReason::NotActive),
            CommitOutcome::Committed { .. } => panic!("idle engine must not commit"),
        }
    }

    #[test]
    fn commit_falls_back_to_hovered_node() {
        let (mut engine, button) = engine_with_button();
        engine.start_session();
        engine.on_pointer_move(150.0, 120.0);
        assert_eq!(engine.hovered(), Some(button));
        // The click lands where only root containers are; the hover backs
        // it up.
        let outcome = engine.on_commit_click(900.0, 650.0);
        assert!(outcome.is_committed());
    }

    #[test]
    fn test_expression_surface_never_fails() {
        let (engine, _button) = engine_with_button();
        assert!(engine
            .test_expression("#submit", Dialect::Structural)
            .matched());
        assert!(matches!(
            engine.test_expression("p[[[", Dialect::Structural),
            TestOutcome::Invalid { .. }
        ));
    }
}
