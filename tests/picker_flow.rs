//! Picking-session flows over an overlay-heavy page: backdrop bypass,
//! engine-chrome rejection, session exclusivity.

use page_tree::PageTree;
use picker_session::{CommitOutcome, Phase, PickerEngine};
use point_resolve::{is_backdrop, BackdropPolicy};

const MODAL_PAGE: &str = r#"{
    "viewport": {"width": 1024, "height": 768},
    "root": {
        "tag": "html",
        "layout": {"x": 0, "y": 0, "width": 1024, "height": 768},
        "children": [
            {
                "tag": "body",
                "layout": {"x": 0, "y": 0, "width": 1024, "height": 768},
                "children": [
                    {
                        "tag": "button",
                        "attrs": [{"name": "id", "value": "submit"}],
                        "text": ["Submit"],
                        "layout": {"x": 400, "y": 300, "width": 160, "height": 40}
                    },
                    {
                        "tag": "div",
                        "attrs": [{"name": "class", "value": "modal-backdrop"}],
                        "layout": {
                            "x": 0, "y": 0, "width": 1024, "height": 768,
                            "position": "fixed", "zIndex": 10000
                        }
                    }
                ]
            }
        ]
    }
}"#;

fn engine() -> PickerEngine {
    PickerEngine::with_defaults(PageTree::from_json_str(MODAL_PAGE).expect("snapshot parses"))
}

#[test]
fn backdrop_is_bypassed_on_hover_and_commit() {
    let mut engine = engine();
    engine.start_session();

    // (450, 310) is inside the submit button but covered by the backdrop.
    engine.on_pointer_move(450.0, 310.0);
    let hovered = engine.hovered().expect("hover resolves through backdrop");
    assert_eq!(engine.tree().tag(hovered), "button");
    assert_eq!(engine.tree().id_attr(hovered), Some("submit"));

    let outcome = engine.on_commit_click(450.0, 310.0);
    let set = outcome.locator_set().expect("commit succeeds");
    assert_eq!(set.profile.tag, "button");
    assert_eq!(set.slots.by_id.as_ref().map(|s| s.expression()), Some("#submit"));
}

#[test]
fn full_screen_interactive_node_is_not_a_backdrop() {
    let mut tree = PageTree::from_json_str(MODAL_PAGE).unwrap();
    let body = tree.document_order()[1];
    let giant = tree.append_child(body, "button");
    tree.set_layout(
        giant,
        page_tree::Layout {
            rect: pinpoint_core_types::Rect::new(0.0, 0.0, 1024.0, 768.0),
            position: page_tree::Position::Fixed,
            z_index: Some(20000),
            pointer_events: true,
        },
    );
    // No text, backdrop geometry, extreme stacking: the interactive-tag
    // exemption still wins.
    assert!(!is_backdrop(&tree, giant, &BackdropPolicy::default()));
}

#[test]
fn repeated_hover_at_same_point_is_stable() {
    let mut engine = engine();
    engine.start_session();
    engine.on_pointer_move(450.0, 310.0);
    let first = engine.hovered();
    for _ in 0..5 {
        engine.on_pointer_move(450.0, 310.0);
    }
    assert_eq!(engine.hovered(), first);
}

#[test]
fn starting_a_session_forces_the_prior_one_idle() {
    let mut engine = engine();
    let first = engine.start_session();
    engine.on_pointer_move(450.0, 310.0);
    assert!(engine.hovered().is_some());

    let second = engine.start_session();
    assert_ne!(first, second);
    assert_eq!(engine.phase(), Phase::Hovering);
    assert_eq!(engine.hovered(), None, "prior session state must be gone");
}

#[test]
fn stop_and_cancel_return_to_idle() {
    let mut engine = engine();
    engine.start_session();
    engine.stop_session();
    assert_eq!(engine.phase(), Phase::Idle);

    engine.start_session();
    engine.on_pointer_move(450.0, 310.0);
    engine.cancel_session();
    assert_eq!(engine.phase(), Phase::Idle);
    assert_eq!(engine.hovered(), None);

    // Committing after cancel is expected control flow, not an error.
    let outcome = engine.on_commit_click(450.0, 310.0);
    assert!(matches!(outcome, CommitOutcome::Rejected { .. }));
}

#[test]
fn commit_results_serialize_for_the_transport() {
    let mut engine = engine();
    engine.start_session();
    let outcome = engine.on_commit_click(450.0, 310.0);
    let payload = serde_json::to_string(&outcome).expect("outcome serializes");
    assert!(payload.contains("\"outcome\":\"committed\""));
    assert!(payload.contains("#submit"));
}
