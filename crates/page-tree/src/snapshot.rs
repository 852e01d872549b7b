//! JSON snapshot ingestion.
//!
//! The host serializes the document as a nested element record; the tree is
//! rebuilt from it on every analysis pass so a stale arena never outlives a
//! mutated page.

use pinpoint_core_types::{Rect, Size};
use serde::Deserialize;
use tracing::debug;

use crate::errors::TreeError;
use crate::model::{Layout, PageTree, Position};

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub viewport: SnapshotViewport,
    pub root: SnapshotNode,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotViewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default)]
    pub attrs: Vec<SnapshotAttr>,
    #[serde(default)]
    pub text: Vec<String>,
    #[serde(default)]
    pub layout: Option<SnapshotLayout>,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotAttr {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotLayout {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub position: Position,
    #[serde(default)]
    pub z_index: Option<i32>,
    #[serde(default = "default_true")]
    pub pointer_events: bool,
}

impl From<&SnapshotLayout> for Layout {
    fn from(raw: &SnapshotLayout) -> Self {
        Layout {
            rect: Rect::new(raw.x, raw.y, raw.width, raw.height),
            position: raw.position,
            z_index: raw.z_index,
            pointer_events: raw.pointer_events,
        }
    }
}

impl PageTree {
    pub fn from_snapshot(snapshot: &Snapshot) -> Result<Self, TreeError> {
        if snapshot.root.tag.trim().is_empty() {
            return Err(TreeError::InvalidSnapshot(
                "root element has an empty tag".to_string(),
            ));
        }
        let viewport = Size::new(snapshot.viewport.width, snapshot.viewport.height);
        let mut tree = PageTree::new(&snapshot.root.tag, viewport);
        let root = tree.root();
        apply_node(&mut tree, root, &snapshot.root)?;
        debug!(elements = tree.len(), "snapshot ingested");
        Ok(tree)
    }

    pub fn from_json_value(value: &serde_json::Value) -> Result<Self, TreeError> {
        let snapshot: Snapshot = serde_json::from_value(value.clone())
            .map_err(|e| TreeError::InvalidSnapshot(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, TreeError> {
        let snapshot: Snapshot =
            serde_json::from_str(raw).map_err(|e| TreeError::InvalidSnapshot(e.to_string()))?;
        Self::from_snapshot(&snapshot)
    }
}

fn apply_node(
    tree: &mut PageTree,
    id: pinpoint_core_types::NodeId,
    raw: &SnapshotNode,
) -> Result<(), TreeError> {
    for attr in &raw.attrs {
        if attr.name.trim().is_empty() {
            return Err(TreeError::InvalidSnapshot(format!(
                "empty attribute name on <{}>",
                raw.tag
            )));
        }
        tree.set_attr(id, &attr.name, &attr.value);
    }
    for run in &raw.text {
        tree.add_text(id, run);
    }
    if let Some(layout) = &raw.layout {
        tree.set_layout(id, layout.into());
    }
    for child in &raw.children {
        if child.tag.trim().is_empty() {
            return Err(TreeError::InvalidSnapshot(
                "child element has an empty tag".to_string(),
            ));
        }
        let child_id = tree.append_child(id, &child.tag);
        apply_node(tree, child_id, child)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "viewport": {"width": 1280, "height": 800},
        "root": {
            "tag": "html",
            "children": [
                {
                    "tag": "body",
                    "layout": {"x": 0, "y": 0, "width": 1280, "height": 800},
                    "children": [
                        {
                            "tag": "button",
                            "attrs": [{"name": "id", "value": "go"}],
                            "text": ["Go"],
                            "layout": {"x": 10, "y": 10, "width": 80, "height": 30}
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn ingests_nested_snapshot() {
        let tree = PageTree::from_json_str(SAMPLE).unwrap();
        assert_eq!(tree.len(), 3);
        let order = tree.document_order();
        let button = order[2];
        assert_eq!(tree.tag(button), "button");
        assert_eq!(tree.id_attr(button), Some("go"));
        assert_eq!(tree.direct_text(button), "Go");
        assert!(tree.node(button).layout.rect.contains(50.0, 25.0));
    }

    #[test]
    fn rejects_malformed_payload() {
        let err = PageTree::from_json_str("{\"viewport\": {}}").unwrap_err();
        assert!(matches!(err, TreeError::InvalidSnapshot(_)));
    }

    #[test]
    fn layout_defaults_keep_pointer_events_on() {
        let tree = PageTree::from_json_str(SAMPLE).unwrap();
        let body = tree.document_order()[1];
        assert!(tree.node(body).layout.pointer_events);
        assert_eq!(tree.node(body).layout.position, Position::Static);
    }
}
