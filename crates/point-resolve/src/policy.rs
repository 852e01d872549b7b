//! Tunable thresholds for backdrop detection and point resolution.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropPolicy {
    /// Class-name fragments that read as backdrop/overlay naming.
    pub class_markers: Vec<String>,
    /// Attributes that explicitly mark a modal overlay layer.
    pub overlay_attributes: Vec<String>,
    /// A full-viewport fixed box needs a stacking order above this to be
    /// treated as a backdrop on geometry alone.
    pub z_index_threshold: i32,
}

impl Default for BackdropPolicy {
    fn default() -> Self {
        Self {
            class_markers: [
                "backdrop",
                "overlay",
                "modal-backdrop",
                "dialog-backdrop",
                "popover-backdrop",
                "dropdown-backdrop",
                "radix-backdrop",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            overlay_attributes: ["data-radix-dialog-overlay", "data-radix-popover-backdrop"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            z_index_threshold: 9999,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvePolicy {
    /// Radius of the grid search around a dead point, in viewport units.
    pub search_radius: i32,
    /// Step of the grid search.
    pub search_step: i32,
    /// Suggested delay before a host re-runs a commit that landed on the
    /// root container while content was still settling.
    pub settle_recheck_ms: u64,
}

impl Default for ResolvePolicy {
    fn default() -> Self {
        Self {
            search_radius: 5,
            search_step: 2,
            settle_recheck_ms: 50,
        }
    }
}

/// How the engine's own overlay/tooltip/panel nodes are recognized, so the
/// resolver never picks them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromePolicy {
    /// Id prefix reserved for engine-owned nodes.
    pub id_prefix: String,
    /// Marker attribute set on engine-owned subtrees.
    pub marker_attribute: String,
}

impl Default for ChromePolicy {
    fn default() -> Self {
        Self {
            id_prefix: "__pp_".to_string(),
            marker_attribute: "data-pinpoint-ui".to_string(),
        }
    }
}

/// The full policy bundle the resolver consumes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolvePolicies {
    pub backdrop: BackdropPolicy,
    pub chrome: ChromePolicy,
    pub resolve: ResolvePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_common_overlay_idioms() {
        let policy = BackdropPolicy::default();
        assert!(policy.class_markers.iter().any(|m| m == "backdrop"));
        assert!(policy
            .overlay_attributes
            .iter()
            .any(|a| a == "data-radix-dialog-overlay"));
        assert_eq!(policy.z_index_threshold, 9999);
    }
}
