//! Session state and outcome types.

use locator_synth::{LocatorSet, ScorePolicy, SynthesisPolicy};
use pinpoint_core_types::{NodeId, Point, SessionId};
use point_resolve::ResolvePolicies;
use serde::{Deserialize, Serialize};

/// Lifecycle phase of a picking session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Hovering,
    Committed,
}

/// Transient state of one picking session.
#[derive(Clone, Debug)]
pub struct PickingSession {
    pub id: SessionId,
    pub phase: Phase,
    pub hovered: Option<NodeId>,
    pub last_pointer: Option<Point>,
    pub selected: Option<NodeId>,
}

impl PickingSession {
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            phase: Phase::Hovering,
            hovered: None,
            last_pointer: None,
            selected: None,
        }
    }
}

impl Default for PickingSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Why a commit click was not accepted. All of these are expected control
/// flow, not errors.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The resolved node belongs to the engine's own UI; the session
    /// re-arms and keeps hovering.
    EngineNode,
    /// Every resolution strategy came up empty.
    NoTarget,
    /// No session is hovering, so there is nothing to commit.
    NotActive,
}

/// Result of a commit click.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CommitOutcome {
    Committed { locator_set: Box<LocatorSet> },
    Rejected { reason: RejectReason },
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }

    pub fn locator_set(&self) -> Option<&LocatorSet> {
        match self {
            CommitOutcome::Committed { locator_set } => Some(locator_set),
            CommitOutcome::Rejected { .. } => None,
        }
    }
}

/// Every tunable the engine consumes, in one bundle.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EnginePolicies {
    pub score: ScorePolicy,
    pub synthesis: SynthesisPolicy,
    #[serde(flatten)]
    pub resolve: ResolvePolicies,
}
