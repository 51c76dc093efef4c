// Exploration trace data model.
// Defines the canonical schema for trace payloads produced by the exploration engine.

use serde::{Deserialize, Serialize};

/// Qualitative exploration state of a node at one step.
///
/// Distinct from occupancy: a node can be `Finished` while robots still pass
/// through it on their way back to the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum NodeStatus {
    /// Subtree fully explored, but robots remain below this node.
    Inhabited,
    /// Subtree fully explored and empty of robots.
    Finished,
    /// Some edge in the subtree has not been visited yet.
    Unfinished,
}

/// The explored tree: node count plus undirected edge list.
///
/// Node ids are `0..n`. The edge list is a spanning tree, which `load`
/// enforces when a payload is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub n: usize,
    pub edges: Vec<(usize, usize)>,
}

/// One round's complete per-node snapshot.
///
/// All four arrays are parallel and have length `tree.n`. `robot_ids` entries
/// may be empty even when the matching `robot_count` is positive; low-detail
/// traces carry counts only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    pub status: Vec<NodeStatus>,
    pub robot_count: Vec<u32>,
    pub robot_ids: Vec<Vec<u32>>,
    pub traversed: Vec<bool>,
}

/// The full recorded history of one exploration run, one entry per round.
///
/// Immutable once constructed: the only way to obtain one is through the
/// validating loader, and sessions share it behind an `Arc`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationTrace {
    pub tree: Tree,
    pub steps: Vec<StepState>,
}

impl ExplorationTrace {
    /// Number of recorded steps. Never zero for a loaded trace.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Snapshot for a 0-based step index.
    pub fn step(&self, index: usize) -> Option<&StepState> {
        self.steps.get(index)
    }
}
