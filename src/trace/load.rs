// Trace payload validation.
// Converts raw exploration-engine output into a validated ExplorationTrace.

use tracing::debug;

use crate::error::{ReplayError, Result};

use super::model::{ExplorationTrace, StepState, Tree};

impl ExplorationTrace {
    /// Parse and validate a raw engine payload.
    ///
    /// Rejects anything that does not conform to the canonical schema with
    /// `ReplayError::MalformedTrace`. Unknown extra fields in the payload are
    /// ignored; the canonical fields themselves are required. No partial
    /// state survives a failed load.
    pub fn from_json(raw: &str) -> Result<Self> {
        let trace: ExplorationTrace = serde_json::from_str(raw)
            .map_err(|e| ReplayError::MalformedTrace(e.to_string()))?;
        trace.validated()
    }

    /// Like `from_json`, for payloads already parsed into a JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let trace: ExplorationTrace = serde_json::from_value(value)
            .map_err(|e| ReplayError::MalformedTrace(e.to_string()))?;
        trace.validated()
    }

    fn validated(self) -> Result<Self> {
        validate_tree(&self.tree)?;
        validate_steps(&self.tree, &self.steps)?;
        debug!(
            nodes = self.tree.n,
            steps = self.steps.len(),
            "trace validated"
        );
        Ok(self)
    }
}

fn validate_tree(tree: &Tree) -> Result<()> {
    if tree.n == 0 {
        return Err(ReplayError::MalformedTrace("tree has no nodes".into()));
    }

    if tree.edges.len() != tree.n - 1 {
        return Err(ReplayError::MalformedTrace(format!(
            "tree has {} edges, a spanning tree over {} nodes needs {}",
            tree.edges.len(),
            tree.n,
            tree.n - 1
        )));
    }

    for (i, &(a, b)) in tree.edges.iter().enumerate() {
        if a >= tree.n || b >= tree.n {
            return Err(ReplayError::MalformedTrace(format!(
                "edge {} ({}, {}) has an endpoint outside 0..{}",
                i, a, b, tree.n
            )));
        }
    }

    // n - 1 in-range edges still admit cycles plus unreachable nodes;
    // a sweep from node 0 settles connectivity.
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); tree.n];
    for &(a, b) in &tree.edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }
    let mut visited = vec![false; tree.n];
    let mut stack = vec![0];
    visited[0] = true;
    let mut reached = 1;
    while let Some(v) = stack.pop() {
        for &u in &adjacency[v] {
            if !visited[u] {
                visited[u] = true;
                reached += 1;
                stack.push(u);
            }
        }
    }
    if reached != tree.n {
        return Err(ReplayError::MalformedTrace(format!(
            "tree edges reach only {} of {} nodes",
            reached, tree.n
        )));
    }

    Ok(())
}

fn validate_steps(tree: &Tree, steps: &[StepState]) -> Result<()> {
    if steps.is_empty() {
        return Err(ReplayError::MalformedTrace("trace has no steps".into()));
    }

    for (i, step) in steps.iter().enumerate() {
        for (field, len) in [
            ("status", step.status.len()),
            ("robotCount", step.robot_count.len()),
            ("robotIds", step.robot_ids.len()),
            ("traversed", step.traversed.len()),
        ] {
            if len != tree.n {
                return Err(ReplayError::MalformedTrace(format!(
                    "step {} field {} has length {}, expected {}",
                    i, field, len, tree.n
                )));
            }
        }
    }

    // Traversal is cumulative: the engine only ever marks nodes, so a flag
    // that flips back off can only come from a corrupted producer.
    for (i, pair) in steps.windows(2).enumerate() {
        for v in 0..tree.n {
            if pair[0].traversed[v] && !pair[1].traversed[v] {
                return Err(ReplayError::MalformedTrace(format!(
                    "step {} clears the traversed flag of node {}",
                    i + 1,
                    v
                )));
            }
        }
    }

    Ok(())
}
