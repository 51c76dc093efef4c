// Exploration trace module.
// Canonical data model and validation for engine-produced trace payloads.

pub mod load;
pub mod model;

pub use model::{ExplorationTrace, NodeStatus, StepState, Tree};
