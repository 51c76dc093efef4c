//! Step-indexed replay of collective tree exploration traces.
//!
//! An external engine runs the exploration for a given tree size, robot
//! count, and seed, and returns a JSON trace. This crate validates that
//! trace, navigates its steps, renders each step as a graph drawing through
//! an external layout engine, and exports single steps or whole runs as
//! downloadable artifacts.

pub mod engine;
pub mod error;
pub mod export;
pub mod render;
pub mod replay;
pub mod session;
pub mod trace;

pub use engine::{CommandEngine, RunParams};
pub use error::{ReplayError, Result};
pub use render::{Artifact, ArtifactSink, FileSink, GraphvizCli, LayoutEngine, MemorySink};
pub use replay::{Command, PendingRender, Replay};
pub use session::{DisplayMode, RenderToken, Session, StepCursor, StepMove};
pub use trace::{ExplorationTrace, NodeStatus, StepState, Tree};
