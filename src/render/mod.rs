// Rendering module.
// Builds graph descriptions and turns them into artifacts through the
// external layout engine.

pub mod dot;
pub mod layout;
pub mod sink;

pub use layout::{Artifact, GraphvizCli, LayoutEngine};
pub use sink::{ArtifactSink, FileSink, MemorySink};
