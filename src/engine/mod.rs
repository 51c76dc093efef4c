// Exploration engine module.
// Client for the external collaborator that actually runs the algorithm.

pub mod client;

pub use client::{CommandEngine, RunParams};
