// Exploration engine client.
// Invokes the external exploration command and decodes its trace payload.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::{ReplayError, Result};
use crate::trace::ExplorationTrace;

/// Parameters for one exploration run, passed through to the engine verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Tree size.
    pub nodes: u32,
    /// Number of robots.
    pub robots: u32,
    /// Random tree seed.
    pub seed: u32,
}

impl RunParams {
    /// All three parameters must be positive; everything beyond that is the
    /// engine's business.
    pub fn new(nodes: u32, robots: u32, seed: u32) -> Result<Self> {
        if nodes == 0 || robots == 0 || seed == 0 {
            return Err(ReplayError::Engine(
                "run parameters must all be positive".into(),
            ));
        }
        Ok(Self {
            nodes,
            robots,
            seed,
        })
    }
}

/// Client for an external exploration engine command.
///
/// The command receives the three run parameters as trailing arguments and
/// must print one JSON trace payload on stdout. Whatever it prints goes
/// through the validating trace loader before a session ever sees it.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    program: PathBuf,
    args: Vec<OsString>,
}

impl CommandEngine {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add a fixed argument placed before the run parameters.
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run the exploration and decode the resulting trace.
    pub async fn run(&self, params: RunParams) -> Result<ExplorationTrace> {
        info!(
            nodes = params.nodes,
            robots = params.robots,
            seed = params.seed,
            "requesting exploration run"
        );

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(params.nodes.to_string())
            .arg(params.robots.to_string())
            .arg(params.seed.to_string())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ReplayError::Engine(format!("failed to run {}: {e}", self.program.display()))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReplayError::Engine(format!(
                "{} ({})",
                stderr.trim(),
                output.status
            )));
        }

        debug!(bytes = output.stdout.len(), "engine payload received");
        let payload = String::from_utf8_lossy(&output.stdout);
        ExplorationTrace::from_json(&payload)
    }
}
