// Layout engine adapter.
// Wraps the external Graphviz process as a stateless function from graph
// description text to a vector-graphic artifact.

use std::future::Future;
use std::path::PathBuf;
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::error::{ReplayError, Result};

/// Rendered vector-graphic output for one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// SVG bytes as produced by the layout engine.
    pub svg: Vec<u8>,
}

impl Artifact {
    pub fn new(svg: Vec<u8>) -> Self {
        Self { svg }
    }

    pub fn len(&self) -> usize {
        self.svg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.svg.is_empty()
    }
}

/// A stateless engine turning one graph description into one artifact.
///
/// No session is carried between calls. The description builder is
/// contracted to produce only well-formed input, so a rejection is an
/// internal defect; it still surfaces as `ReplayError::Layout` instead of
/// tearing the session down.
pub trait LayoutEngine: Send + Sync {
    fn render(&self, description: &str) -> impl Future<Output = Result<Artifact>> + Send;
}

/// Layout engine backed by the Graphviz `dot` executable.
#[derive(Debug, Clone)]
pub struct GraphvizCli {
    program: PathBuf,
}

impl GraphvizCli {
    /// Use `dot` from the search path.
    pub fn new() -> Self {
        Self::with_program("dot")
    }

    /// Use a specific Graphviz-compatible executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for GraphvizCli {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutEngine for GraphvizCli {
    async fn render(&self, description: &str) -> Result<Artifact> {
        debug!(bytes = description.len(), "submitting description to dot");

        let mut child = Command::new(&self.program)
            .arg("-Tsvg")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ReplayError::Layout {
                message: format!("failed to start {}: {e}", self.program.display()),
            })?;

        let mut stdin = child.stdin.take().ok_or_else(|| ReplayError::Layout {
            message: "layout engine stdin unavailable".into(),
        })?;
        stdin
            .write_all(description.as_bytes())
            .await
            .map_err(|e| ReplayError::Layout {
                message: format!("failed to write description: {e}"),
            })?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| ReplayError::Layout {
                message: format!("layout engine did not finish: {e}"),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReplayError::Layout {
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        Ok(Artifact::new(output.stdout))
    }
}
