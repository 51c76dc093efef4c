// Session state.
// Owns the current trace, its step cursor, the display mode, and the render
// serials used to suppress superseded renders.

pub mod cursor;

pub use cursor::{StepCursor, StepMove};

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::trace::ExplorationTrace;

/// How node occupancy is shown in rendered labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// Show the number of robots at each node.
    #[default]
    Counts,
    /// Show the explicit set of robot ids at each node.
    RobotIds,
}

impl DisplayMode {
    pub fn toggled(&self) -> Self {
        match self {
            DisplayMode::Counts => DisplayMode::RobotIds,
            DisplayMode::RobotIds => DisplayMode::Counts,
        }
    }
}

/// Ticket identifying one dispatched render.
///
/// A token stays current until the next render is staged or a new run is
/// installed; results arriving with an outdated token must be discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderToken(u64);

/// One installed run: the immutable trace plus its cursor.
#[derive(Debug)]
pub struct RunState {
    pub trace: Arc<ExplorationTrace>,
    pub cursor: StepCursor,
}

/// Live state for one run.
///
/// Exactly one session is live at a time; installing a new trace replaces
/// the previous run wholesale and invalidates its in-flight renders.
#[derive(Debug, Default)]
pub struct Session {
    run: Option<RunState>,
    display_mode: DisplayMode,
    issued: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a validated trace as the new run.
    ///
    /// Resets the cursor to step 0 and bumps the render serial so that any
    /// render still in flight for the previous run can no longer be painted.
    pub fn install(&mut self, trace: ExplorationTrace) -> Arc<ExplorationTrace> {
        let trace = Arc::new(trace);
        let cursor = StepCursor::new(trace.len());
        self.run = Some(RunState {
            trace: Arc::clone(&trace),
            cursor,
        });
        self.issued += 1;
        debug!(steps = trace.len(), "installed new run");
        trace
    }

    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    pub fn has_trace(&self) -> bool {
        self.run.is_some()
    }

    /// Currently displayed step index, if a run is installed.
    pub fn current_index(&self) -> Option<usize> {
        self.run.as_ref().map(|run| run.cursor.index())
    }

    /// Move the cursor forward. `None` when no run is installed.
    pub fn advance(&mut self) -> Option<StepMove> {
        self.run.as_mut().map(|run| run.cursor.advance())
    }

    /// Move the cursor back. `None` when no run is installed.
    pub fn retreat(&mut self) -> Option<StepMove> {
        self.run.as_mut().map(|run| run.cursor.retreat())
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    /// Flip between occupancy counts and explicit robot ids.
    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.display_mode
    }

    /// Stage a render, superseding every earlier token.
    pub fn begin_render(&mut self) -> RenderToken {
        self.issued += 1;
        RenderToken(self.issued)
    }

    /// Whether a completed render may still be painted.
    pub fn is_current(&self, token: RenderToken) -> bool {
        token.0 == self.issued
    }
}
