// Replay controller.
// Applies navigation commands to the session and drives re-rendering. Every
// dispatched render carries a serial token; a result is painted only if no
// newer render was staged in the meantime, so superseded renders are
// discarded instead of overwriting a fresher drawing.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ReplayError, Result};
use crate::export;
use crate::render::dot;
use crate::render::{Artifact, ArtifactSink, LayoutEngine};
use crate::session::{DisplayMode, RenderToken, Session, StepMove};
use crate::trace::ExplorationTrace;

/// Navigation and presentation commands accepted by the controller.
///
/// Key events (or any other input source) are translated into these outside
/// the core; the core only sees commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the next step.
    Advance,
    /// Show the previous step.
    Retreat,
    /// Switch between occupancy counts and explicit robot ids.
    ToggleDisplayMode,
    /// Re-render the current step unchanged.
    Refresh,
}

/// A staged render: the description to submit plus the token deciding
/// whether its result may still be painted once it completes.
#[derive(Debug)]
pub struct PendingRender {
    pub token: RenderToken,
    pub step: usize,
    pub description: String,
}

/// Drives one session against a layout engine and a display sink.
pub struct Replay<E, S> {
    session: Session,
    engine: Arc<E>,
    sink: S,
}

impl<E: LayoutEngine, S: ArtifactSink> Replay<E, S> {
    pub fn new(engine: Arc<E>, sink: S) -> Self {
        Self {
            session: Session::new(),
            engine,
            sink,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.session.display_mode()
    }

    /// Install a new run, replacing any prior session state wholesale, and
    /// show its first step. Renders still in flight for the previous run
    /// can no longer be painted after this returns.
    pub async fn start_run(&mut self, trace: ExplorationTrace) -> Result<()> {
        let trace = self.session.install(trace);
        info!(steps = trace.len(), nodes = trace.tree.n, "run started");
        self.show_current().await
    }

    /// Apply one command in arrival order.
    ///
    /// Boundary bounces leave the cursor untouched and skip the re-render;
    /// the notice is the return value, not an error.
    pub async fn handle(&mut self, command: Command) -> Result<StepMove> {
        if !self.session.has_trace() {
            return Err(ReplayError::NoTrace);
        }

        let outcome = match command {
            Command::Advance => self.session.advance(),
            Command::Retreat => self.session.retreat(),
            Command::ToggleDisplayMode => {
                self.session.toggle_display_mode();
                self.session.current_index().map(StepMove::Moved)
            }
            Command::Refresh => self.session.current_index().map(StepMove::Moved),
        }
        .ok_or(ReplayError::NoTrace)?;

        match outcome {
            StepMove::Moved(index) => {
                debug!(step = index, ?command, "navigated");
                self.show_current().await?;
            }
            StepMove::AtStart | StepMove::AtEnd => {
                debug!(?outcome, "navigation reflected at boundary");
            }
        }
        Ok(outcome)
    }

    /// Stage a render of the current step without awaiting it.
    ///
    /// Staging supersedes every earlier pending render. Callers that drive
    /// the engine themselves submit `description` and hand the result back
    /// through `present`.
    pub fn stage_current(&mut self) -> Result<PendingRender> {
        let (description, step) = {
            let run = self.session.run().ok_or(ReplayError::NoTrace)?;
            let index = run.cursor.index();
            let state = &run.trace.steps[index];
            (
                dot::build(&run.trace.tree, state, self.session.display_mode()),
                index,
            )
        };
        let token = self.session.begin_render();
        Ok(PendingRender {
            token,
            step,
            description,
        })
    }

    /// Present a completed render. Returns whether it was painted; a result
    /// whose token has been superseded is dropped and the sink untouched.
    pub fn present(&mut self, token: RenderToken, artifact: Artifact) -> Result<bool> {
        if self.session.is_current(token) {
            self.sink.replace(artifact)?;
            Ok(true)
        } else {
            debug!("dropping superseded render");
            Ok(false)
        }
    }

    /// Render and display the current step.
    ///
    /// On a layout failure the sink keeps whatever it was showing; the error
    /// surfaces to the caller.
    pub async fn show_current(&mut self) -> Result<()> {
        let engine = Arc::clone(&self.engine);
        let pending = self.stage_current()?;
        let artifact = engine.render(&pending.description).await?;
        self.present(pending.token, artifact)?;
        Ok(())
    }

    /// Export the current step as a single artifact file.
    pub async fn export_current(&self, out_dir: Option<&Path>) -> Result<PathBuf> {
        let run = self.session.run().ok_or(ReplayError::NoTrace)?;
        let dir = resolve_out_dir(out_dir)?;
        export::export_step(
            &run.trace,
            run.cursor.index(),
            self.session.display_mode(),
            self.engine.as_ref(),
            &dir,
        )
        .await
    }

    /// Export every step into one archive.
    pub async fn export_all(&self, out_dir: Option<&Path>) -> Result<PathBuf>
    where
        E: 'static,
    {
        let run = self.session.run().ok_or(ReplayError::NoTrace)?;
        let dir = resolve_out_dir(out_dir)?;
        export::export_all(
            &run.trace,
            self.session.display_mode(),
            &self.engine,
            &dir,
        )
        .await
    }
}

fn resolve_out_dir(out_dir: Option<&Path>) -> Result<PathBuf> {
    match out_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => export::paths::default_export_dir().ok_or(ReplayError::MissingExportDir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::render::MemorySink;

    /// Echoes descriptions back as artifacts, counting calls and failing on
    /// configured descriptions.
    #[derive(Default)]
    struct FakeEngine {
        calls: AtomicUsize,
        failing: HashSet<String>,
    }

    impl FakeEngine {
        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl LayoutEngine for FakeEngine {
        async fn render(&self, description: &str) -> Result<Artifact> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(description) {
                return Err(ReplayError::Layout {
                    message: "refused".into(),
                });
            }
            Ok(Artifact::new(description.as_bytes().to_vec()))
        }
    }

    fn sample_trace() -> ExplorationTrace {
        ExplorationTrace::from_value(json!({
            "tree": { "n": 2, "edges": [[0, 1]] },
            "steps": [
                {
                    "status": ["UNFINISHED", "UNFINISHED"],
                    "robotCount": [2, 0],
                    "robotIds": [[0, 1], []],
                    "traversed": [true, false]
                },
                {
                    "status": ["INHABITED", "FINISHED"],
                    "robotCount": [0, 2],
                    "robotIds": [[], [0, 1]],
                    "traversed": [true, true]
                }
            ]
        }))
        .unwrap()
    }

    fn description_of(trace: &ExplorationTrace, index: usize, mode: DisplayMode) -> String {
        dot::build(&trace.tree, &trace.steps[index], mode)
    }

    fn new_replay() -> Replay<FakeEngine, MemorySink> {
        Replay::new(Arc::new(FakeEngine::default()), MemorySink::new())
    }

    fn displayed(replay: &Replay<FakeEngine, MemorySink>) -> String {
        String::from_utf8(replay.sink().current().unwrap().svg.clone()).unwrap()
    }

    #[tokio::test]
    async fn test_start_run_shows_first_step() {
        let trace = sample_trace();
        let expected = description_of(&trace, 0, DisplayMode::Counts);

        let mut replay = new_replay();
        replay.start_run(trace).await.unwrap();

        assert_eq!(replay.session().current_index(), Some(0));
        assert_eq!(displayed(&replay), expected);
    }

    #[tokio::test]
    async fn test_advance_renders_next_step() {
        let trace = sample_trace();
        let expected = description_of(&trace, 1, DisplayMode::Counts);

        let mut replay = new_replay();
        replay.start_run(trace).await.unwrap();

        let outcome = replay.handle(Command::Advance).await.unwrap();
        assert_eq!(outcome, StepMove::Moved(1));
        assert_eq!(displayed(&replay), expected);
    }

    #[tokio::test]
    async fn test_boundary_bounce_skips_render() {
        let mut replay = new_replay();
        replay.start_run(sample_trace()).await.unwrap();
        replay.handle(Command::Advance).await.unwrap();

        let rendered_before = replay.engine.call_count();
        let outcome = replay.handle(Command::Advance).await.unwrap();
        assert_eq!(outcome, StepMove::AtEnd);
        assert_eq!(replay.engine.call_count(), rendered_before);
    }

    #[tokio::test]
    async fn test_toggle_display_mode_rerenders_current_step() {
        let trace = sample_trace();
        let expected = description_of(&trace, 0, DisplayMode::RobotIds);

        let mut replay = new_replay();
        replay.start_run(trace).await.unwrap();

        let outcome = replay.handle(Command::ToggleDisplayMode).await.unwrap();
        assert_eq!(outcome, StepMove::Moved(0));
        assert_eq!(replay.display_mode(), DisplayMode::RobotIds);
        assert_eq!(displayed(&replay), expected);
    }

    #[tokio::test]
    async fn test_superseded_render_is_not_painted() {
        let trace = sample_trace();
        let newer = description_of(&trace, 1, DisplayMode::Counts);

        let mut replay = new_replay();
        replay.start_run(trace).await.unwrap();

        // A render for step 0 goes out, but navigation to step 1 completes
        // before its result comes back.
        let stale = replay.stage_current().unwrap();
        replay.handle(Command::Advance).await.unwrap();

        let painted = replay
            .present(stale.token, Artifact::new(b"stale".to_vec()))
            .unwrap();
        assert!(!painted);
        assert_eq!(displayed(&replay), newer);
    }

    #[tokio::test]
    async fn test_render_from_replaced_run_is_not_painted() {
        let mut replay = new_replay();
        replay.start_run(sample_trace()).await.unwrap();

        let stale = replay.stage_current().unwrap();
        replay.start_run(sample_trace()).await.unwrap();

        let painted = replay
            .present(stale.token, Artifact::new(b"old-run".to_vec()))
            .unwrap();
        assert!(!painted);
        assert_ne!(displayed(&replay), "old-run");
    }

    #[tokio::test]
    async fn test_layout_failure_keeps_previous_artifact() {
        let trace = sample_trace();
        let step0 = description_of(&trace, 0, DisplayMode::Counts);
        let step1 = description_of(&trace, 1, DisplayMode::Counts);

        let mut failing = HashSet::new();
        failing.insert(step1);
        let engine = Arc::new(FakeEngine {
            calls: AtomicUsize::new(0),
            failing,
        });
        let mut replay = Replay::new(engine, MemorySink::new());
        replay.start_run(trace).await.unwrap();

        let err = replay.handle(Command::Advance).await.unwrap_err();
        assert!(matches!(err, ReplayError::Layout { .. }));
        assert_eq!(displayed(&replay), step0);
    }

    #[tokio::test]
    async fn test_commands_require_a_trace() {
        let mut replay = new_replay();
        let err = replay.handle(Command::Advance).await.unwrap_err();
        assert!(matches!(err, ReplayError::NoTrace));
    }

    #[tokio::test]
    async fn test_export_current_uses_cursor_step() {
        let trace = sample_trace();
        let expected = description_of(&trace, 1, DisplayMode::Counts);

        let mut replay = new_replay();
        replay.start_run(trace).await.unwrap();
        replay.handle(Command::Advance).await.unwrap();

        let dir = tempfile::TempDir::new().unwrap();
        let path = replay.export_current(Some(dir.path())).await.unwrap();
        assert!(path.ends_with("step-2.svg"));
        assert_eq!(std::fs::read(&path).unwrap(), expected.as_bytes());
    }
}
