// Export manager.
// Drives the description builder and layout engine across one or all steps
// and packages batch results into a downloadable archive.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{debug, info};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{ReplayError, Result};
use crate::render::dot;
use crate::render::{Artifact, LayoutEngine};
use crate::session::DisplayMode;
use crate::trace::ExplorationTrace;

pub mod paths;

/// Metadata entry written into the batch archive next to the artifacts.
#[derive(Debug, Serialize)]
struct Manifest {
    node_count: usize,
    step_count: usize,
    display_mode: DisplayMode,
    generated_at: DateTime<Utc>,
}

/// Render one step and write its artifact as a single downloadable file.
///
/// The file name is deterministic for a given step index.
pub async fn export_step<E: LayoutEngine>(
    trace: &ExplorationTrace,
    index: usize,
    mode: DisplayMode,
    engine: &E,
    out_dir: &Path,
) -> Result<PathBuf> {
    let step = trace
        .step(index)
        .ok_or_else(|| ReplayError::Other(format!("step index {index} out of range")))?;

    let description = dot::build(&trace.tree, step, mode);
    let artifact = engine.render(&description).await?;

    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(paths::step_file_name(index));
    fs::write(&path, &artifact.svg)?;

    info!(path = %path.display(), "exported step artifact");
    Ok(path)
}

/// Render every step and package the artifacts into one archive.
///
/// Renders are dispatched concurrently; placement into the archive is keyed
/// by step index, so file names reflect step order no matter how the renders
/// interleave. Fail-fast: the first failed render aborts the whole export,
/// reports its 1-based step, and leaves no archive behind.
pub async fn export_all<E>(
    trace: &ExplorationTrace,
    mode: DisplayMode,
    engine: &Arc<E>,
    out_dir: &Path,
) -> Result<PathBuf>
where
    E: LayoutEngine + 'static,
{
    let mut set = JoinSet::new();
    for (index, step) in trace.steps.iter().enumerate() {
        let description = dot::build(&trace.tree, step, mode);
        let engine = Arc::clone(engine);
        set.spawn(async move {
            let rendered = engine.render(&description).await;
            (index, rendered)
        });
    }

    let mut artifacts: Vec<Option<Artifact>> = vec![None; trace.len()];
    while let Some(joined) = set.join_next().await {
        let (index, rendered) =
            joined.map_err(|e| ReplayError::Other(format!("render task failed: {e}")))?;
        match rendered {
            Ok(artifact) => {
                debug!(step = index + 1, "render completed");
                artifacts[index] = Some(artifact);
            }
            Err(err) => {
                set.abort_all();
                return Err(ReplayError::export_step(index + 1, err));
            }
        }
    }

    let manifest = Manifest {
        node_count: trace.tree.n,
        step_count: trace.len(),
        display_mode: mode,
        generated_at: Utc::now(),
    };

    fs::create_dir_all(out_dir)?;
    let archive_path = out_dir.join(paths::ARCHIVE_FILE_NAME);
    write_archive(&archive_path, &artifacts, &manifest)?;

    info!(
        path = %archive_path.display(),
        steps = trace.len(),
        "exported step archive"
    );
    Ok(archive_path)
}

/// Write the archive atomically via a temp file so a failed packaging run
/// never leaves a partial archive at the final path.
fn write_archive(
    archive_path: &Path,
    artifacts: &[Option<Artifact>],
    manifest: &Manifest,
) -> Result<()> {
    let temp_path = archive_path.with_extension("tmp");
    let file = fs::File::create(&temp_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (index, artifact) in artifacts.iter().enumerate() {
        let artifact = artifact.as_ref().ok_or_else(|| {
            ReplayError::Other(format!("missing artifact for step {}", index + 1))
        })?;
        zip.start_file(paths::step_file_name(index), options)?;
        zip.write_all(&artifact.svg)?;
    }

    zip.start_file(paths::MANIFEST_FILE_NAME, options)?;
    zip.write_all(serde_json::to_string_pretty(manifest)?.as_bytes())?;

    let file = zip.finish()?;
    file.sync_all()?;
    fs::rename(&temp_path, archive_path)?;

    Ok(())
}
