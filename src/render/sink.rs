// Artifact sinks.
// The display surface capability: the visible artifact is always replaced
// wholesale, never patched, so a stale drawing can never linger next to a
// new one.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

use super::layout::Artifact;

/// Display surface for rendered artifacts.
pub trait ArtifactSink {
    /// Replace whatever is currently displayed with `artifact`.
    fn replace(&mut self, artifact: Artifact) -> Result<()>;
}

/// Sink holding the most recently displayed artifact in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    current: Option<Artifact>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently displayed artifact, if any render has completed.
    pub fn current(&self) -> Option<&Artifact> {
        self.current.as_ref()
    }
}

impl ArtifactSink for MemorySink {
    fn replace(&mut self, artifact: Artifact) -> Result<()> {
        self.current = Some(artifact);
        Ok(())
    }
}

/// Sink that writes each artifact to a fixed file, for viewers that watch a
/// path. The write goes through a temp file and rename so a watcher never
/// observes a half-written drawing.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactSink for FileSink {
    fn replace(&mut self, artifact: Artifact) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&artifact.svg)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_sink_replaces_wholesale() {
        let mut sink = MemorySink::new();
        assert!(sink.current().is_none());

        sink.replace(Artifact::new(b"first".to_vec())).unwrap();
        sink.replace(Artifact::new(b"second".to_vec())).unwrap();
        assert_eq!(sink.current().unwrap().svg, b"second");
    }

    #[test]
    fn test_file_sink_writes_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("current.svg");
        let mut sink = FileSink::new(&path);

        sink.replace(Artifact::new(b"<svg/>".to_vec())).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<svg/>");

        sink.replace(Artifact::new(b"<svg>2</svg>".to_vec())).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"<svg>2</svg>");
    }
}
