// Export path utilities.
// Deterministic artifact and archive names plus output directory resolution.

use std::path::PathBuf;

use directories::UserDirs;

/// Name of the batch archive.
pub const ARCHIVE_FILE_NAME: &str = "exploration-steps.zip";

/// Name of the metadata entry inside the batch archive.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// Artifact file name for a 0-based step index. Step numbering in file
/// names is 1-based.
pub fn step_file_name(index: usize) -> String {
    format!("step-{}.svg", index + 1)
}

/// Default export directory: the platform download directory.
pub fn default_export_dir() -> Option<PathBuf> {
    UserDirs::new().and_then(|dirs| dirs.download_dir().map(|p| p.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_file_names_are_one_based() {
        assert_eq!(step_file_name(0), "step-1.svg");
        assert_eq!(step_file_name(9), "step-10.svg");
    }
}
