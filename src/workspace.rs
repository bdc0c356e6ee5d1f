//! Per-run scratch directory.
//!
//! Everything the pipeline writes before publishing (archive, extracted tables,
//! output file) lives here. The directory and its contents are removed when the
//! `Scratch` value is dropped, whether the run succeeded or not.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error_handling::PipelineError;

/// Scratch directory exclusively owned by one run.
#[derive(Debug)]
pub struct Scratch {
    dir: TempDir,
}

impl Scratch {
    /// Creates a fresh scratch directory under `parent`, or under the system
    /// temp dir when `parent` is `None`.
    pub fn create(parent: Option<&Path>) -> Result<Self, PipelineError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("geo_denylist-");
        let dir = match parent {
            Some(p) => builder.tempdir_in(p),
            None => builder.tempdir(),
        }
        .map_err(|source| PipelineError::ScratchIoError {
            path: parent
                .map(Path::to_path_buf)
                .unwrap_or_else(std::env::temp_dir),
            source,
        })?;
        log::debug!("Created scratch directory {:?}", dir.path());
        Ok(Self { dir })
    }

    /// Root of the scratch directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path of a file directly inside the scratch directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}
