//! Atomic publication of the finished output file.
//!
//! The output is built in the scratch directory and moved into place with a
//! single `rename`. On the same filesystem this replaces the destination in one
//! step: readers see either the previous list or the new one. Across
//! filesystems the rename fails and the destination is left untouched.

use std::path::{Path, PathBuf};

use crate::error_handling::PipelineError;

/// Renames `staged` to `destination`, replacing any existing file.
///
/// # Errors
///
/// Returns `PublishError` if the rename fails (e.g. `EXDEV` when the scratch
/// directory is on another device, or a missing destination directory).
pub fn publish(staged: &Path, destination: &Path) -> Result<PathBuf, PipelineError> {
    std::fs::rename(staged, destination).map_err(|source| PipelineError::PublishError {
        from: staged.to_path_buf(),
        to: destination.to_path_buf(),
        source,
    })?;
    log::info!("Published {}", destination.display());
    Ok(destination.to_path_buf())
}
