//! Error handling for the denylist pipeline.
//!
//! This module provides:
//! - The pipeline error taxonomy (`PipelineError`)
//! - The stage attribution used for the single diagnostic message
//! - Initialization errors for logger and HTTP client setup

mod types;

// Re-export public API
pub use types::{InitializationError, PipelineError, Resource, Stage, Table};
