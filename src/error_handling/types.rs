//! Error type definitions.
//!
//! This module defines the error types used throughout the pipeline. Every
//! `PipelineError` is fatal for the run: there is no retry and no partial output.

use std::fmt;
use std::path::PathBuf;

use log::SetLoggerError;
use reqwest::{Error as ReqwestError, StatusCode};
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),
}

/// Remote resources requested from the vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// The zipped CSV database.
    Archive,
    /// The detached SHA-256 checksum of the archive.
    Checksum,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Archive => f.write_str("archive"),
            Resource::Checksum => f.write_str("checksum"),
        }
    }
}

/// Tables read from the extracted archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    /// `GeoLite2-Country-Locations-en.csv`
    Locations,
    /// `GeoLite2-Country-Blocks-IPv4.csv`
    Blocks,
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Table::Locations => f.write_str("locations table"),
            Table::Blocks => f.write_str("blocks table"),
        }
    }
}

/// Pipeline stage in which an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Option parsing and validation, client setup
    Config,
    /// Archive and checksum download
    Fetch,
    /// Checksum parsing and comparison
    Verify,
    /// Member extraction from the archive
    Extract,
    /// Geoname selection from the locations table
    Locations,
    /// Join of the blocks table and output writing
    Blocks,
    /// Rename of the output into place
    Publish,
}

impl Stage {
    /// Short lowercase name used in error output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Fetch => "fetch",
            Stage::Verify => "verify",
            Stage::Extract => "extract",
            Stage::Locations => "locations",
            Stage::Blocks => "blocks",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error types for the denylist pipeline.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum PipelineError {
    /// Missing credentials, empty filter set or an unusable output name.
    #[error("Invalid configuration: {0}")]
    ConfigValidationError(String),

    /// A shared resource (HTTP client) could not be set up.
    #[error(transparent)]
    InitializationError(#[from] InitializationError),

    /// The vendor answered with a non-success status.
    #[error("Failed to fetch {resource}: server returned {status}")]
    RemoteFetchError {
        /// Resource that was requested
        resource: Resource,
        /// Status the server answered with
        status: StatusCode,
    },

    /// Connection, timeout or body transfer failure.
    #[error("Failed to fetch {resource}: {source}")]
    RemoteTransportError {
        /// Resource that was requested
        resource: Resource,
        /// Underlying client error
        #[source]
        source: ReqwestError,
    },

    /// The checksum payload did not start with a SHA-256 hex digest.
    #[error("Invalid checksum payload: {0}")]
    IntegrityFormatError(String),

    /// The downloaded archive does not hash to the published digest.
    #[error("SHA-256 mismatch: got {actual}, expected {expected}")]
    ChecksumMismatchError {
        /// Digest published by the vendor
        expected: String,
        /// Digest of the downloaded file
        actual: String,
    },

    /// The archive container could not be read.
    #[error("Failed to read archive {path:?}: {source}")]
    ArchiveFormatError {
        /// Archive on disk
        path: PathBuf,
        /// Zip reader error
        #[source]
        source: zip::result::ZipError,
    },

    /// One or more required members are absent from the archive.
    #[error("Missing required files in archive: {}", missing.join(", "))]
    MissingMemberError {
        /// Base names not found, in required order
        missing: Vec<String>,
    },

    /// Reading a member or writing it to disk failed.
    #[error("Failed to extract {member}: {source}")]
    ExtractionIOError {
        /// Base name of the member being written
        member: String,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A required column is absent from a table header.
    #[error("{table} is missing required column: {column}")]
    SchemaError {
        /// Table whose header is incomplete
        table: Table,
        /// First missing column
        column: String,
    },

    /// A data row could not be parsed (wrong column count, invalid UTF-8).
    #[error("Malformed row {row} in {table}: {source}")]
    RowFormatError {
        /// Table being read
        table: Table,
        /// 1-based data row, 0 for the header
        row: u64,
        /// CSV parser error
        #[source]
        source: csv::Error,
    },

    /// The table file could not be opened or read.
    #[error("Failed to read {table}: {source}")]
    TableIoError {
        /// Table being read
        table: Table,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The output file could not be written.
    #[error("Failed to write output file {path:?}: {source}")]
    OutputIoError {
        /// Output file being written
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The scratch directory or a file inside it could not be created or written.
    #[error("Scratch directory error at {path:?}: {source}")]
    ScratchIoError {
        /// Path inside (or of) the scratch directory
        path: PathBuf,
        /// I/O failure
        #[source]
        source: std::io::Error,
    },

    /// A file-bound stage was cancelled before it finished (runtime shutdown).
    #[error("{stage} stage was cancelled: {source}")]
    StageCancelledError {
        /// Stage whose task was cancelled
        stage: Stage,
        /// Cancellation reported by the runtime
        #[source]
        source: tokio::task::JoinError,
    },

    /// The final rename into the destination failed (e.g. cross-device).
    #[error("Failed to publish {from:?} to {to:?}: {source}")]
    PublishError {
        /// Staged output
        from: PathBuf,
        /// Destination path
        to: PathBuf,
        /// Rename failure
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Returns the stage that produced this error.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::ConfigValidationError(_) | PipelineError::InitializationError(_) => {
                Stage::Config
            }
            PipelineError::RemoteFetchError { .. }
            | PipelineError::RemoteTransportError { .. }
            | PipelineError::ScratchIoError { .. } => Stage::Fetch,
            PipelineError::IntegrityFormatError(_)
            | PipelineError::ChecksumMismatchError { .. } => Stage::Verify,
            PipelineError::ArchiveFormatError { .. }
            | PipelineError::MissingMemberError { .. }
            | PipelineError::ExtractionIOError { .. } => Stage::Extract,
            PipelineError::SchemaError { table, .. }
            | PipelineError::RowFormatError { table, .. }
            | PipelineError::TableIoError { table, .. } => match table {
                Table::Locations => Stage::Locations,
                Table::Blocks => Stage::Blocks,
            },
            PipelineError::OutputIoError { .. } => Stage::Blocks,
            PipelineError::StageCancelledError { stage, .. } => *stage,
            PipelineError::PublishError { .. } => Stage::Publish,
        }
    }
}
