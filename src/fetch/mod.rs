//! Integrity-verified retrieval of the GeoLite2 archive.
//!
//! The archive and its detached SHA-256 checksum are both requested with the
//! configured MaxMind credentials (HTTP Basic). The archive is streamed into the
//! scratch directory, hashed from disk and compared with the published digest.
//! A mismatch aborts the run before anything is extracted.

mod checksum;
mod download;

use std::path::PathBuf;

use reqwest::Client;

use crate::config::{Config, Endpoints};
use crate::error_handling::PipelineError;
use crate::workspace::Scratch;

use checksum::{fetch_expected_digest, sha256_file, verify_digest};
use download::download_archive;

/// An archive whose SHA-256 matched the vendor's checksum.
#[derive(Debug, Clone)]
pub struct VerifiedArchive {
    /// Archive inside the scratch directory
    pub path: PathBuf,
    /// Bytes downloaded
    pub size: u64,
    /// Lowercase hex digest
    pub sha256: String,
}

/// Downloads the archive and its checksum and verifies one against the other.
///
/// # Errors
///
/// - `RemoteFetchError` / `RemoteTransportError` if either request fails
/// - `IntegrityFormatError` if the checksum payload holds no usable digest
/// - `ChecksumMismatchError` if the archive does not hash to the expected value
/// - `ScratchIoError` if the archive cannot be written or re-read
pub async fn fetch_verified_archive(
    client: &Client,
    endpoints: &Endpoints,
    config: &Config,
    scratch: &Scratch,
) -> Result<VerifiedArchive, PipelineError> {
    let (path, size) = download_archive(client, &endpoints.archive_url, config, scratch).await?;
    let expected = fetch_expected_digest(client, &endpoints.checksum_url, config).await?;

    let actual = sha256_file(&path)
        .await
        .map_err(|source| PipelineError::ScratchIoError {
            path: path.clone(),
            source,
        })?;
    verify_digest(&expected, &actual)?;

    log::info!("Verified archive SHA-256 {}", actual);
    Ok(VerifiedArchive {
        path,
        size,
        sha256: actual,
    })
}
