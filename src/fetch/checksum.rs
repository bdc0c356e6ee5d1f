//! Checksum retrieval and SHA-256 verification.

use std::path::Path;

use reqwest::Client;
use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::config::{Config, MAX_CHECKSUM_PAYLOAD_SIZE, SHA256_HEX_LEN};
use crate::error_handling::{PipelineError, Resource};
use crate::fetch::download::get_authenticated;

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Downloads the checksum file and returns the expected hex digest.
///
/// At most `MAX_CHECKSUM_PAYLOAD_SIZE` bytes are read; anything beyond is ignored.
pub(crate) async fn fetch_expected_digest(
    client: &Client,
    url: &str,
    config: &Config,
) -> Result<String, PipelineError> {
    let mut response = get_authenticated(client, url, config, Resource::Checksum).await?;

    let mut payload = Vec::with_capacity(128);
    while payload.len() < MAX_CHECKSUM_PAYLOAD_SIZE {
        let chunk = response
            .chunk()
            .await
            .map_err(|source| PipelineError::RemoteTransportError {
                resource: Resource::Checksum,
                source,
            })?;
        let Some(chunk) = chunk else {
            break;
        };
        let room = MAX_CHECKSUM_PAYLOAD_SIZE - payload.len();
        payload.extend_from_slice(&chunk[..chunk.len().min(room)]);
    }

    parse_checksum_payload(&payload)
}

/// Extracts the digest from a `sha256sum`-style payload: the first
/// whitespace-delimited token, which must be 64 hex digits.
pub(crate) fn parse_checksum_payload(payload: &[u8]) -> Result<String, PipelineError> {
    let text = String::from_utf8_lossy(payload);
    let token = text.split_whitespace().next().ok_or_else(|| {
        PipelineError::IntegrityFormatError("checksum payload is empty".to_string())
    })?;

    if token.len() != SHA256_HEX_LEN || !token.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(PipelineError::IntegrityFormatError(format!(
            "expected {} hex digits, got {:?}",
            SHA256_HEX_LEN,
            truncate(token, 80)
        )));
    }
    Ok(token.to_ascii_lowercase())
}

/// Computes the SHA-256 of a file in fixed-size chunks.
pub(crate) async fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Fails with `ChecksumMismatchError` unless `actual` equals `expected`,
/// ignoring hex case.
pub(crate) fn verify_digest(expected: &str, actual: &str) -> Result<(), PipelineError> {
    if !actual.eq_ignore_ascii_case(expected) {
        return Err(PipelineError::ChecksumMismatchError {
            expected: expected.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
