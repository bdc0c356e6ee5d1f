//! Authenticated archive download.

use std::path::{Path, PathBuf};

use reqwest::{Client, Response};
use tokio::io::AsyncWriteExt;

use crate::config::{Config, ARCHIVE_FILENAME};
use crate::error_handling::{PipelineError, Resource};
use crate::workspace::Scratch;

/// Sends an authenticated GET and checks the response status.
pub(crate) async fn get_authenticated(
    client: &Client,
    url: &str,
    config: &Config,
    resource: Resource,
) -> Result<Response, PipelineError> {
    let response = client
        .get(url)
        .basic_auth(&config.account_id, Some(&config.license_key))
        .send()
        .await
        .map_err(|source| PipelineError::RemoteTransportError { resource, source })?;

    let status = response.status();
    if !status.is_success() {
        log::error!("MaxMind returned {} for the {} request", status, resource);
        return Err(PipelineError::RemoteFetchError { resource, status });
    }
    Ok(response)
}

/// Streams the archive into the scratch directory.
///
/// The body is written to `db.zip.tmp` and renamed to `db.zip` once complete,
/// so a partial download is never mistaken for the archive.
///
/// Returns the archive path and the number of bytes written.
pub(crate) async fn download_archive(
    client: &Client,
    url: &str,
    config: &Config,
    scratch: &Scratch,
) -> Result<(PathBuf, u64), PipelineError> {
    let mut response = get_authenticated(client, url, config, Resource::Archive).await?;

    let tmp_path = scratch.file(&format!("{}.tmp", ARCHIVE_FILENAME));
    let archive_path = scratch.file(ARCHIVE_FILENAME);

    let mut file = tokio::fs::File::create(&tmp_path)
        .await
        .map_err(scratch_error(&tmp_path))?;

    let mut written: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|source| PipelineError::RemoteTransportError {
            resource: Resource::Archive,
            source,
        })?
    {
        file.write_all(&chunk)
            .await
            .map_err(scratch_error(&tmp_path))?;
        written += chunk.len() as u64;
    }
    file.flush().await.map_err(scratch_error(&tmp_path))?;
    file.sync_all().await.map_err(scratch_error(&tmp_path))?;
    drop(file);

    tokio::fs::rename(&tmp_path, &archive_path)
        .await
        .map_err(scratch_error(&archive_path))?;

    log::info!("Downloaded archive ({} bytes)", written);
    Ok((archive_path, written))
}

fn scratch_error(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
    move |source| PipelineError::ScratchIoError {
        path: path.to_path_buf(),
        source,
    }
}
