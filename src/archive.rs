//! Archive extraction utilities.
//!
//! This module extracts the required CSV members from the GeoLite2 Country
//! zip archive. Members are matched by base name, so the dated directory
//! MaxMind puts them in (e.g. `GeoLite2-Country-CSV_20240101/`) does not matter.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::error_handling::PipelineError;

/// Extracts the members named in `required` into `dest_dir`.
///
/// Entries are scanned in archive order and the scan stops as soon as every
/// required member has been written. Each member is streamed to disk.
/// Returns the extracted paths in the order of `required`.
///
/// # Errors
///
/// - `ArchiveFormatError` if the archive cannot be opened or an entry header is corrupt
/// - `ExtractionIOError` if a member cannot be decompressed or written
/// - `MissingMemberError` if any required member is absent after a full scan
pub fn extract_members(
    archive_path: &Path,
    required: &[&str],
    dest_dir: &Path,
) -> Result<Vec<PathBuf>, PipelineError> {
    let archive_error = |source: zip::result::ZipError| PipelineError::ArchiveFormatError {
        path: archive_path.to_path_buf(),
        source,
    };

    let file = File::open(archive_path).map_err(|e| archive_error(e.into()))?;
    let mut archive = ZipArchive::new(BufReader::new(file)).map_err(archive_error)?;

    let mut found: BTreeSet<&str> = BTreeSet::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(archive_error)?;
        if entry.is_dir() {
            continue;
        }

        let Some(base_name) = Path::new(entry.name())
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| required.iter().find(|r| **r == n).copied())
        else {
            continue;
        };
        if found.contains(base_name) {
            log::debug!("Skipping duplicate archive member {}", entry.name());
            continue;
        }

        let io_error = |source: std::io::Error| PipelineError::ExtractionIOError {
            member: base_name.to_string(),
            source,
        };
        let out = File::create(dest_dir.join(base_name)).map_err(io_error)?;
        let mut writer = BufWriter::new(out);
        let bytes = std::io::copy(&mut entry, &mut writer).map_err(io_error)?;
        writer.flush().map_err(io_error)?;

        log::info!("Extracted {} ({} bytes)", base_name, bytes);
        found.insert(base_name);
        if found.len() == required.len() {
            break;
        }
    }

    let missing: Vec<String> = required
        .iter()
        .filter(|r| !found.contains(*r))
        .map(|r| r.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(PipelineError::MissingMemberError { missing });
    }

    Ok(required.iter().map(|r| dest_dir.join(r)).collect())
}
