//! Streaming readers for the GeoLite2 Country CSV tables.
//!
//! Both tables are read forward-only, one record at a time, with a single
//! reused `StringRecord`. Columns are located by header name, not position.
//! Any malformed row aborts the read.

mod blocks;
mod header;
mod locations;

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use csv::{Reader, ReaderBuilder};

use crate::error_handling::{PipelineError, Table};

pub use blocks::{emit_blocks, write_denylist, EmitStats, CANDIDATE_COLUMNS};
pub use header::HeaderIndex;
pub use locations::{select_geonames, select_geonames_from_path, GeonameIndex};

/// Builds a strict CSV reader: the first row is the header and every record
/// must have as many fields as the header.
fn table_reader<R: Read>(source: R) -> Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(source)
}

fn open_table(path: &Path, table: Table) -> Result<BufReader<File>, PipelineError> {
    let file = File::open(path).map_err(|source| PipelineError::TableIoError { table, source })?;
    Ok(BufReader::new(file))
}

/// Maps a CSV read error at data row `row` (1-based, 0 = header).
fn read_error(table: Table, row: u64, err: csv::Error) -> PipelineError {
    if err.is_io_error() {
        PipelineError::TableIoError {
            table,
            source: err.into(),
        }
    } else {
        PipelineError::RowFormatError {
            table,
            row,
            source: err,
        }
    }
}
