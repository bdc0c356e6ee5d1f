//! Join of the IPv4 blocks table against the geoname index.

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use csv::StringRecord;

use crate::error_handling::{PipelineError, Table};
use crate::table::{open_table, read_error, table_reader, GeonameIndex, HeaderIndex};

/// Geoname columns of a block row, in match precedence order.
/// The first one found in the index decides the emitted country.
pub const CANDIDATE_COLUMNS: [&str; 3] = [
    "geoname_id",
    "registered_country_geoname_id",
    "represented_country_geoname_id",
];

/// Counters from one pass over the blocks table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitStats {
    /// Data rows read, header excluded
    pub rows_scanned: u64,
    /// Network lines written, header comment excluded
    pub lines_emitted: u64,
}

/// Streams the blocks table and writes `<network> ; <country>` for every row
/// with a candidate geoname in `index`.
///
/// The first line written is `# list generated <generated_at>`. Lines follow
/// the row order of the table; at most one line is written per row. Rows with
/// no matching candidate are skipped. `output_path` only labels write errors.
///
/// # Errors
///
/// - `SchemaError` if a required column is missing (nothing is written)
/// - `RowFormatError` for a row whose field count differs from the header
/// - `TableIoError` / `OutputIoError` on read or write failure
pub fn emit_blocks<R: Read, W: Write>(
    source: R,
    index: &GeonameIndex,
    mut out: W,
    output_path: &Path,
    generated_at: &str,
) -> Result<EmitStats, PipelineError> {
    let write_error = |source: std::io::Error| PipelineError::OutputIoError {
        path: output_path.to_path_buf(),
        source,
    };

    let mut reader = table_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| read_error(Table::Blocks, 0, e))?
        .clone();

    let columns = if headers.is_empty() {
        log::warn!("Blocks table is empty");
        None
    } else {
        let header_index = HeaderIndex::new(&headers);
        let [network_col] = header_index.require(Table::Blocks, ["network"])?;
        let candidates = header_index.require(Table::Blocks, CANDIDATE_COLUMNS)?;
        Some((network_col, candidates))
    };

    writeln!(out, "# list generated {}", generated_at).map_err(write_error)?;

    let mut stats = EmitStats::default();
    if let Some((network_col, candidates)) = columns {
        let mut record = StringRecord::new();
        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(read_error(Table::Blocks, stats.rows_scanned + 1, e)),
            }
            stats.rows_scanned += 1;

            if let Some(country) = resolve_country(&record, &candidates, index) {
                writeln!(out, "{} ; {}", &record[network_col], country).map_err(write_error)?;
                stats.lines_emitted += 1;
            }
        }
    }

    out.flush().map_err(write_error)?;
    Ok(stats)
}

/// First candidate column, in precedence order, whose value is indexed.
fn resolve_country<'a>(
    record: &StringRecord,
    candidates: &[usize],
    index: &'a GeonameIndex,
) -> Option<&'a str> {
    candidates
        .iter()
        .map(|&col| &record[col])
        .filter(|id| !id.is_empty())
        .find_map(|id| index.get(id))
}

/// Joins the blocks table at `blocks_path` into a new file at `output_path`.
///
/// The header is validated before the output file is created, so a schema
/// error leaves no file behind. `output_path` must not name the blocks table
/// itself: creating the output would truncate the input.
pub fn write_denylist(
    blocks_path: &Path,
    index: &GeonameIndex,
    output_path: &Path,
    generated_at: &str,
) -> Result<EmitStats, PipelineError> {
    let write_error = |source: std::io::Error| PipelineError::OutputIoError {
        path: output_path.to_path_buf(),
        source,
    };

    if same_file(blocks_path, output_path) {
        return Err(write_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "output path is the blocks table being read",
        )));
    }
    check_blocks_header(blocks_path)?;

    let source = open_table(blocks_path, Table::Blocks)?;
    let file = File::create(output_path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    let stats = emit_blocks(source, index, &mut writer, output_path, generated_at)?;
    let file = writer
        .into_inner()
        .map_err(|e| write_error(e.into_error()))?;
    file.sync_all().map_err(write_error)?;

    log::info!(
        "Scanned {} block rows, emitted {} networks",
        stats.rows_scanned,
        stats.lines_emitted
    );
    Ok(stats)
}

/// Whether both paths resolve to the same existing file.
fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn check_blocks_header(blocks_path: &Path) -> Result<(), PipelineError> {
    let mut reader = table_reader(open_table(blocks_path, Table::Blocks)?);
    let headers = reader
        .headers()
        .map_err(|e| read_error(Table::Blocks, 0, e))?;
    if headers.is_empty() {
        return Ok(());
    }
    let header_index = HeaderIndex::new(headers);
    header_index.require(Table::Blocks, ["network"])?;
    header_index.require(Table::Blocks, CANDIDATE_COLUMNS)?;
    Ok(())
}
