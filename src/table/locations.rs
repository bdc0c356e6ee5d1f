//! Geoname selection from the locations table.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;

use crate::config::BlockedSet;
use crate::error_handling::{PipelineError, Table};
use crate::table::{open_table, read_error, table_reader, HeaderIndex};

/// geoname_id -> uppercase country code, for blocked countries only.
///
/// Every value is a member of the `BlockedSet` the index was built from.
#[derive(Debug, Clone, Default)]
pub struct GeonameIndex {
    countries: HashMap<String, String>,
}

impl GeonameIndex {
    /// Country code for `geoname_id`, if it belongs to a blocked country.
    pub fn get(&self, geoname_id: &str) -> Option<&str> {
        self.countries.get(geoname_id).map(String::as_str)
    }

    /// Whether `geoname_id` belongs to a blocked country.
    pub fn contains(&self, geoname_id: &str) -> bool {
        self.countries.contains_key(geoname_id)
    }

    /// Number of indexed geonames.
    pub fn len(&self) -> usize {
        self.countries.len()
    }

    /// Whether no geoname belongs to a blocked country.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Streams the locations table and keeps the geonames of blocked countries.
///
/// Country codes are uppercased before the membership test. A file with no
/// header, or a header and no rows, yields an empty index.
///
/// # Errors
///
/// - `SchemaError` if `geoname_id` or `country_iso_code` is missing from the header
/// - `RowFormatError` for a row whose field count differs from the header
/// - `TableIoError` if the underlying reader fails
pub fn select_geonames<R: Read>(
    source: R,
    blocked: &BlockedSet,
) -> Result<GeonameIndex, PipelineError> {
    let mut reader = table_reader(source);
    let headers = reader
        .headers()
        .map_err(|e| read_error(Table::Locations, 0, e))?
        .clone();
    if headers.is_empty() {
        log::warn!("Locations table is empty");
        return Ok(GeonameIndex::default());
    }

    let [id_col, country_col] =
        HeaderIndex::new(&headers).require(Table::Locations, ["geoname_id", "country_iso_code"])?;

    let mut countries = HashMap::new();
    let mut record = StringRecord::new();
    let mut row: u64 = 0;
    loop {
        row += 1;
        match reader.read_record(&mut record) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => return Err(read_error(Table::Locations, row, e)),
        }

        let geoname_id = &record[id_col];
        if geoname_id.is_empty() {
            continue;
        }
        let country = record[country_col].to_ascii_uppercase();
        if blocked.contains(&country) {
            countries.insert(geoname_id.to_string(), country);
        }
    }

    log::debug!("Scanned {} location rows", row - 1);
    Ok(GeonameIndex { countries })
}

/// Opens `path` and runs `select_geonames` over it.
pub fn select_geonames_from_path(
    path: &Path,
    blocked: &BlockedSet,
) -> Result<GeonameIndex, PipelineError> {
    let index = select_geonames(open_table(path, Table::Locations)?, blocked)?;
    log::info!(
        "Selected {} geonames for blocked countries {}",
        index.len(),
        blocked
    );
    Ok(index)
}
