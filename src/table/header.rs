//! Column lookup by header name.

use std::collections::HashMap;

use csv::StringRecord;

use crate::error_handling::{PipelineError, Table};

/// Maps header names to column positions.
///
/// Column order is not stable across MaxMind releases, so both tables resolve
/// their required columns through this index. If a name appears twice, the
/// last occurrence wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    columns: HashMap<String, usize>,
}

impl HeaderIndex {
    /// Indexes a header record.
    pub fn new(headers: &StringRecord) -> Self {
        let columns = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), i))
            .collect();
        Self { columns }
    }

    /// Position of `name`, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Resolves every name in `names`, in order.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` naming the first column that is absent.
    pub fn require<const N: usize>(
        &self,
        table: Table,
        names: [&str; N],
    ) -> Result<[usize; N], PipelineError> {
        let mut positions = [0usize; N];
        for (slot, name) in positions.iter_mut().zip(names) {
            *slot = self
                .position(name)
                .ok_or_else(|| PipelineError::SchemaError {
                    table,
                    column: name.to_string(),
                })?;
        }
        Ok(positions)
    }
}
