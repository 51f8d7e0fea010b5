//! Source dataset access.
//!
//! The source is read fully into memory once per run; every downstream phase
//! makes linear passes over [`SourceTable::rows`] in source order.

pub mod csv_file;
pub mod row;

pub use csv_file::{CsvSource, Encoding};
pub use row::{Column, RowPosition, SourceRow, SourceSchema};

use crate::error::SourceError;

/// Materialized source: resolved schema plus every row in source order.
#[derive(Debug, Clone, Default)]
pub struct SourceTable {
    pub schema: SourceSchema,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    /// Table over rows built in code, with every column considered present.
    pub fn from_rows(rows: Vec<SourceRow>) -> Self {
        Self {
            schema: SourceSchema::complete(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Supplies the raw row sequence.
pub trait SourceReader {
    /// Read the whole source.
    fn read(&self) -> Result<SourceTable, SourceError>;

    /// Human-readable location for diagnostics.
    fn describe(&self) -> String;
}

impl SourceReader for SourceTable {
    fn read(&self) -> Result<SourceTable, SourceError> {
        Ok(self.clone())
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.rows.len())
    }
}
