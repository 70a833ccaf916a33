use std::io::Read;
use tally_core::{RawTable, RawValue, TableError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("Missing header row")]
    MissingHeader,
    #[error("Malformed table: {0}")]
    Table(#[from] TableError),
}

/// Reads a CSV export whose first row is the header.
///
/// Short rows are padded with empty cells, since exports commonly drop a
/// trailing empty column. Rows wider than the header are rejected.
pub fn read_table<R: Read>(data: R) -> Result<RawTable, CsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let columns: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    if columns.is_empty() || columns.iter().all(|c| c.trim().is_empty()) {
        return Err(CsvError::MissingHeader);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row: Vec<RawValue> = record.iter().map(RawValue::from_cell).collect();
        if row.len() < columns.len() {
            row.resize(columns.len(), RawValue::Empty);
        }
        rows.push(row);
    }

    Ok(RawTable::new(columns, rows)?)
}
