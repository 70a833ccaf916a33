use std::io::Read;
use tally_core::{CanonicalRecord, MatcherConfig};
use thiserror::Error;

use crate::matcher::{ColumnMapping, ColumnMatcher, MatchError};
use crate::projector::{project, ProjectError};
use crate::reader::{read_table, CsvError};
use crate::validator::validate_batch;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("No file received")]
    NoFileReceived,
    #[error("Invalid file type '{0}'. Only CSV files are allowed.")]
    InvalidFileType(String),
    #[error("Error processing file: {0}")]
    Unreadable(#[from] CsvError),
    #[error(transparent)]
    ColumnMapping(#[from] MatchError),
    #[error(transparent)]
    Projection(#[from] ProjectError),
    #[error("No valid transactions found")]
    NoValidRecords,
}

/// A file as handed over by the upload entry point.
#[derive(Debug, Clone, Copy)]
pub struct UploadedFile<'a> {
    pub filename: &'a str,
    pub contents: &'a [u8],
}

/// Outcome of a successful upload. `records` is never empty.
#[derive(Debug, Clone)]
pub struct ProcessedUpload {
    pub mapping: ColumnMapping,
    pub rows_read: usize,
    pub records: Vec<CanonicalRecord>,
}

impl ProcessedUpload {
    pub fn rows_rejected(&self) -> usize {
        self.rows_read - self.records.len()
    }
}

/// Checks the file itself, then runs it through [`process_csv`].
pub fn process_upload(
    file: Option<UploadedFile<'_>>,
    config: &MatcherConfig,
) -> Result<ProcessedUpload, UploadError> {
    let file = file.ok_or(UploadError::NoFileReceived)?;
    if !file.filename.to_lowercase().ends_with(".csv") {
        return Err(UploadError::InvalidFileType(file.filename.to_string()));
    }
    process_csv(file.contents, config)
}

/// read → match columns → project → validate. Fails as a whole when the header
/// cannot be mapped or no row survives validation.
pub fn process_csv<R: Read>(data: R, config: &MatcherConfig) -> Result<ProcessedUpload, UploadError> {
    let table = read_table(data)?;
    let mapping = ColumnMatcher::new(config).match_columns(table.columns())?;
    let projected = project(&table, &mapping)?;
    let records = validate_batch(&projected.rows);

    if records.is_empty() {
        return Err(UploadError::NoValidRecords);
    }

    tracing::info!(
        rows_read = table.row_count(),
        accepted = records.len(),
        "processed upload"
    );

    Ok(ProcessedUpload {
        mapping,
        rows_read: table.row_count(),
        records,
    })
}
