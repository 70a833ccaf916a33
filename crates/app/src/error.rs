use serde::Serialize;
use std::fmt;
use tally_import::{InvalidRecord, UploadError};
use tally_storage::StorageError;
use thiserror::Error;

/// Structured category of a failed request, as reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NoFileReceived,
    InvalidFileType,
    UnreadableFile,
    ColumnMappingFailed,
    NoValidRecordsFound,
    InvalidTransactionData,
    PersistenceFailure,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::NoFileReceived => "no_file_received",
            ErrorKind::InvalidFileType => "invalid_file_type",
            ErrorKind::UnreadableFile => "unreadable_file",
            ErrorKind::ColumnMappingFailed => "column_mapping_failed",
            ErrorKind::NoValidRecordsFound => "no_valid_records_found",
            ErrorKind::InvalidTransactionData => "invalid_transaction_data",
            ErrorKind::PersistenceFailure => "persistence_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),
    #[error("Persistence failure: {0}")]
    Persistence(#[source] StorageError),
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Upload(e) => match e {
                UploadError::NoFileReceived => ErrorKind::NoFileReceived,
                UploadError::InvalidFileType(_) => ErrorKind::InvalidFileType,
                UploadError::Unreadable(_) => ErrorKind::UnreadableFile,
                UploadError::ColumnMapping(_) | UploadError::Projection(_) => {
                    ErrorKind::ColumnMappingFailed
                }
                UploadError::NoValidRecords => ErrorKind::NoValidRecordsFound,
            },
            AppError::InvalidTransaction(_) => ErrorKind::InvalidTransactionData,
            AppError::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}

impl From<InvalidRecord> for AppError {
    fn from(e: InvalidRecord) -> Self {
        AppError::InvalidTransaction(e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::IndexOutOfRange { .. } => AppError::InvalidTransaction(e.to_string()),
            other => AppError::Persistence(other),
        }
    }
}

/// Serializable error payload for whatever front end sits on top of the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
}
