use std::path::PathBuf;

use serde_json::{Map, Value};
use tally_core::{CanonicalRecord, MatcherConfig, ProjectedRow};
use tally_import::{process_upload, validate, ProcessedUpload, UploadedFile};
use tally_storage::LedgerStore;

use crate::error::AppError;

/// Upload, manual add/delete and read operations over one ledger.
///
/// Every operation either completes, including persistence, or leaves the
/// ledger as it was.
pub struct LedgerService {
    store: LedgerStore,
    matcher: MatcherConfig,
}

impl LedgerService {
    pub fn new(store: LedgerStore, matcher: MatcherConfig) -> Self {
        Self { store, matcher }
    }

    pub fn open(ledger_path: impl Into<PathBuf>, matcher: MatcherConfig) -> Result<Self, AppError> {
        let store = LedgerStore::load(ledger_path)?;
        Ok(Self::new(store, matcher))
    }

    pub fn store(&self) -> &LedgerStore {
        &self.store
    }

    /// Maps, validates and appends an uploaded CSV. Nothing is appended when
    /// the upload fails.
    pub fn upload(&self, file: Option<UploadedFile<'_>>) -> Result<ProcessedUpload, AppError> {
        let processed = process_upload(file, &self.matcher)?;
        self.store.append_batch(processed.records.clone())?;
        Ok(processed)
    }

    /// Validates a manually entered record keyed by canonical field names.
    /// Column matching does not apply here.
    pub fn add(&self, fields: &Map<String, Value>) -> Result<CanonicalRecord, AppError> {
        let record = validate(&ProjectedRow::from_fields(fields))?;
        self.store.append_one(record.clone())?;
        Ok(record)
    }

    pub fn delete(&self, index: i64) -> Result<CanonicalRecord, AppError> {
        Ok(self.store.remove_at(index)?)
    }

    pub fn transactions(&self) -> Vec<CanonicalRecord> {
        self.store.all()
    }
}
