use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tally_core::CanonicalRecord;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Corrupt ledger file {}: {source}", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Index {index} out of range for ledger of {len} records")]
    IndexOutOfRange { index: i64, len: usize },
}

/// The transaction ledger, persisted as one JSON array that is rewritten in
/// full after every mutation.
///
/// All mutations go through a single mutex. The next state is written to disk
/// before it replaces the in-memory copy, so a failed write leaves both
/// untouched.
#[derive(Debug)]
pub struct LedgerStore {
    path: PathBuf,
    records: Mutex<Vec<CanonicalRecord>>,
}

impl LedgerStore {
    /// Opens the ledger at `path`. A missing file is an empty ledger; an
    /// unreadable or unparseable one is an error.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let records = read_ledger(&path)?;
        tracing::info!(path = %path.display(), records = records.len(), "loaded ledger");
        Ok(LedgerStore {
            path,
            records: Mutex::new(records),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of every record in ledger order.
    pub fn all(&self) -> Vec<CanonicalRecord> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn append_batch(&self, batch: Vec<CanonicalRecord>) -> Result<(), StorageError> {
        let count = batch.len();
        self.mutate(|records| {
            records.extend(batch);
            Ok(())
        })?;
        tracing::info!(appended = count, "appended records");
        Ok(())
    }

    pub fn append_one(&self, record: CanonicalRecord) -> Result<(), StorageError> {
        self.append_batch(vec![record])
    }

    /// Removes and returns the record at `index`; later records shift down by one.
    pub fn remove_at(&self, index: i64) -> Result<CanonicalRecord, StorageError> {
        let removed = self.mutate(|records| {
            let len = records.len();
            let idx = usize::try_from(index)
                .ok()
                .filter(|&i| i < len)
                .ok_or(StorageError::IndexOutOfRange { index, len })?;
            Ok(records.remove(idx))
        })?;
        tracing::info!(index, "removed record");
        Ok(removed)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<CanonicalRecord>> {
        // The guarded value is only ever replaced wholesale, never left half-updated.
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Vec<CanonicalRecord>) -> Result<T, StorageError>,
    ) -> Result<T, StorageError> {
        let mut guard = self.lock();
        let mut next = guard.clone();
        let out = change(&mut next)?;
        write_ledger(&self.path, &next)?;
        *guard = next;
        Ok(out)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_ledger(path: &Path) -> Result<Vec<CanonicalRecord>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(io_error(path)(e)),
    };
    serde_json::from_slice(&bytes).map_err(|source| StorageError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

fn write_ledger(path: &Path, records: &[CanonicalRecord]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let json = serde_json::to_vec_pretty(records).map_err(StorageError::Serialize)?;

    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    let written = fs::write(&tmp, json)
        .map_err(io_error(&tmp))
        .and_then(|()| fs::rename(&tmp, path).map_err(io_error(path)));
    if written.is_err() {
        if let Err(e) = fs::remove_file(&tmp) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!(path = %tmp.display(), error = %e, "could not remove temporary ledger file");
            }
        }
    }
    written
}
