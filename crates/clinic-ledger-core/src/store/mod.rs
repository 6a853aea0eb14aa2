//! Durable persistence for the visit-record collection.
//!
//! The whole collection lives in one pretty-printed JSON document so it stays
//! human-inspectable and diffable. Every mutation is a full
//! load-modify-save cycle serialized behind a mutex; the save itself is
//! rename-atomic, so lock-free readers observe either the old document or
//! the new one, never a truncation.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

use crate::models::{
    parse_flat_fee, parse_line_items, round2, summarize_items, RejectReason, VisitRecord,
    VisitSubmission,
};

/// Store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("ledger I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger document is corrupt: {0}")]
    Corrupt(serde_json::Error),

    #[error("failed to serialize ledger document: {0}")]
    Serialize(serde_json::Error),

    #[error("ledger lock poisoned: {0}")]
    LockPoisoned(String),
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        StoreError::LockPoisoned(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of an append: the stored record, or the reason the submission was
/// rejected without touching storage.
#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Added(VisitRecord),
    Rejected(RejectReason),
}

/// JSON-document record store.
pub struct RecordStore {
    path: PathBuf,
    /// Serializes every load-modify-save sequence. Two concurrent appends
    /// must never observe the same pre-state, or one write clobbers the
    /// other and an id is handed out twice.
    write_lock: Mutex<()>,
}

impl RecordStore {
    /// Open a store backed by the document at `path`, creating the parent
    /// directory and an empty `[]` document if none exists.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        };
        store.bootstrap()?;
        Ok(store)
    }

    /// Idempotent bootstrap of the backing document.
    fn bootstrap(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        if !self.path.exists() {
            self.write_document("[]")?;
        }
        Ok(())
    }

    /// Read the full collection.
    ///
    /// # Errors
    ///
    /// `StoreError::Corrupt` when the document does not parse as a record
    /// array; this propagates, there is no auto-repair.
    pub fn load(&self) -> StoreResult<Vec<VisitRecord>> {
        self.bootstrap()?;
        let contents = fs::read_to_string(&self.path)?;
        serde_json::from_str(&contents).map_err(StoreError::Corrupt)
    }

    /// Replace the full collection on disk.
    pub fn save(&self, records: &[VisitRecord]) -> StoreResult<()> {
        let contents = serde_json::to_string_pretty(records).map_err(StoreError::Serialize)?;
        self.write_document(&contents)?;
        tracing::debug!(count = records.len(), "ledger document saved");
        Ok(())
    }

    /// Write via a sibling temp file and rename into place. Rename is atomic
    /// on the filesystems the ledger targets, so a concurrent reader never
    /// sees a partial document.
    fn write_document(&self, contents: &str) -> StoreResult<()> {
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Next identifier for a snapshot: `max(id) + 1`, or 1 when empty.
    ///
    /// A pure function of the snapshot rather than a separate counter, so it
    /// self-heals after delete and re-add. Only sound while appends are
    /// serialized by the write lock.
    pub fn next_id(records: &[VisitRecord]) -> u64 {
        records.iter().map(|record| record.id).max().unwrap_or(0) + 1
    }

    /// Validate, normalize, and persist a new visit.
    ///
    /// Validation failure is reported as `AppendOutcome::Rejected` and leaves
    /// storage untouched; only storage-level failures are errors.
    pub fn append(&self, submission: VisitSubmission) -> StoreResult<AppendOutcome> {
        let _guard = self.write_lock.lock()?;

        let items = parse_line_items(&submission.fee_items);
        if let Err(reason) = submission.validate(!items.is_empty()) {
            tracing::warn!(%reason, "visit submission rejected");
            return Ok(AppendOutcome::Rejected(reason));
        }

        let fee = if items.is_empty() {
            parse_flat_fee(&submission.fee)
        } else {
            round2(items.iter().map(|item| item.subtotal).sum())
        };

        let mut records = self.load()?;
        let mut record = VisitRecord {
            id: Self::next_id(&records),
            visit_date: submission.visit_date,
            patient_name: submission.patient_name,
            phone: submission.phone,
            gender: submission.gender,
            age: submission.age,
            case_no: submission.case_no,
            chief_complaint: submission.chief_complaint,
            diagnosis: submission.diagnosis,
            item: submission.item,
            note: submission.note,
            payment_method: submission.payment_method,
            fee_items: items,
            fee,
            created_at: chrono::Local::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        };
        if record.item.is_empty() {
            record.item = summarize_items(&record);
        }

        records.push(record.clone());
        self.save(&records)?;
        Ok(AppendOutcome::Added(record))
    }

    /// Remove the record with `id`, if present. Unknown ids are a no-op.
    pub fn delete(&self, id: u64) -> StoreResult<()> {
        let _guard = self.write_lock.lock()?;

        let mut records = self.load()?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            tracing::debug!(id, "delete matched no record");
        }
        self.save(&records)?;
        Ok(())
    }
}
