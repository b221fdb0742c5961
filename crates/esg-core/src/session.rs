//! # Session Module
//!
//! Explicit handle over the survey store. A caller opens a session for a unit
//! of work and drops it when done; there is no process-wide connection.
//!
//! ## Storage Backends
//!
//! - `InMemory`: `MemoryStore` (fast, volatile)
//! - `Persistent`: `RedbStore` for disk-backed ACID storage

use crate::ingestor::{Ingestor, QuestionBank, SurveySubmission};
use crate::series::{CompanyHistory, SeriesAggregator};
use crate::storage::{MemoryStore, RedbStore, SnapshotId, SurveyStore};
use crate::{EsgError, Question, SurveySnapshot};
use std::path::Path;

/// Storage backend for a Session.
#[derive(Debug)]
pub enum StorageBackend {
    /// In-memory store (fast, volatile).
    InMemory(MemoryStore),
    /// Disk-backed store using redb (ACID, persistent).
    Persistent(RedbStore),
}

impl Default for StorageBackend {
    fn default() -> Self {
        Self::InMemory(MemoryStore::new())
    }
}

impl StorageBackend {
    fn store(&self) -> &dyn SurveyStore {
        match self {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }

    fn store_mut(&mut self) -> &mut dyn SurveyStore {
        match self {
            StorageBackend::InMemory(store) => store,
            StorageBackend::Persistent(store) => store,
        }
    }
}

/// Counts describing the contents of a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub questions: usize,
    pub snapshots: usize,
    pub companies: usize,
    pub persistent: bool,
}

/// A Session owns one storage backend.
///
/// Does not implement Clone: a redb handle cannot be shared safely.
#[derive(Debug, Default)]
pub struct Session {
    backend: StorageBackend,
}

impl Session {
    /// Create a new empty session with in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session with persistent redb storage at the given path.
    pub fn with_redb(path: impl AsRef<Path>) -> Result<Self, EsgError> {
        Ok(Self {
            backend: StorageBackend::Persistent(RedbStore::open(path)?),
        })
    }

    /// Create a session over an existing in-memory store.
    #[must_use]
    pub fn with_memory(store: MemoryStore) -> Self {
        Self {
            backend: StorageBackend::InMemory(store),
        }
    }

    /// The in-memory store, if this session is not persistent.
    #[must_use]
    pub fn memory_store(&self) -> Option<&MemoryStore> {
        match &self.backend {
            StorageBackend::InMemory(store) => Some(store),
            StorageBackend::Persistent(_) => None,
        }
    }

    /// Check if using persistent storage.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(self.backend, StorageBackend::Persistent(_))
    }

    // =========================================================================
    // REFERENCE DATA
    // =========================================================================

    /// Validate and store reference questions.
    ///
    /// The incoming batch is validated as a whole before anything is written.
    /// Ids already stored are kept unchanged. Returns how many were inserted.
    pub fn load_questions(&mut self, questions: Vec<Question>) -> Result<usize, EsgError> {
        let batch = QuestionBank::new(questions)?;
        let records: Vec<Question> = batch.iter().cloned().collect();
        let inserted = self.backend.store_mut().upsert_questions(&records)?;
        tracing::info!(
            received = records.len(),
            inserted,
            "reference questions loaded"
        );
        Ok(inserted)
    }

    /// The stored questions as a validated bank.
    pub fn question_bank(&self) -> Result<QuestionBank, EsgError> {
        QuestionBank::new(self.backend.store().questions()?)
    }

    // =========================================================================
    // SUBMISSIONS
    // =========================================================================

    /// Validate a submission against the stored bank and append it.
    pub fn submit(
        &mut self,
        submission: &SurveySubmission,
    ) -> Result<(SnapshotId, SurveySnapshot), EsgError> {
        let bank = self.question_bank()?;
        let snapshot = Ingestor::ingest(&bank, submission)?;
        let id = self.backend.store_mut().append_snapshot(&snapshot)?;
        tracing::info!(
            snapshot = %id,
            company = %snapshot.company.name,
            date = %snapshot.date,
            "survey submitted"
        );
        Ok((id, snapshot))
    }

    /// Snapshots of a company, in submission order.
    pub fn snapshots(&self, company: &str) -> Result<Vec<SurveySnapshot>, EsgError> {
        self.backend.store().snapshots_for(company)
    }

    /// Most recent snapshot of a company by survey date.
    ///
    /// Among snapshots sharing the latest date, the last submitted wins.
    pub fn latest(&self, company: &str) -> Result<Option<SurveySnapshot>, EsgError> {
        let snapshots = self.snapshots(company)?;
        Ok(snapshots
            .into_iter()
            .enumerate()
            .max_by_key(|(index, s)| (s.date, *index))
            .map(|(_, s)| s))
    }

    /// Longitudinal series for a company.
    pub fn history(&self, company: &str) -> Result<CompanyHistory, EsgError> {
        let snapshots = self.snapshots(company)?;
        Ok(SeriesAggregator::new(&snapshots)?.aggregate())
    }

    /// Companies with at least one submission.
    pub fn companies(&self) -> Result<Vec<String>, EsgError> {
        self.backend.store().companies()
    }

    /// Counts of stored records.
    pub fn status(&self) -> Result<StoreStatus, EsgError> {
        let store = self.backend.store();
        Ok(StoreStatus {
            questions: store.questions()?.len(),
            snapshots: store.snapshot_count()?,
            companies: store.companies()?.len(),
            persistent: self.is_persistent(),
        })
    }

    /// Remove all stored data.
    pub fn reset(&mut self) -> Result<(), EsgError> {
        self.backend.store_mut().clear()?;
        tracing::info!(persistent = self.is_persistent(), "store cleared");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
