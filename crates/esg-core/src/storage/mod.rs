//! # Storage Module
//!
//! The persistence collaborator of the engine.
//!
//! - Reference questions are upserted idempotently: existing ids are kept.
//! - Survey snapshots are append-only and never rewritten.
//!
//! Two implementations share the `SurveyStore` trait:
//! - `MemoryStore`: BTreeMap-backed, volatile, dumpable as plain records
//! - `RedbStore`: disk-backed ACID storage using redb

mod memory;
mod redb_store;

pub use memory::{MemoryDump, MemoryStore};
pub use redb_store::RedbStore;

use crate::{EsgError, Question, SurveySnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned to an appended snapshot, in append order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for survey storage backends.
pub trait SurveyStore {
    /// Insert questions whose id is not stored yet. Returns how many were inserted.
    fn upsert_questions(&mut self, questions: &[Question]) -> Result<usize, EsgError>;

    /// All stored questions, ordered by id.
    fn questions(&self) -> Result<Vec<Question>, EsgError>;

    /// Append a snapshot. Earlier snapshots are never touched.
    fn append_snapshot(&mut self, snapshot: &SurveySnapshot) -> Result<SnapshotId, EsgError>;

    /// Lookup a snapshot by id.
    fn snapshot(&self, id: SnapshotId) -> Result<Option<SurveySnapshot>, EsgError>;

    /// Snapshots of one company, in append order.
    fn snapshots_for(&self, company: &str) -> Result<Vec<SurveySnapshot>, EsgError>;

    /// Companies with at least one snapshot, sorted by name.
    fn companies(&self) -> Result<Vec<String>, EsgError>;

    /// Total number of stored snapshots.
    fn snapshot_count(&self) -> Result<usize, EsgError>;

    /// Remove every question and snapshot.
    fn clear(&mut self) -> Result<(), EsgError>;
}
