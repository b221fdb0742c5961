//! # In-Memory Store
//!
//! Volatile `SurveyStore`. Its contents can be dumped to and restored from
//! a plain record list, which the CLI keeps as a JSON file.

use super::{SnapshotId, SurveyStore};
use crate::{EsgError, Question, QuestionId, SurveySnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Plain contents of a `MemoryStore`, snapshots in append order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MemoryDump {
    pub questions: Vec<Question>,
    pub snapshots: Vec<SurveySnapshot>,
}

/// BTreeMap-backed survey store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    questions: BTreeMap<QuestionId, Question>,
    /// Snapshot at index `i` has id `SnapshotId(i)`.
    snapshots: Vec<SurveySnapshot>,
    company_index: BTreeMap<String, Vec<SnapshotId>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy the contents out as plain records.
    #[must_use]
    pub fn dump(&self) -> MemoryDump {
        MemoryDump {
            questions: self.questions.values().cloned().collect(),
            snapshots: self.snapshots.clone(),
        }
    }

    /// Rebuild a store from a dump, replaying appends in order.
    pub fn restore(dump: MemoryDump) -> Result<Self, EsgError> {
        let mut store = Self::new();
        store.upsert_questions(&dump.questions)?;
        for snapshot in &dump.snapshots {
            store.append_snapshot(snapshot)?;
        }
        Ok(store)
    }
}

impl SurveyStore for MemoryStore {
    fn upsert_questions(&mut self, questions: &[Question]) -> Result<usize, EsgError> {
        let mut inserted = 0usize;
        for question in questions {
            if !self.questions.contains_key(&question.id) {
                self.questions.insert(question.id, question.clone());
                inserted = inserted.saturating_add(1);
            }
        }
        Ok(inserted)
    }

    fn questions(&self) -> Result<Vec<Question>, EsgError> {
        Ok(self.questions.values().cloned().collect())
    }

    fn append_snapshot(&mut self, snapshot: &SurveySnapshot) -> Result<SnapshotId, EsgError> {
        let id = SnapshotId(self.snapshots.len() as u64);
        self.snapshots.push(snapshot.clone());
        self.company_index
            .entry(snapshot.company.name.clone())
            .or_default()
            .push(id);
        Ok(id)
    }

    fn snapshot(&self, id: SnapshotId) -> Result<Option<SurveySnapshot>, EsgError> {
        Ok(usize::try_from(id.0)
            .ok()
            .and_then(|index| self.snapshots.get(index))
            .cloned())
    }

    fn snapshots_for(&self, company: &str) -> Result<Vec<SurveySnapshot>, EsgError> {
        let Some(ids) = self.company_index.get(company) else {
            return Ok(Vec::new());
        };
        let mut snapshots = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(snapshot) = self.snapshot(id)? {
                snapshots.push(snapshot);
            }
        }
        Ok(snapshots)
    }

    fn companies(&self) -> Result<Vec<String>, EsgError> {
        Ok(self.company_index.keys().cloned().collect())
    }

    fn snapshot_count(&self) -> Result<usize, EsgError> {
        Ok(self.snapshots.len())
    }

    fn clear(&mut self) -> Result<(), EsgError> {
        *self = Self::new();
        Ok(())
    }
}
