//! # redb-backed Survey Storage
//!
//! A disk-backed survey store using the redb embedded database:
//! - ACID transactions, one per write operation
//! - Crash safety (copy-on-write B-trees)
//! - Payloads framed by `formats::persistence` (magic + version + postcard)
//!
//! ## Tables
//!
//! | Table           | Key            | Value                          |
//! |-----------------|----------------|--------------------------------|
//! | `questions`     | question id    | framed `Question`              |
//! | `snapshots`     | snapshot id    | framed `SurveySnapshot`        |
//! | `company_index` | company name   | framed `Vec<u64>` snapshot ids |
//! | `metadata`      | key            | u64                            |

use super::{SnapshotId, SurveyStore};
use crate::formats::{record_from_bytes, record_to_bytes};
use crate::{EsgError, Question, SurveySnapshot};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::path::Path;

/// Table for questions: QuestionId(u32) -> framed Question bytes
const QUESTIONS: TableDefinition<u32, &[u8]> = TableDefinition::new("questions");

/// Table for snapshots: SnapshotId(u64) -> framed SurveySnapshot bytes
const SNAPSHOTS: TableDefinition<u64, &[u8]> = TableDefinition::new("snapshots");

/// Table for the company index: name -> framed list of snapshot ids
const COMPANY_INDEX: TableDefinition<&str, &[u8]> = TableDefinition::new("company_index");

/// Table for metadata: key string -> value u64
const METADATA: TableDefinition<&str, u64> = TableDefinition::new("metadata");

const NEXT_SNAPSHOT_ID: &str = "next_snapshot_id";

fn io_err(e: impl std::fmt::Display) -> EsgError {
    EsgError::IoError(e.to_string())
}

/// A disk-backed survey store using redb.
pub struct RedbStore {
    db: Database,
    /// Next snapshot id, mirrored from the metadata table.
    next_snapshot_id: u64,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore")
            .field("next_snapshot_id", &self.next_snapshot_id)
            .finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a survey database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EsgError> {
        let db = Database::create(path.as_ref()).map_err(io_err)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_err)?;
            let _ = write_txn.open_table(QUESTIONS).map_err(io_err)?;
            let _ = write_txn.open_table(SNAPSHOTS).map_err(io_err)?;
            let _ = write_txn.open_table(COMPANY_INDEX).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
            write_txn.commit().map_err(io_err)?;
        }

        let next_snapshot_id = {
            let read_txn = db.begin_read().map_err(io_err)?;
            let table = read_txn.open_table(METADATA).map_err(io_err)?;
            table
                .get(NEXT_SNAPSHOT_ID)
                .map_err(io_err)?
                .map(|v| v.value())
                .unwrap_or(0)
        };

        tracing::debug!(path = %path.as_ref().display(), next_snapshot_id, "redb store opened");

        Ok(Self {
            db,
            next_snapshot_id,
        })
    }

    fn snapshot_ids_for(&self, company: &str) -> Result<Vec<u64>, EsgError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(COMPANY_INDEX).map_err(io_err)?;
        match table.get(company).map_err(io_err)? {
            Some(data) => record_from_bytes(data.value()),
            None => Ok(Vec::new()),
        }
    }
}

impl SurveyStore for RedbStore {
    fn upsert_questions(&mut self, questions: &[Question]) -> Result<usize, EsgError> {
        let mut inserted = 0usize;
        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut table = write_txn.open_table(QUESTIONS).map_err(io_err)?;
            for question in questions {
                if table.get(question.id.0).map_err(io_err)?.is_some() {
                    continue;
                }
                let bytes = record_to_bytes(question)?;
                table
                    .insert(question.id.0, bytes.as_slice())
                    .map_err(io_err)?;
                inserted = inserted.saturating_add(1);
            }
        }
        write_txn.commit().map_err(io_err)?;
        Ok(inserted)
    }

    fn questions(&self) -> Result<Vec<Question>, EsgError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(QUESTIONS).map_err(io_err)?;

        let mut questions = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (_, value) = entry.map_err(io_err)?;
            questions.push(record_from_bytes(value.value())?);
        }
        Ok(questions)
    }

    fn append_snapshot(&mut self, snapshot: &SurveySnapshot) -> Result<SnapshotId, EsgError> {
        let id = self.next_snapshot_id;
        let next = id.saturating_add(1);
        let bytes = record_to_bytes(snapshot)?;

        let mut ids = self.snapshot_ids_for(&snapshot.company.name)?;
        ids.push(id);
        let index_bytes = record_to_bytes(&ids)?;

        let write_txn = self.db.begin_write().map_err(io_err)?;
        {
            let mut snapshots = write_txn.open_table(SNAPSHOTS).map_err(io_err)?;
            snapshots.insert(id, bytes.as_slice()).map_err(io_err)?;

            let mut index = write_txn.open_table(COMPANY_INDEX).map_err(io_err)?;
            index
                .insert(snapshot.company.name.as_str(), index_bytes.as_slice())
                .map_err(io_err)?;

            let mut meta = write_txn.open_table(METADATA).map_err(io_err)?;
            meta.insert(NEXT_SNAPSHOT_ID, next).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        // Only advance the cached counter once the transaction is durable.
        self.next_snapshot_id = next;
        Ok(SnapshotId(id))
    }

    fn snapshot(&self, id: SnapshotId) -> Result<Option<SurveySnapshot>, EsgError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(SNAPSHOTS).map_err(io_err)?;
        match table.get(id.0).map_err(io_err)? {
            Some(data) => Ok(Some(record_from_bytes(data.value())?)),
            None => Ok(None),
        }
    }

    fn snapshots_for(&self, company: &str) -> Result<Vec<SurveySnapshot>, EsgError> {
        let ids = self.snapshot_ids_for(company)?;
        let mut snapshots = Vec::with_capacity(ids.len());
        for id in ids {
            match self.snapshot(SnapshotId(id))? {
                Some(snapshot) => snapshots.push(snapshot),
                None => {
                    return Err(EsgError::IoError(format!(
                        "company index of {:?} references missing snapshot {}",
                        company, id
                    )));
                }
            }
        }
        Ok(snapshots)
    }

    fn companies(&self) -> Result<Vec<String>, EsgError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(COMPANY_INDEX).map_err(io_err)?;

        let mut companies = Vec::new();
        for entry in table.iter().map_err(io_err)? {
            let (key, _) = entry.map_err(io_err)?;
            companies.push(key.value().to_string());
        }
        Ok(companies)
    }

    fn snapshot_count(&self) -> Result<usize, EsgError> {
        let read_txn = self.db.begin_read().map_err(io_err)?;
        let table = read_txn.open_table(SNAPSHOTS).map_err(io_err)?;
        let count = table.len().map_err(io_err)?;
        Ok(count as usize)
    }

    fn clear(&mut self) -> Result<(), EsgError> {
        let write_txn = self.db.begin_write().map_err(io_err)?;
        write_txn.delete_table(QUESTIONS).map_err(io_err)?;
        write_txn.delete_table(SNAPSHOTS).map_err(io_err)?;
        write_txn.delete_table(COMPANY_INDEX).map_err(io_err)?;
        write_txn.delete_table(METADATA).map_err(io_err)?;
        {
            let _ = write_txn.open_table(QUESTIONS).map_err(io_err)?;
            let _ = write_txn.open_table(SNAPSHOTS).map_err(io_err)?;
            let _ = write_txn.open_table(COMPANY_INDEX).map_err(io_err)?;
            let _ = write_txn.open_table(METADATA).map_err(io_err)?;
        }
        write_txn.commit().map_err(io_err)?;

        self.next_snapshot_id = 0;
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
