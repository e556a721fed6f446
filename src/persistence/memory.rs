//! In-memory repository and history store.

use super::{PersistenceError, Repository, Transaction};
use crate::core::{HistoryQuery, HistoryStore, Stateful, TransitionRecord};
use dashmap::mapref::entry::Entry as Slot;
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::trace;

struct Entry {
    sequence: u64,
    record: TransitionRecord,
}

/// Append-only history store sharded by subject.
///
/// Appends for different subjects touch different shards, so independent
/// transactions do not contend on a store-wide lock. Query results are in
/// insertion order.
#[derive(Default)]
pub struct MemoryHistory {
    shards: DashMap<(String, String), Vec<Entry>>,
    sequence: AtomicU64,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, oldest first.
    pub fn records(&self) -> Vec<TransitionRecord> {
        self.query(&HistoryQuery::new())
    }
}

impl HistoryStore for MemoryHistory {
    fn append(&self, record: TransitionRecord) {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
        let key = (record.subject_type.clone(), record.subject_id.clone());
        self.shards
            .entry(key)
            .or_default()
            .push(Entry { sequence, record });
    }

    fn query(&self, query: &HistoryQuery) -> Vec<TransitionRecord> {
        let mut matched: Vec<(u64, TransitionRecord)> = Vec::new();
        let mut collect = |entries: &[Entry]| {
            matched.extend(
                entries
                    .iter()
                    .filter(|entry| query.matches(&entry.record))
                    .map(|entry| (entry.sequence, entry.record.clone())),
            );
        };

        match query.subject_key() {
            Some((subject_type, subject_id)) => {
                let key = (subject_type.to_string(), subject_id.to_string());
                if let Some(shard) = self.shards.get(&key) {
                    collect(shard.value().as_slice());
                }
            }
            None => {
                for shard in self.shards.iter() {
                    collect(shard.value().as_slice());
                }
            }
        }

        matched.sort_by_key(|(sequence, _)| *sequence);
        matched.into_iter().map(|(_, record)| record).collect()
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.value().len()).sum()
    }
}

type Constraint<E> = Box<dyn Fn(&E) -> Result<(), String> + Send + Sync>;

/// In-memory repository keyed by subject id.
///
/// Saves are staged in the transaction and applied on commit together with
/// the history records. Entities that track a lock version are checked
/// against the stored copy on save, and again under the record's entry lock
/// on commit, so a transaction that loses the race fails with
/// [`PersistenceError::StaleRecord`] instead of overwriting the winner.
pub struct MemoryRepository<E> {
    records: DashMap<String, E>,
    histories: DashMap<String, Arc<MemoryHistory>>,
    constraints: Vec<Constraint<E>>,
}

impl<E: Stateful + Clone> MemoryRepository<E> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
            histories: DashMap::new(),
            constraints: Vec::new(),
        }
    }

    /// Add a record-level constraint checked on every save.
    pub fn with_constraint<F>(mut self, constraint: F) -> Self
    where
        F: Fn(&E) -> Result<(), String> + Send + Sync + 'static,
    {
        self.constraints.push(Box::new(constraint));
        self
    }

    /// Store an entity outside of any transition.
    pub fn insert(&self, entity: &E) {
        self.records.insert(entity.subject_id(), entity.clone());
    }

    /// Load the persisted copy of an entity.
    pub fn find(&self, subject_id: &str) -> Option<E> {
        self.records.get(subject_id).map(|entity| entity.value().clone())
    }

    /// History store behind `table`, created on first use.
    pub fn history(&self, table: &str) -> Arc<MemoryHistory> {
        self.histories
            .entry(table.to_string())
            .or_default()
            .value()
            .clone()
    }

    fn check(&self, entity: &E) -> Result<(), PersistenceError> {
        for constraint in &self.constraints {
            constraint(entity).map_err(|message| PersistenceError::Constraint {
                subject_type: E::subject_type(),
                subject_id: entity.subject_id(),
                message,
            })?;
        }
        Ok(())
    }

    fn check_version(&self, entity: &E) -> Result<(), PersistenceError> {
        let Some(expected) = entity.lock_version() else {
            return Ok(());
        };
        let id = entity.subject_id();
        match self.records.get(&id) {
            Some(stored) => verify_version(id, expected, stored.value()),
            None => Ok(()),
        }
    }
}

fn verify_version<E: Stateful>(id: String, expected: u64, stored: &E) -> Result<(), PersistenceError> {
    let found = stored.lock_version().unwrap_or(0);
    if found != expected {
        return Err(PersistenceError::StaleRecord {
            subject_type: E::subject_type(),
            subject_id: id,
            expected,
            found,
        });
    }
    Ok(())
}

impl<E: Stateful + Clone> Default for MemoryRepository<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Stateful + Clone> Repository<E> for MemoryRepository<E> {
    fn begin(&self) -> Result<Box<dyn Transaction<E> + '_>, PersistenceError> {
        Ok(Box::new(MemoryTransaction {
            repository: self,
            staged: HashMap::new(),
            records: Vec::new(),
        }))
    }
}

struct Staged<E> {
    /// Lock version the entity carried before this save.
    expected: Option<u64>,
    entity: E,
}

struct MemoryTransaction<'a, E> {
    repository: &'a MemoryRepository<E>,
    staged: HashMap<String, Staged<E>>,
    records: Vec<(String, TransitionRecord)>,
}

impl<E: Stateful + Clone> Transaction<E> for MemoryTransaction<'_, E> {
    fn save(&mut self, entity: &mut E) -> Result<(), PersistenceError> {
        self.repository.check(entity)?;
        self.repository.check_version(entity)?;

        let expected = entity.lock_version();
        if let Some(version) = expected {
            entity.set_lock_version(version + 1);
        }
        self.staged.insert(
            entity.subject_id(),
            Staged {
                expected,
                entity: entity.clone(),
            },
        );
        Ok(())
    }

    fn record(&mut self, table: &str, record: TransitionRecord) -> Result<(), PersistenceError> {
        self.records.push((table.to_string(), record));
        Ok(())
    }

    fn commit(self: Box<Self>) -> Result<(), PersistenceError> {
        let MemoryTransaction {
            repository,
            staged,
            records,
        } = *self;

        trace!(
            saves = staged.len(),
            records = records.len(),
            "committing memory transaction"
        );
        for (id, Staged { expected, entity }) in staged {
            match repository.records.entry(id) {
                Slot::Occupied(mut slot) => {
                    if let Some(expected) = expected {
                        verify_version(slot.key().clone(), expected, slot.get())?;
                    }
                    slot.insert(entity);
                }
                Slot::Vacant(slot) => {
                    slot.insert(entity);
                }
            }
        }
        for (table, record) in records {
            repository.history(&table).append(record);
        }
        Ok(())
    }

    fn rollback(self: Box<Self>) {
        trace!(
            discarded = self.staged.len() + self.records.len(),
            "rolled back memory transaction"
        );
    }
}
