//! Export and import of the transition audit trail.
//!
//! A [`HistoryCheckpoint`] captures every record of one history table so it
//! can be archived or moved to another store. Checkpoints encode to JSON for
//! inspection and to a compact binary form with `bincode`.

use crate::core::{HistoryQuery, HistoryStore, Metadata, StateName, TransitionRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable copy of one history table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryCheckpoint {
    pub version: u32,
    pub id: Uuid,
    pub taken_at: DateTime<Utc>,
    pub table: String,
    /// Records in insertion order.
    pub records: Vec<TransitionRecord>,
}

impl HistoryCheckpoint {
    /// Capture every record currently in `store`.
    pub fn capture<H>(table: impl Into<String>, store: &H) -> Self
    where
        H: HistoryStore + ?Sized,
    {
        Self {
            version: CHECKPOINT_VERSION,
            id: Uuid::new_v4(),
            taken_at: Utc::now(),
            table: table.into(),
            records: store.query(&HistoryQuery::new()),
        }
    }

    /// Append the captured records to `store`, oldest first.
    ///
    /// Returns the number of records restored.
    pub fn restore_into<H>(&self, store: &H) -> Result<usize, CheckpointError>
    where
        H: HistoryStore + ?Sized,
    {
        check_version(self.version)?;
        for record in &self.records {
            store.append(record.clone());
        }
        Ok(self.records.len())
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self =
            serde_json::from_str(json).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        check_version(checkpoint.version)?;
        Ok(checkpoint)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, CheckpointError> {
        let wire = WireCheckpoint::try_from(self)?;
        bincode::serialize(&wire).map_err(|e| CheckpointError::Encode(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let wire: WireCheckpoint =
            bincode::deserialize(bytes).map_err(|e| CheckpointError::Decode(e.to_string()))?;
        check_version(wire.version)?;
        Self::try_from(wire)
    }
}

fn check_version(found: u32) -> Result<(), CheckpointError> {
    if found != CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion {
            found,
            supported: CHECKPOINT_VERSION,
        });
    }
    Ok(())
}

// bincode is not self-describing, so free-form metadata travels as JSON text.
#[derive(Serialize, Deserialize)]
struct WireCheckpoint {
    version: u32,
    id: Uuid,
    taken_at: DateTime<Utc>,
    table: String,
    records: Vec<WireRecord>,
}

#[derive(Serialize, Deserialize)]
struct WireRecord {
    id: Uuid,
    subject_type: String,
    subject_id: String,
    event: String,
    from: StateName,
    to: StateName,
    metadata: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<&HistoryCheckpoint> for WireCheckpoint {
    type Error = CheckpointError;

    fn try_from(checkpoint: &HistoryCheckpoint) -> Result<Self, Self::Error> {
        let records = checkpoint
            .records
            .iter()
            .map(|record| {
                Ok(WireRecord {
                    id: record.id,
                    subject_type: record.subject_type.clone(),
                    subject_id: record.subject_id.clone(),
                    event: record.event.clone(),
                    from: record.from.clone(),
                    to: record.to.clone(),
                    metadata: serde_json::to_string(&record.metadata)
                        .map_err(|e| CheckpointError::Encode(e.to_string()))?,
                    created_at: record.created_at,
                })
            })
            .collect::<Result<Vec<_>, CheckpointError>>()?;

        Ok(Self {
            version: checkpoint.version,
            id: checkpoint.id,
            taken_at: checkpoint.taken_at,
            table: checkpoint.table.clone(),
            records,
        })
    }
}

impl TryFrom<WireCheckpoint> for HistoryCheckpoint {
    type Error = CheckpointError;

    fn try_from(wire: WireCheckpoint) -> Result<Self, Self::Error> {
        let records = wire
            .records
            .into_iter()
            .map(|record| {
                let metadata: Metadata = serde_json::from_str(&record.metadata).map_err(|e| {
                    CheckpointError::InvalidMetadata {
                        record: record.id,
                        message: e.to_string(),
                    }
                })?;
                Ok(TransitionRecord {
                    id: record.id,
                    subject_type: record.subject_type,
                    subject_id: record.subject_id,
                    event: record.event,
                    from: record.from,
                    to: record.to,
                    metadata,
                    created_at: record.created_at,
                })
            })
            .collect::<Result<Vec<_>, CheckpointError>>()?;

        Ok(Self {
            version: wire.version,
            id: wire.id,
            taken_at: wire.taken_at,
            table: wire.table,
            records,
        })
    }
}
