//! Checkpoint error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors raised while exporting or importing a history checkpoint.
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("Failed to encode history checkpoint: {0}")]
    Encode(String),

    #[error("Failed to decode history checkpoint: {0}")]
    Decode(String),

    /// Metadata of one record could not be restored from its wire form.
    #[error("Record {record} has unreadable metadata: {message}")]
    InvalidMetadata { record: Uuid, message: String },

    #[error("Unsupported checkpoint version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
