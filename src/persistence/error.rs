//! Persistence-layer errors.

use crate::core::{BoxError, SharedError};
use thiserror::Error;

/// Failures reported by a repository or its transaction.
///
/// The executor never wraps or reinterprets these; it only guarantees that
/// they roll the transaction back.
#[derive(Clone, Debug, Error)]
pub enum PersistenceError {
    /// A record-level constraint rejected the save.
    #[error("{subject_type} {subject_id} is invalid: {message}")]
    Constraint {
        subject_type: &'static str,
        subject_id: String,
        message: String,
    },

    /// The persisted record changed since this instance loaded it.
    #[error("{subject_type} {subject_id} is stale: expected version {expected}, found {found}")]
    StaleRecord {
        subject_type: &'static str,
        subject_id: String,
        expected: u64,
        found: u64,
    },

    /// Error from a host storage backend.
    #[error(transparent)]
    Backend(SharedError),
}

impl PersistenceError {
    /// Wrap an error from a storage backend.
    pub fn backend(error: impl Into<BoxError>) -> Self {
        PersistenceError::Backend(SharedError::from(error.into()))
    }
}
