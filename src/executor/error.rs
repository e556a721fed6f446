//! Errors raised while executing a transition.

use crate::core::{BoxError, Errors, SharedError, StateName};
use crate::persistence::PersistenceError;
use thiserror::Error;

/// Why a transition attempt did not complete.
#[derive(Clone, Debug, Error)]
pub enum TransitionError {
    /// The entity type has not compiled a machine.
    #[error("{subject_type} has no state machine; return one from Stateful::machine")]
    NotEnabled { subject_type: &'static str },

    /// Unknown event, or the current state is not one of its sources.
    #[error("Cannot fire '{event}' from state '{from}'")]
    InvalidTransition { event: String, from: StateName },

    /// A guard returned false. `guard` is its description.
    #[error("Guard '{guard}' blocked '{event}'")]
    CheckFailed { event: String, guard: String },

    /// Validations reported errors. The same errors are left on the entity.
    #[error("Validation failed for '{event}': {}", .errors.full_messages().join(", "))]
    ValidationFailed { event: String, errors: Errors },

    /// A named guard could not be resolved on the entity.
    #[error("Guard '{name}' is not defined on {subject_type}; {hint}")]
    MissingGuardMethod {
        subject_type: &'static str,
        name: String,
        hint: String,
    },

    /// A named callback could not be resolved on the entity.
    #[error("Callback '{name}' is not defined on {subject_type}; define it on the model")]
    MissingCallbackMethod {
        subject_type: &'static str,
        name: String,
    },

    /// Error raised by a before, after or around callback.
    #[error(transparent)]
    Callback(SharedError),

    /// Save, history append or commit failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl TransitionError {
    /// Wrap an error raised inside a callback or around interceptor.
    pub fn callback(error: impl Into<BoxError>) -> Self {
        TransitionError::Callback(SharedError::from(error.into()))
    }

    /// Accumulated validation messages, if this is a validation failure.
    pub fn messages(&self) -> Vec<String> {
        match self {
            TransitionError::ValidationFailed { errors, .. } => errors.full_messages(),
            _ => Vec::new(),
        }
    }
}
