//! Core state machine types.
//!
//! This module contains the data the engine interprets:
//! - State names and the immutable configuration graph
//! - Guard, callback and validation descriptors
//! - The entity contract and its error collection
//! - Transition history records and queries

mod callback;
mod entity;
mod guard;
pub mod history;
mod machine;
mod state;
mod transition;

pub use callback::{Around, Callback, Next, Validation};
pub use entity::{BoxError, Errors, SharedError, Stateful};
pub use guard::Guard;
pub use history::{HistoryQuery, HistoryStore, Metadata, TransitionRecord, DEFAULT_HISTORY_TABLE};
pub use machine::Machine;
pub use state::{IntoSources, StateName};
pub use transition::TransitionDefinition;
