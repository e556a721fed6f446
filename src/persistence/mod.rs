//! Persistence seam between the engine and the host's storage.
//!
//! The executor opens exactly one [`Transaction`] per transition attempt and
//! performs the state save and the history append inside it. Either both
//! become visible on commit or neither does.
//!
//! [`MemoryRepository`] and [`MemoryHistory`] are in-memory implementations
//! for tests and for hosts without durable storage.

mod error;
mod memory;

pub use error::PersistenceError;
pub use memory::{MemoryHistory, MemoryRepository};

use crate::core::TransitionRecord;

/// Unit of work scoped to one transition attempt.
pub trait Transaction<E> {
    /// Persist the entity. Implementations may bump
    /// [`Stateful::lock_version`](crate::core::Stateful::lock_version) on the
    /// instance.
    fn save(&mut self, entity: &mut E) -> Result<(), PersistenceError>;

    /// Append a history record to `table`.
    fn record(&mut self, table: &str, record: TransitionRecord) -> Result<(), PersistenceError>;

    fn commit(self: Box<Self>) -> Result<(), PersistenceError>;

    /// Discard every staged write.
    fn rollback(self: Box<Self>);
}

/// Host storage that can open transactions for entities of type `E`.
pub trait Repository<E> {
    fn begin(&self) -> Result<Box<dyn Transaction<E> + '_>, PersistenceError>;
}
