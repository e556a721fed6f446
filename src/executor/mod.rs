//! Transition execution.
//!
//! This module is the imperative shell around the configuration graph: it
//! resolves an event, evaluates guards and validations, and performs the
//! state change, save and history append inside one transaction.
//!
//! # Phases
//!
//! 1. **Guards** in declaration order; the first failure aborts with
//!    [`TransitionError::CheckFailed`].
//! 2. **Validations** against a cleared error slate; any reported error
//!    aborts with [`TransitionError::ValidationFailed`].
//! 3. **Mutation** inside a transaction: around callbacks wrap before
//!    callbacks, the state change, the save, the history record and after
//!    callbacks. Any failure rolls the whole unit back.
//!
//! Guards and validations run outside the transaction. Concurrent
//! transitions on the same persisted record are left to the repository's
//! isolation and locking.

mod attempt;
mod error;

pub use attempt::{Outcome, TransitionAttempt};
pub use error::TransitionError;

use crate::core::{HistoryStore, Machine, Metadata, Stateful, TransitionRecord};
use crate::persistence::Repository;
use tracing::debug;

impl<E: Stateful> Machine<E> {
    /// Fire `event` on `entity` without metadata.
    pub fn fire<R>(&self, entity: &mut E, event: &str, repository: &R) -> Result<Outcome, TransitionError>
    where
        R: Repository<E> + ?Sized,
    {
        self.fire_with(entity, event, Metadata::new(), repository)
    }

    /// Fire `event` on `entity`, storing `metadata` on the history record.
    pub fn fire_with<R>(
        &self,
        entity: &mut E,
        event: &str,
        metadata: Metadata,
        repository: &R,
    ) -> Result<Outcome, TransitionError>
    where
        R: Repository<E> + ?Sized,
    {
        TransitionAttempt::new(self, entity, event, metadata)?.run(repository)
    }

    /// Whether `event` is legal from the entity's state and every guard
    /// passes. Guards whose method is missing count as failing.
    pub fn can_fire(&self, entity: &E, event: &str) -> bool {
        let Some(definition) = self.transition(event) else {
            return false;
        };
        if !definition.allows_from(entity.current_state()) {
            return false;
        }
        definition.guards().iter().all(|guard| match guard.evaluate(entity) {
            Ok(passed) => passed,
            Err(err) => {
                debug!(event, error = %err, "guard could not be evaluated");
                false
            }
        })
    }

    /// Events that [`Machine::can_fire`] accepts, in declaration order.
    pub fn permitted_events(&self, entity: &E) -> Vec<&str> {
        self.events()
            .filter(|event| self.can_fire(entity, event))
            .collect()
    }
}

fn enabled<E: Stateful>() -> Result<&'static Machine<E>, TransitionError> {
    E::machine().ok_or(TransitionError::NotEnabled {
        subject_type: E::subject_type(),
    })
}

/// Runtime entry points on any [`Stateful`] entity.
///
/// Every method fails with [`TransitionError::NotEnabled`] when the type
/// has not compiled a machine.
pub trait Transitions: Stateful {
    fn fire<R>(&mut self, event: &str, repository: &R) -> Result<Outcome, TransitionError>
    where
        R: Repository<Self> + ?Sized,
    {
        enabled::<Self>()?.fire(self, event, repository)
    }

    fn fire_with<R>(
        &mut self,
        event: &str,
        metadata: Metadata,
        repository: &R,
    ) -> Result<Outcome, TransitionError>
    where
        R: Repository<Self> + ?Sized,
    {
        enabled::<Self>()?.fire_with(self, event, metadata, repository)
    }

    fn can_fire(&self, event: &str) -> Result<bool, TransitionError> {
        Ok(enabled::<Self>()?.can_fire(self, event))
    }

    fn permitted_events(&self) -> Result<Vec<&'static str>, TransitionError> {
        Ok(enabled::<Self>()?.permitted_events(self))
    }

    /// Put a fresh entity into the machine's initial state.
    fn initialize_state(&mut self) -> Result<(), TransitionError> {
        let machine = enabled::<Self>()?;
        self.set_current_state(machine.initial_state().clone());
        Ok(())
    }

    /// History records for this entity, oldest first.
    fn transition_history<H>(&self, store: &H) -> Vec<TransitionRecord>
    where
        H: HistoryStore + ?Sized,
    {
        store.for_subject(Self::subject_type(), &self.subject_id())
    }
}

impl<E: Stateful> Transitions for E {}
