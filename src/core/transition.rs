//! Transition definitions.

use super::callback::{Around, Callback, Validation};
use super::guard::Guard;
use super::state::StateName;

/// A declared event: where it may start, where it leads and what runs
/// along the way. Immutable once its machine is built.
pub struct TransitionDefinition<E> {
    pub(crate) event: String,
    pub(crate) sources: Vec<StateName>,
    pub(crate) destination: StateName,
    pub(crate) guards: Vec<Guard<E>>,
    pub(crate) validations: Vec<Validation<E>>,
    pub(crate) before: Vec<Callback<E>>,
    pub(crate) after: Vec<Callback<E>>,
    pub(crate) around: Vec<Around<E>>,
}

impl<E> TransitionDefinition<E> {
    /// Event name.
    pub fn event(&self) -> &str {
        &self.event
    }

    /// States the event may fire from.
    pub fn sources(&self) -> &[StateName] {
        &self.sources
    }

    /// State the entity moves to.
    pub fn destination(&self) -> &StateName {
        &self.destination
    }

    /// Guards in declaration order.
    pub fn guards(&self) -> &[Guard<E>] {
        &self.guards
    }

    pub fn validations(&self) -> &[Validation<E>] {
        &self.validations
    }

    /// Callbacks run before the state changes.
    pub fn before(&self) -> &[Callback<E>] {
        &self.before
    }

    /// Callbacks run after the history record is written.
    pub fn after(&self) -> &[Callback<E>] {
        &self.after
    }

    /// Interceptors, outermost first.
    pub fn around(&self) -> &[Around<E>] {
        &self.around
    }

    /// Whether the event is legal from `state`, ignoring guards.
    pub fn allows_from(&self, state: &StateName) -> bool {
        self.sources.contains(state)
    }
}

impl<E> std::fmt::Debug for TransitionDefinition<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionDefinition")
            .field("event", &self.event)
            .field("sources", &self.sources)
            .field("destination", &self.destination)
            .field("guards", &self.guards)
            .field("validations", &self.validations.len())
            .field("before", &self.before)
            .field("after", &self.after)
            .field("around", &self.around.len())
            .finish()
    }
}
