//! Definition-time errors raised while building a machine.

use thiserror::Error;

/// Structural problems in a machine definition.
///
/// These are raised while the machine is being defined, never while a
/// transition executes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A state name was declared twice.
    #[error("State '{0}' is already declared")]
    DuplicateState(String),

    /// A second state was marked initial.
    #[error("Initial state already set to '{existing}', cannot also mark '{state}' initial")]
    MultipleInitialStates { existing: String, state: String },

    /// `build` was called before any state was marked initial.
    #[error("Initial state not declared. Declare one with .initial_state(name)")]
    MissingInitialState,

    /// An event name was declared twice.
    #[error("Event '{0}' is already declared")]
    DuplicateEvent(String),

    /// A transition names a state that was not declared before it.
    #[error("Transition '{event}' references undeclared state '{state}'. Declare states before transitions")]
    UnknownState { event: String, state: String },

    /// A transition was declared with an empty source list.
    #[error("Transition '{0}' has no source states")]
    EmptySources(String),

    /// A name argument was empty.
    #[error("{call} requires a non-empty {argument}")]
    MissingArgument {
        call: &'static str,
        argument: &'static str,
    },
}
