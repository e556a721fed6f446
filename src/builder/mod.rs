//! Builder API for defining machines.
//!
//! [`MachineBuilder`] declares states and transitions and freezes them into
//! an immutable [`Machine`](crate::core::Machine). Structural mistakes are
//! reported as [`ConfigurationError`] at definition time.

pub mod error;
pub mod machine;
pub mod options;
pub mod transition;

pub use error::ConfigurationError;
pub use machine::MachineBuilder;
pub use options::MachineOptions;
pub use transition::TransitionBuilder;
