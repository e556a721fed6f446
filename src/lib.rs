//! Statecraft: a declarative, transactional state machine engine
//!
//! A host entity type declares its states, the events that move between
//! them, and per-event guards, validations and callbacks. The engine
//! executes one transition at a time: guards first, then validations, then
//! the state change, save and audit record inside a single transaction.
//!
//! # Core Concepts
//!
//! - **Machine**: Immutable configuration graph built once per entity type
//! - **Guards**: Side-effect-free preconditions, evaluated in order
//! - **Validations**: Checks that report field errors on the entity
//! - **Callbacks**: Before/after hooks and around interceptors
//! - **History**: Append-only transition records, queryable by subject,
//!   event, state and time
//!
//! # Example
//!
//! ```rust
//! use statecraft::builder::MachineBuilder;
//! use statecraft::core::{Errors, HistoryStore, Machine, StateName, Stateful};
//! use statecraft::executor::Transitions;
//! use statecraft::persistence::MemoryRepository;
//! use std::sync::OnceLock;
//!
//! #[derive(Clone)]
//! struct Article {
//!     id: u64,
//!     title: String,
//!     state: StateName,
//!     errors: Errors,
//! }
//!
//! static MACHINE: OnceLock<Machine<Article>> = OnceLock::new();
//!
//! impl Stateful for Article {
//!     fn subject_type() -> &'static str {
//!         "Article"
//!     }
//!
//!     fn machine() -> Option<&'static Machine<Self>> {
//!         Some(MACHINE.get_or_init(|| {
//!             MachineBuilder::new()
//!                 .initial_state("draft")
//!                 .and_then(|b| b.state("review"))
//!                 .and_then(|b| {
//!                     b.transition("submit", "draft", "review", |t| {
//!                         t.guard_method("title_present")
//!                     })
//!                 })
//!                 .and_then(|b| b.build())
//!                 .expect("article machine")
//!         }))
//!     }
//!
//!     fn subject_id(&self) -> String {
//!         self.id.to_string()
//!     }
//!
//!     fn current_state(&self) -> &StateName {
//!         &self.state
//!     }
//!
//!     fn set_current_state(&mut self, state: StateName) {
//!         self.state = state;
//!     }
//!
//!     fn errors(&self) -> &Errors {
//!         &self.errors
//!     }
//!
//!     fn errors_mut(&mut self) -> &mut Errors {
//!         &mut self.errors
//!     }
//!
//!     fn call_predicate(&self, name: &str) -> Option<bool> {
//!         match name {
//!             "title_present" => Some(!self.title.is_empty()),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let repository = MemoryRepository::<Article>::new();
//! let mut article = Article {
//!     id: 1,
//!     title: "Hello".into(),
//!     state: StateName::from("draft"),
//!     errors: Errors::default(),
//! };
//!
//! article.fire("submit", &repository).unwrap();
//! assert_eq!(article.state, "review");
//! assert_eq!(repository.history("state_transitions").len(), 1);
//! ```

pub mod builder;
pub mod checkpoint;
pub mod core;
pub mod executor;
pub mod persistence;

#[cfg(test)]
mod fixtures;

// Re-export commonly used types
pub use builder::{ConfigurationError, MachineBuilder};
pub use crate::core::{Guard, Machine, StateName, Stateful, TransitionRecord};
pub use executor::{Outcome, TransitionError, Transitions};
