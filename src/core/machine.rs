//! The configuration graph.

use super::state::StateName;
use super::transition::TransitionDefinition;
use crate::builder::MachineBuilder;
use std::collections::HashMap;
use std::sync::Arc;

/// Immutable description of an entity type's states and transitions.
///
/// Built once per entity type by [`MachineBuilder`] and shared read-only
/// afterwards. Cloning is cheap: definitions are reference counted.
pub struct Machine<E> {
    pub(crate) states: Arc<[StateName]>,
    pub(crate) initial: StateName,
    pub(crate) transitions: Arc<[Arc<TransitionDefinition<E>>]>,
    pub(crate) index: Arc<HashMap<String, usize>>,
    pub(crate) history_table: Arc<str>,
}

impl<E> Machine<E> {
    /// Start defining a machine.
    pub fn builder() -> MachineBuilder<E> {
        MachineBuilder::new()
    }

    /// Declared states, in declaration order.
    pub fn states(&self) -> &[StateName] {
        &self.states
    }

    pub fn initial_state(&self) -> &StateName {
        &self.initial
    }

    pub fn has_state(&self, state: &str) -> bool {
        self.states.iter().any(|declared| declared == state)
    }

    /// Declared event names, in declaration order.
    pub fn events(&self) -> impl Iterator<Item = &str> {
        self.transitions.iter().map(|t| t.event())
    }

    pub fn transition(&self, event: &str) -> Option<&TransitionDefinition<E>> {
        self.index
            .get(event)
            .map(|&position| self.transitions[position].as_ref())
    }

    pub fn transitions(&self) -> impl Iterator<Item = &TransitionDefinition<E>> {
        self.transitions.iter().map(Arc::as_ref)
    }

    /// Table that history records for this machine are written to.
    pub fn history_table(&self) -> &str {
        &self.history_table
    }
}

impl<E> Clone for Machine<E> {
    fn clone(&self) -> Self {
        Self {
            states: Arc::clone(&self.states),
            initial: self.initial.clone(),
            transitions: Arc::clone(&self.transitions),
            index: Arc::clone(&self.index),
            history_table: Arc::clone(&self.history_table),
        }
    }
}

impl<E> std::fmt::Debug for Machine<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine")
            .field("states", &self.states)
            .field("initial", &self.initial)
            .field("transitions", &self.transitions)
            .field("history_table", &self.history_table)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{article_machine, Article};

    #[test]
    fn machine_exposes_declared_graph() {
        let machine = article_machine();

        assert_eq!(machine.states(), ["draft", "review", "published"]);
        assert_eq!(machine.initial_state(), "draft");
        assert_eq!(
            machine.events().collect::<Vec<_>>(),
            vec!["submit", "approve", "reject"]
        );
        assert!(machine.has_state("review"));
        assert!(!machine.has_state("archived"));
    }

    #[test]
    fn transition_lookup_by_event() {
        let machine = article_machine();
        let submit = machine.transition("submit").unwrap();

        assert_eq!(submit.sources(), ["draft"]);
        assert_eq!(submit.destination(), "review");
        assert!(submit.allows_from(&StateName::from("draft")));
        assert!(!submit.allows_from(&StateName::from("review")));
        assert!(machine.transition("archive").is_none());
    }

    #[test]
    fn clones_share_definitions() {
        let machine: Machine<Article> = article_machine();
        let clone = machine.clone();

        assert!(Arc::ptr_eq(&machine.transitions, &clone.transitions));
    }
}
