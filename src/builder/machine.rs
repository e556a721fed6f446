//! Builder for constructing machines.

use crate::builder::error::ConfigurationError;
use crate::builder::options::MachineOptions;
use crate::builder::transition::TransitionBuilder;
use crate::core::{IntoSources, Machine, StateName, Stateful, TransitionDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::trace;

/// Builder for a machine's states and transitions.
///
/// States must be declared before the transitions that reference them.
/// Every declaration is checked immediately, so a broken definition fails
/// where it is written.
///
/// # Example
///
/// ```rust
/// use statecraft::builder::MachineBuilder;
/// # use statecraft::core::{Errors, StateName, Stateful};
/// # struct Post { title: String, state: StateName, errors: Errors }
/// # impl Stateful for Post {
/// #     fn subject_type() -> &'static str { "Post" }
/// #     fn subject_id(&self) -> String { "1".into() }
/// #     fn current_state(&self) -> &StateName { &self.state }
/// #     fn set_current_state(&mut self, state: StateName) { self.state = state; }
/// #     fn errors(&self) -> &Errors { &self.errors }
/// #     fn errors_mut(&mut self) -> &mut Errors { &mut self.errors }
/// # }
///
/// let machine = MachineBuilder::<Post>::new()
///     .initial_state("draft")?
///     .state("published")?
///     .transition("publish", "draft", "published", |t| {
///         t.guard_labeled("title present", |post: &Post| !post.title.is_empty())
///     })?
///     .build()?;
///
/// assert_eq!(machine.initial_state(), "draft");
/// # Ok::<(), statecraft::builder::ConfigurationError>(())
/// ```
pub struct MachineBuilder<E> {
    states: Vec<StateName>,
    initial: Option<StateName>,
    transitions: Vec<Arc<TransitionDefinition<E>>>,
    index: HashMap<String, usize>,
    options: MachineOptions,
}

impl<E> MachineBuilder<E> {
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            initial: None,
            transitions: Vec::new(),
            index: HashMap::new(),
            options: MachineOptions::default(),
        }
    }
}

impl<E: Stateful> MachineBuilder<E> {
    /// Declare a state, optionally marking it initial.
    pub fn declare_state(
        mut self,
        name: impl Into<StateName>,
        initial: bool,
    ) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::MissingArgument {
                call: "state",
                argument: "state name",
            });
        }
        if self.states.contains(&name) {
            return Err(ConfigurationError::DuplicateState(name.to_string()));
        }
        if initial {
            if let Some(existing) = &self.initial {
                return Err(ConfigurationError::MultipleInitialStates {
                    existing: existing.to_string(),
                    state: name.to_string(),
                });
            }
            self.initial = Some(name.clone());
        }

        trace!(subject = E::subject_type(), state = %name, initial, "declared state");
        self.states.push(name);
        Ok(self)
    }

    /// Declare a non-initial state.
    pub fn state(self, name: impl Into<StateName>) -> Result<Self, ConfigurationError> {
        self.declare_state(name, false)
    }

    /// Declare the initial state.
    pub fn initial_state(self, name: impl Into<StateName>) -> Result<Self, ConfigurationError> {
        self.declare_state(name, true)
    }

    /// Declare a transition from one or many states to `to`.
    ///
    /// `body` attaches guards, validations and callbacks. Pass `|t| t` for a
    /// bare transition.
    pub fn transition<F>(
        mut self,
        event: impl Into<String>,
        from: impl IntoSources,
        to: impl Into<StateName>,
        body: F,
    ) -> Result<Self, ConfigurationError>
    where
        F: FnOnce(TransitionBuilder<E>) -> TransitionBuilder<E>,
    {
        let event = event.into();
        if event.is_empty() {
            return Err(ConfigurationError::MissingArgument {
                call: "transition",
                argument: "event name",
            });
        }
        if self.index.contains_key(&event) {
            return Err(ConfigurationError::DuplicateEvent(event));
        }

        let mut sources: Vec<StateName> = Vec::new();
        for source in from.into_sources() {
            if !sources.contains(&source) {
                sources.push(source);
            }
        }
        if sources.is_empty() {
            return Err(ConfigurationError::EmptySources(event));
        }

        let destination = to.into();
        for state in sources.iter().chain(std::iter::once(&destination)) {
            if !self.states.contains(state) {
                return Err(ConfigurationError::UnknownState {
                    event,
                    state: state.to_string(),
                });
            }
        }

        let definition = body(TransitionBuilder::new(event.clone(), sources, destination)).build()?;

        trace!(
            subject = E::subject_type(),
            event = %event,
            guards = definition.guards().len(),
            "declared transition"
        );
        self.index.insert(event, self.transitions.len());
        self.transitions.push(Arc::new(definition));
        Ok(self)
    }

    /// Override the table history records are written to.
    pub fn history_table(mut self, name: impl Into<String>) -> Result<Self, ConfigurationError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ConfigurationError::MissingArgument {
                call: "history_table",
                argument: "table name",
            });
        }
        self.options.history_table = name;
        Ok(self)
    }

    /// Apply loaded options.
    pub fn options(self, options: MachineOptions) -> Result<Self, ConfigurationError> {
        self.history_table(options.history_table)
    }

    /// Freeze the definition into a [`Machine`].
    ///
    /// Can be called repeatedly; every call yields the same graph.
    pub fn build(&self) -> Result<Machine<E>, ConfigurationError> {
        let initial = self
            .initial
            .clone()
            .ok_or(ConfigurationError::MissingInitialState)?;

        Ok(Machine {
            states: self.states.clone().into(),
            initial,
            transitions: self.transitions.clone().into(),
            index: Arc::new(self.index.clone()),
            history_table: self.options.history_table.as_str().into(),
        })
    }
}

impl<E> Default for MachineBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DEFAULT_HISTORY_TABLE;
    use crate::fixtures::Article;

    fn states() -> MachineBuilder<Article> {
        MachineBuilder::new()
            .initial_state("draft")
            .and_then(|b| b.state("review"))
            .and_then(|b| b.state("published"))
            .unwrap()
    }

    #[test]
    fn duplicate_state_is_rejected() {
        let result = states().state("review");
        assert!(matches!(result, Err(ConfigurationError::DuplicateState(ref s)) if s == "review"));
    }

    #[test]
    fn second_initial_state_is_rejected() {
        let result = states().initial_state("archived");
        assert!(matches!(
            result,
            Err(ConfigurationError::MultipleInitialStates { ref existing, ref state })
                if existing == "draft" && state == "archived"
        ));
    }

    #[test]
    fn forward_reference_is_rejected() {
        let result = states().transition("archive", "published", "archived", |t| t);
        assert!(matches!(
            result,
            Err(ConfigurationError::UnknownState { ref state, .. }) if state == "archived"
        ));

        let result = states().transition("restore", ["archived", "review"], "draft", |t| t);
        assert!(matches!(
            result,
            Err(ConfigurationError::UnknownState { ref state, .. }) if state == "archived"
        ));
    }

    #[test]
    fn duplicate_event_is_rejected() {
        let result = states()
            .transition("submit", "draft", "review", |t| t)
            .and_then(|b| b.transition("submit", "review", "published", |t| t));

        assert!(matches!(result, Err(ConfigurationError::DuplicateEvent(ref e)) if e == "submit"));
    }

    #[test]
    fn empty_sources_are_rejected() {
        let result = states().transition("noop", Vec::<&str>::new(), "draft", |t| t);
        assert!(matches!(result, Err(ConfigurationError::EmptySources(_))));
    }

    #[test]
    fn body_argument_errors_surface_at_declaration() {
        let result = states().transition("submit", "draft", "review", |t| t.guard_predicate(""));
        assert!(matches!(
            result,
            Err(ConfigurationError::MissingArgument { call: "guard_predicate", .. })
        ));
    }

    #[test]
    fn build_requires_initial_state() {
        let result = MachineBuilder::<Article>::new()
            .state("draft")
            .unwrap()
            .build();
        assert!(matches!(result, Err(ConfigurationError::MissingInitialState)));
    }

    #[test]
    fn sources_are_deduplicated() {
        let machine = states()
            .transition("reset", ["review", "published", "review"], "draft", |t| t)
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(machine.transition("reset").unwrap().sources(), ["review", "published"]);
    }

    #[test]
    fn build_is_repeatable() {
        let builder = states()
            .transition("submit", "draft", "review", |t| t)
            .unwrap();

        let first = builder.build().unwrap();
        let second = builder.build().unwrap();

        assert_eq!(first.states(), second.states());
        assert_eq!(first.initial_state(), second.initial_state());
        assert_eq!(
            first.events().collect::<Vec<_>>(),
            second.events().collect::<Vec<_>>()
        );
    }

    #[test]
    fn history_table_defaults_and_overrides() {
        let default = states().build().unwrap();
        assert_eq!(default.history_table(), DEFAULT_HISTORY_TABLE);

        let custom = states().history_table("article_transitions").unwrap().build().unwrap();
        assert_eq!(custom.history_table(), "article_transitions");

        assert!(states().history_table("").is_err());
    }

    #[test]
    fn options_apply_history_table() {
        let options = MachineOptions::from_json(r#"{"history_table":"audit"}"#).unwrap();
        let machine = states().options(options).unwrap().build().unwrap();
        assert_eq!(machine.history_table(), "audit");
    }
}
