//! Builder for a single transition's guards, validations and callbacks.

use crate::builder::error::ConfigurationError;
use crate::core::{
    Around, BoxError, Callback, Errors, Guard, Next, StateName, Stateful, TransitionDefinition,
    Validation,
};
use crate::executor::TransitionError;

/// Configures one transition inside [`MachineBuilder::transition`].
///
/// A `TransitionBuilder` only exists while a transition body runs, so guards
/// and callbacks cannot be attached outside a transition. Invalid arguments
/// are remembered and reported when the enclosing transition is declared.
///
/// [`MachineBuilder::transition`]: crate::builder::MachineBuilder::transition
pub struct TransitionBuilder<E> {
    event: String,
    sources: Vec<StateName>,
    destination: StateName,
    guards: Vec<Guard<E>>,
    validations: Vec<Validation<E>>,
    before: Vec<Callback<E>>,
    after: Vec<Callback<E>>,
    around: Vec<Around<E>>,
    error: Option<ConfigurationError>,
}

impl<E: Stateful> TransitionBuilder<E> {
    pub(crate) fn new(event: String, sources: Vec<StateName>, destination: StateName) -> Self {
        Self {
            event,
            sources,
            destination,
            guards: Vec::new(),
            validations: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
            around: Vec::new(),
            error: None,
        }
    }

    /// Add a block guard.
    pub fn guard<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.guards.push(Guard::new(predicate));
        self
    }

    /// Add a block guard with a description used when it fails.
    pub fn guard_labeled<F>(mut self, label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        self.guards.push(Guard::labeled(label, predicate));
        self
    }

    /// Add a guard calling a named predicate on the entity.
    pub fn guard_method(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.require(&name, "guard_method", "method name") {
            self.guards.push(Guard::method(name));
        }
        self
    }

    /// Add a guard calling a named boolean-attribute predicate.
    pub fn guard_predicate(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.require(&name, "guard_predicate", "predicate name") {
            self.guards.push(Guard::predicate(name));
        }
        self
    }

    /// Add a validation block.
    pub fn validate<F>(mut self, check: F) -> Self
    where
        F: Fn(&E, &mut Errors) + Send + Sync + 'static,
    {
        self.validations.push(Validation::new(check));
        self
    }

    pub fn before<F>(mut self, block: F) -> Self
    where
        F: Fn(&mut E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.before.push(Callback::new(block));
        self
    }

    pub fn before_method(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.require(&name, "before_method", "method name") {
            self.before.push(Callback::method(name));
        }
        self
    }

    pub fn after<F>(mut self, block: F) -> Self
    where
        F: Fn(&mut E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.after.push(Callback::new(block));
        self
    }

    pub fn after_method(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if self.require(&name, "after_method", "method name") {
            self.after.push(Callback::method(name));
        }
        self
    }

    /// Wrap the state mutation. Declaration order is nesting order: the
    /// first around callback is the outermost.
    pub fn around<F>(mut self, interceptor: F) -> Self
    where
        F: for<'a> Fn(&mut E, Next<'a, E>) -> Result<(), TransitionError> + Send + Sync + 'static,
    {
        self.around.push(Around::new(interceptor));
        self
    }

    fn require(&mut self, value: &str, call: &'static str, argument: &'static str) -> bool {
        if value.is_empty() {
            self.error
                .get_or_insert(ConfigurationError::MissingArgument { call, argument });
            return false;
        }
        true
    }

    /// Finish the transition.
    pub(crate) fn build(self) -> Result<TransitionDefinition<E>, ConfigurationError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        Ok(TransitionDefinition {
            event: self.event,
            sources: self.sources,
            destination: self.destination,
            guards: self.guards,
            validations: self.validations,
            before: self.before,
            after: self.after,
            around: self.around,
        })
    }
}
