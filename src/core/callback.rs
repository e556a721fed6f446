//! Callbacks, around-interceptors and validations attached to transitions.

use super::entity::{BoxError, Errors, Stateful};
use crate::executor::TransitionError;
use std::fmt;
use std::sync::Arc;

type Block<E> = Arc<dyn Fn(&mut E) -> Result<(), BoxError> + Send + Sync>;

/// Side-effecting hook run before or after the state mutation.
pub enum Callback<E> {
    /// Closure over the entity.
    Block(Block<E>),
    /// Named method on the entity, resolved through [`Stateful::call_method`].
    Method { name: String },
}

impl<E: Stateful> Callback<E> {
    /// Callback backed by a closure.
    pub fn new<F>(block: F) -> Self
    where
        F: Fn(&mut E) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        Callback::Block(Arc::new(block))
    }

    /// Callback resolved by name when it first runs.
    pub fn method(name: impl Into<String>) -> Self {
        Callback::Method { name: name.into() }
    }

    /// Run the callback. Errors raised by the callback are surfaced as
    /// [`TransitionError::Callback`] with the original error as source.
    pub fn run(&self, entity: &mut E) -> Result<(), TransitionError> {
        match self {
            Callback::Block(block) => block(entity).map_err(TransitionError::callback),
            Callback::Method { name } => match entity.call_method(name) {
                Some(result) => result.map_err(TransitionError::callback),
                None => Err(TransitionError::MissingCallbackMethod {
                    subject_type: E::subject_type(),
                    name: name.clone(),
                }),
            },
        }
    }
}

impl<E> Clone for Callback<E> {
    fn clone(&self) -> Self {
        match self {
            Callback::Block(block) => Callback::Block(Arc::clone(block)),
            Callback::Method { name } => Callback::Method { name: name.clone() },
        }
    }
}

impl<E> fmt::Debug for Callback<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callback::Block(_) => f.write_str("Block"),
            Callback::Method { name } => f.debug_struct("Method").field("name", name).finish(),
        }
    }
}

type Interceptor<E> =
    Arc<dyn for<'a> Fn(&mut E, Next<'a, E>) -> Result<(), TransitionError> + Send + Sync>;

/// Callback wrapping the state mutation.
///
/// Each around callback receives a [`Next`] handle. Calling
/// [`Next::run`] proceeds to the next interceptor, or to the mutation itself
/// once the chain is exhausted. Not calling it halts the transition without
/// error.
pub struct Around<E>(Interceptor<E>);

impl<E> Around<E> {
    pub fn new<F>(interceptor: F) -> Self
    where
        F: for<'a> Fn(&mut E, Next<'a, E>) -> Result<(), TransitionError> + Send + Sync + 'static,
    {
        Around(Arc::new(interceptor))
    }
}

impl<E> Clone for Around<E> {
    fn clone(&self) -> Self {
        Around(Arc::clone(&self.0))
    }
}

impl<E> fmt::Debug for Around<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Around")
    }
}

/// Continuation handed to an around callback.
///
/// Consumed by [`Next::run`], so the remainder of the chain runs at most once.
pub struct Next<'a, E> {
    chain: &'a [Around<E>],
    step: &'a mut (dyn FnMut(&mut E) -> Result<(), TransitionError> + 'a),
}

impl<'a, E> Next<'a, E> {
    /// Start a chain: `chain[0]` is outermost, `step` runs innermost.
    pub(crate) fn new(
        chain: &'a [Around<E>],
        step: &'a mut (dyn FnMut(&mut E) -> Result<(), TransitionError> + 'a),
    ) -> Self {
        Self { chain, step }
    }

    /// Proceed with the rest of the chain.
    pub fn run(self, entity: &mut E) -> Result<(), TransitionError> {
        match self.chain.split_first() {
            None => (self.step)(entity),
            Some((around, rest)) => (around.0)(
                entity,
                Next {
                    chain: rest,
                    step: self.step,
                },
            ),
        }
    }
}

/// Validation block. Reports problems into the entity's error collection
/// instead of returning a value.
pub struct Validation<E>(Arc<dyn Fn(&E, &mut Errors) + Send + Sync>);

impl<E> Validation<E> {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&E, &mut Errors) + Send + Sync + 'static,
    {
        Validation(Arc::new(check))
    }

    pub fn run(&self, entity: &E, errors: &mut Errors) {
        (self.0)(entity, errors)
    }
}

impl<E> Clone for Validation<E> {
    fn clone(&self) -> Self {
        Validation(Arc::clone(&self.0))
    }
}

impl<E> fmt::Debug for Validation<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Validation")
    }
}
