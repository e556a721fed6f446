//! Guard descriptors and their evaluation.
//!
//! Guards are preconditions checked before a transition does anything. They
//! receive the entity by shared reference, so they cannot mutate it.

use super::entity::Stateful;
use crate::executor::TransitionError;
use std::fmt;
use std::sync::Arc;

type Predicate<E> = Arc<dyn Fn(&E) -> bool + Send + Sync>;

/// Precondition attached to a transition.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Guard;
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
/// let guard = Guard::labeled("title present", |post: &Post| !post.title.is_empty());
/// let post = Post { title: "Hello".into(), state: "draft".into(), errors: Errors::default() };
///
/// assert!(guard.evaluate(&post).unwrap());
/// assert_eq!(guard.describe(), "title present");
/// ```
pub enum Guard<E> {
    /// Arbitrary predicate closure.
    Block {
        label: Option<String>,
        predicate: Predicate<E>,
    },
    /// Named predicate method on the entity.
    Method { name: String },
    /// Named predicate supplied by the boolean-attribute collaborator.
    Predicate { name: String },
}

impl<E: Stateful> Guard<E> {
    /// Create an unlabeled block guard.
    pub fn new<F>(predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Guard::Block {
            label: None,
            predicate: Arc::new(predicate),
        }
    }

    /// Create a block guard with a description used in failure reports.
    pub fn labeled<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Guard::Block {
            label: Some(label.into()),
            predicate: Arc::new(predicate),
        }
    }

    /// Guard answered by [`Stateful::call_predicate`] under `name`.
    pub fn method(name: impl Into<String>) -> Self {
        Guard::Method { name: name.into() }
    }

    /// Guard answered by [`Stateful::call_flag`] under `name`.
    pub fn predicate(name: impl Into<String>) -> Self {
        Guard::Predicate { name: name.into() }
    }

    /// Evaluate the guard against an entity.
    ///
    /// Named guards are looked up at call time. A missing method fails with
    /// [`TransitionError::MissingGuardMethod`].
    pub fn evaluate(&self, entity: &E) -> Result<bool, TransitionError> {
        match self {
            Guard::Block { predicate, .. } => Ok(predicate(entity)),
            Guard::Method { name } => {
                entity
                    .call_predicate(name)
                    .ok_or_else(|| TransitionError::MissingGuardMethod {
                        subject_type: E::subject_type(),
                        name: name.clone(),
                        hint: format!("define `{name}` on {}", E::subject_type()),
                    })
            }
            Guard::Predicate { name } => {
                entity
                    .call_flag(name)
                    .ok_or_else(|| TransitionError::MissingGuardMethod {
                        subject_type: E::subject_type(),
                        name: name.clone(),
                        hint: format!(
                            "enable boolean attributes on {} and define the `{name}` predicate there",
                            E::subject_type()
                        ),
                    })
            }
        }
    }

    /// Human-readable description used in diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Guard::Block { label, .. } => label.clone().unwrap_or_else(|| "block".to_string()),
            Guard::Method { name } => format!("method:{name}"),
            Guard::Predicate { name } => format!("predicate:{name}"),
        }
    }
}

impl<E> Clone for Guard<E> {
    fn clone(&self) -> Self {
        match self {
            Guard::Block { label, predicate } => Guard::Block {
                label: label.clone(),
                predicate: Arc::clone(predicate),
            },
            Guard::Method { name } => Guard::Method { name: name.clone() },
            Guard::Predicate { name } => Guard::Predicate { name: name.clone() },
        }
    }
}

impl<E> fmt::Debug for Guard<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Block { label, .. } => f.debug_struct("Block").field("label", label).finish(),
            Guard::Method { name } => f.debug_struct("Method").field("name", name).finish(),
            Guard::Predicate { name } => f.debug_struct("Predicate").field("name", name).finish(),
        }
    }
}
