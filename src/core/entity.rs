//! Contract between the engine and the host entity.

use super::machine::Machine;
use super::state::StateName;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Boxed error returned by callbacks and host backends.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reference-counted error kept inside engine errors so they stay `Clone`.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Field-level error messages accumulated on an entity.
///
/// Validations write into this collection; the executor clears it before
/// each validation phase.
///
/// # Example
///
/// ```rust
/// use statecraft::core::Errors;
///
/// let mut errors = Errors::default();
/// errors.add("title", "can't be blank");
/// assert_eq!(errors.len(), 1);
/// assert_eq!(errors.full_messages(), vec!["title can't be blank".to_string()]);
///
/// errors.clear();
/// assert!(errors.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Errors {
    messages: BTreeMap<String, Vec<String>>,
}

impl Errors {
    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Drop every message.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// True when no field has a message.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    /// Messages recorded against one field.
    pub fn get(&self, field: &str) -> &[String] {
        self.messages.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All messages, prefixed with their field, in field order.
    pub fn full_messages(&self) -> Vec<String> {
        self.messages
            .iter()
            .flat_map(|(field, messages)| {
                messages
                    .iter()
                    .map(move |message| format!("{field} {message}"))
            })
            .collect()
    }

    /// Fields and their messages, in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.messages
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

/// A host entity driven by a state machine.
///
/// The machine is owned by the entity *type*: implementors usually keep it in
/// a `static OnceLock<Machine<Self>>` and hand out a reference from
/// [`Stateful::machine`]. Types that return `None` are not enabled and every
/// runtime entry point fails with `TransitionError::NotEnabled`.
///
/// Named guards and callbacks are resolved late, at first invocation, through
/// [`Stateful::call_predicate`], [`Stateful::call_flag`] and
/// [`Stateful::call_method`]. Returning `None` means "no such method".
///
/// Concurrent transitions against the same persisted record are not
/// serialized by the engine. Hosts that care implement
/// [`Stateful::lock_version`] so the repository can reject stale writes.
pub trait Stateful: Sized + 'static {
    /// Type name recorded on history records (for example `"Article"`).
    fn subject_type() -> &'static str;

    /// The type-level machine, if this type has compiled one.
    fn machine() -> Option<&'static Machine<Self>> {
        None
    }

    /// Identifier recorded on history records.
    fn subject_id(&self) -> String;

    fn current_state(&self) -> &StateName;

    fn set_current_state(&mut self, state: StateName);

    fn errors(&self) -> &Errors;

    fn errors_mut(&mut self) -> &mut Errors;

    /// Invoke a named zero-argument predicate defined on the entity.
    fn call_predicate(&self, _name: &str) -> Option<bool> {
        None
    }

    /// Invoke a named predicate provided by the boolean-attribute
    /// collaborator.
    fn call_flag(&self, _name: &str) -> Option<bool> {
        None
    }

    /// Invoke a named callback method defined on the entity.
    fn call_method(&mut self, _name: &str) -> Option<Result<(), BoxError>> {
        None
    }

    /// Optimistic-lock version of the persisted record, if tracked.
    fn lock_version(&self) -> Option<u64> {
        None
    }

    fn set_lock_version(&mut self, _version: u64) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_group_messages_by_field() {
        let mut errors = Errors::default();
        errors.add("title", "can't be blank");
        errors.add("title", "is too short");
        errors.add("body", "can't be blank");

        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("title").len(), 2);
        assert!(errors.get("missing").is_empty());
        assert_eq!(
            errors.full_messages(),
            vec![
                "body can't be blank".to_string(),
                "title can't be blank".to_string(),
                "title is too short".to_string(),
            ]
        );
    }

    #[test]
    fn clear_removes_every_field() {
        let mut errors = Errors::default();
        errors.add("base", "stale");
        errors.clear();

        assert!(errors.is_empty());
        assert_eq!(errors.iter().count(), 0);
    }
}
