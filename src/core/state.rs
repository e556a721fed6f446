//! State names.
//!
//! States are opaque, symbol-like identifiers. The engine never interprets
//! them beyond equality, so a thin string newtype is enough.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name of a declared state.
///
/// # Example
///
/// ```rust
/// use statecraft::core::StateName;
///
/// let draft = StateName::from("draft");
/// assert_eq!(draft.as_str(), "draft");
/// assert_eq!(draft, "draft");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateName(String);

impl StateName {
    /// Create a state name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StateName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for StateName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&StateName> for StateName {
    fn from(name: &StateName) -> Self {
        name.clone()
    }
}

impl Borrow<str> for StateName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for StateName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StateName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StateName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One or many source states of a transition.
///
/// Implemented for single names and for slices, arrays and vectors of names,
/// so `from` arguments read naturally at the declaration site.
pub trait IntoSources {
    fn into_sources(self) -> Vec<StateName>;
}

impl IntoSources for &str {
    fn into_sources(self) -> Vec<StateName> {
        vec![StateName::from(self)]
    }
}

impl IntoSources for String {
    fn into_sources(self) -> Vec<StateName> {
        vec![StateName::from(self)]
    }
}

impl IntoSources for StateName {
    fn into_sources(self) -> Vec<StateName> {
        vec![self]
    }
}

impl IntoSources for &[&str] {
    fn into_sources(self) -> Vec<StateName> {
        self.iter().map(|name| StateName::from(*name)).collect()
    }
}

impl<const N: usize> IntoSources for [&str; N] {
    fn into_sources(self) -> Vec<StateName> {
        self.iter().map(|name| StateName::from(*name)).collect()
    }
}

impl IntoSources for Vec<&str> {
    fn into_sources(self) -> Vec<StateName> {
        self.into_iter().map(StateName::from).collect()
    }
}

impl IntoSources for Vec<StateName> {
    fn into_sources(self) -> Vec<StateName> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_name_compares_with_str() {
        let state = StateName::from("review");
        assert_eq!(state, "review");
        assert_ne!(state, "draft");
        assert_eq!(state.as_str(), "review");
        assert_eq!(state.to_string(), "review");
    }

    #[test]
    fn state_name_serializes_as_plain_string() {
        let state = StateName::from("published");
        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, "\"published\"");

        let deserialized: StateName = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }

    #[test]
    fn single_name_is_one_source() {
        assert_eq!("draft".into_sources(), vec![StateName::from("draft")]);
    }

    #[test]
    fn arrays_keep_declaration_order() {
        let sources = ["review", "draft"].into_sources();
        assert_eq!(
            sources,
            vec![StateName::from("review"), StateName::from("draft")]
        );
    }
}
