//! Transition history records and queries.
//!
//! A [`TransitionRecord`] is the persisted audit fact for one completed
//! transition. Records are append-only: the engine creates exactly one per
//! successful attempt and never updates or deletes them.

use super::state::StateName;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form metadata stored alongside a transition.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Table name used when a machine does not override it.
pub const DEFAULT_HISTORY_TABLE: &str = "state_transitions";

/// Record of a single executed transition.
///
/// # Example
///
/// ```rust
/// use statecraft::core::{Metadata, TransitionRecord};
///
/// let record = TransitionRecord::new(
///     "Article",
///     "42",
///     "submit",
///     "draft".into(),
///     "review".into(),
///     Metadata::new(),
/// );
///
/// assert_eq!(record.event, "submit");
/// assert_eq!(record.from, "draft");
/// assert_eq!(record.to, "review");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub id: Uuid,
    pub subject_type: String,
    pub subject_id: String,
    pub event: String,
    pub from: StateName,
    pub to: StateName,
    #[serde(default)]
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

impl TransitionRecord {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(
        subject_type: impl Into<String>,
        subject_id: impl Into<String>,
        event: impl Into<String>,
        from: StateName,
        to: StateName,
        metadata: Metadata,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject_type: subject_type.into(),
            subject_id: subject_id.into(),
            event: event.into(),
            from,
            to,
            metadata,
            created_at: Utc::now(),
        }
    }
}

/// Filter over transition records. Unset fields match everything.
///
/// # Example
///
/// ```rust
/// use statecraft::core::HistoryQuery;
///
/// let query = HistoryQuery::new()
///     .subject("Article", "42")
///     .event("publish");
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryQuery {
    subject: Option<(String, String)>,
    event: Option<String>,
    from: Option<StateName>,
    to: Option<StateName>,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
}

impl HistoryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to one subject.
    pub fn subject(mut self, subject_type: impl Into<String>, subject_id: impl Into<String>) -> Self {
        self.subject = Some((subject_type.into(), subject_id.into()));
        self
    }

    pub fn event(mut self, event: impl Into<String>) -> Self {
        self.event = Some(event.into());
        self
    }

    /// Transitions that left this state.
    pub fn from(mut self, state: impl Into<StateName>) -> Self {
        self.from = Some(state.into());
        self
    }

    /// Transitions that entered this state.
    pub fn to(mut self, state: impl Into<StateName>) -> Self {
        self.to = Some(state.into());
        self
    }

    /// Created at or after this instant.
    pub fn since(mut self, at: DateTime<Utc>) -> Self {
        self.since = Some(at);
        self
    }

    /// Created strictly before this instant.
    pub fn until(mut self, at: DateTime<Utc>) -> Self {
        self.until = Some(at);
        self
    }

    pub(crate) fn subject_key(&self) -> Option<(&str, &str)> {
        self.subject
            .as_ref()
            .map(|(subject_type, id)| (subject_type.as_str(), id.as_str()))
    }

    /// Check a record against every set criterion.
    pub fn matches(&self, record: &TransitionRecord) -> bool {
        self.subject.as_ref().is_none_or(|(subject_type, id)| {
            record.subject_type == *subject_type && record.subject_id == *id
        }) && self.event.as_ref().is_none_or(|event| record.event == *event)
            && self.from.as_ref().is_none_or(|from| record.from == *from)
            && self.to.as_ref().is_none_or(|to| record.to == *to)
            && self.since.is_none_or(|since| record.created_at >= since)
            && self.until.is_none_or(|until| record.created_at < until)
    }
}

/// Append-only store of transition records.
///
/// Implementations must accept concurrent appends from independent
/// transactions without a store-wide lock.
pub trait HistoryStore: Send + Sync {
    fn append(&self, record: TransitionRecord);

    /// Records matching `query`, in insertion order.
    fn query(&self, query: &HistoryQuery) -> Vec<TransitionRecord>;

    /// Number of stored records.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All records for one subject, oldest first.
    fn for_subject(&self, subject_type: &str, subject_id: &str) -> Vec<TransitionRecord> {
        self.query(&HistoryQuery::new().subject(subject_type, subject_id))
    }
}

/// States traversed by an ordered run of records: the first `from`, then
/// each `to`.
pub fn path(records: &[TransitionRecord]) -> Vec<&StateName> {
    let mut path = Vec::new();
    if let Some(first) = records.first() {
        path.push(&first.from);
    }
    for record in records {
        path.push(&record.to);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(event: &str, from: &str, to: &str) -> TransitionRecord {
        TransitionRecord::new("Article", "1", event, from.into(), to.into(), Metadata::new())
    }

    #[test]
    fn new_record_has_unique_id() {
        let a = record("submit", "draft", "review");
        let b = record("submit", "draft", "review");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_query_matches_everything() {
        assert!(HistoryQuery::new().matches(&record("submit", "draft", "review")));
    }

    #[test]
    fn query_filters_by_each_field() {
        let submit = record("submit", "draft", "review");

        assert!(HistoryQuery::new().subject("Article", "1").matches(&submit));
        assert!(!HistoryQuery::new().subject("Article", "2").matches(&submit));
        assert!(!HistoryQuery::new().subject("Page", "1").matches(&submit));
        assert!(HistoryQuery::new().event("submit").matches(&submit));
        assert!(!HistoryQuery::new().event("approve").matches(&submit));
        assert!(HistoryQuery::new().from("draft").matches(&submit));
        assert!(!HistoryQuery::new().from("review").matches(&submit));
        assert!(HistoryQuery::new().to("review").matches(&submit));
        assert!(!HistoryQuery::new().to("published").matches(&submit));
    }

    #[test]
    fn query_time_window_is_half_open() {
        let submit = record("submit", "draft", "review");
        let at = submit.created_at;

        assert!(HistoryQuery::new().since(at).matches(&submit));
        assert!(!HistoryQuery::new().until(at).matches(&submit));
        assert!(HistoryQuery::new()
            .since(at - chrono::Duration::seconds(1))
            .until(at + chrono::Duration::seconds(1))
            .matches(&submit));
    }

    #[test]
    fn path_follows_records() {
        let records = vec![
            record("submit", "draft", "review"),
            record("approve", "review", "published"),
        ];

        let path = path(&records);
        assert_eq!(path, vec!["draft", "review", "published"]);
        assert!(super::path(&[]).is_empty());
    }

    #[test]
    fn record_serializes_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("actor".to_string(), json!("editor@example.com"));
        let record = TransitionRecord::new(
            "Article",
            "1",
            "publish",
            "review".into(),
            "published".into(),
            metadata,
        );

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["metadata"]["actor"], "editor@example.com");
        assert_eq!(json["from"], "review");

        let back: TransitionRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
