//! Shared entity used by unit tests.

use crate::builder::MachineBuilder;
use crate::core::{BoxError, Errors, Machine, StateName, Stateful};

#[derive(Clone, Debug)]
pub(crate) struct Article {
    pub id: u64,
    pub title: String,
    pub state: StateName,
    pub errors: Errors,
    pub featured: bool,
    pub version: Option<u64>,
    pub log: Vec<String>,
}

impl Article {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            title: String::new(),
            state: StateName::from("draft"),
            errors: Errors::default(),
            featured: false,
            version: None,
            log: Vec::new(),
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }
}

impl Stateful for Article {
    fn subject_type() -> &'static str {
        "Article"
    }

    fn subject_id(&self) -> String {
        self.id.to_string()
    }

    fn current_state(&self) -> &StateName {
        &self.state
    }

    fn set_current_state(&mut self, state: StateName) {
        self.state = state;
    }

    fn errors(&self) -> &Errors {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    fn call_predicate(&self, name: &str) -> Option<bool> {
        match name {
            "title_present" => Some(!self.title.is_empty()),
            _ => None,
        }
    }

    fn call_flag(&self, name: &str) -> Option<bool> {
        match name {
            "featured" => Some(self.featured),
            _ => None,
        }
    }

    fn call_method(&mut self, name: &str) -> Option<Result<(), BoxError>> {
        match name {
            "notify" => {
                self.log.push("notify".to_string());
                Some(Ok(()))
            }
            "explode" => Some(Err("boom".into())),
            _ => None,
        }
    }

    fn lock_version(&self) -> Option<u64> {
        self.version
    }

    fn set_lock_version(&mut self, version: u64) {
        self.version = Some(version);
    }
}

/// draft* -> review -> published, with reject back to draft.
pub(crate) fn article_machine() -> Machine<Article> {
    MachineBuilder::new()
        .initial_state("draft")
        .and_then(|b| b.state("review"))
        .and_then(|b| b.state("published"))
        .and_then(|b| b.transition("submit", "draft", "review", |t| t.guard_method("title_present")))
        .and_then(|b| b.transition("approve", "review", "published", |t| t))
        .and_then(|b| b.transition("reject", ["review"], "draft", |t| t))
        .and_then(|b| b.build())
        .expect("article machine definition")
}
