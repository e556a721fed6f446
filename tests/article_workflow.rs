//! End-to-end publishing workflow: draft -> review -> published.

use statecraft::builder::MachineBuilder;
use statecraft::checkpoint::HistoryCheckpoint;
use statecraft::core::history::path;
use statecraft::core::{Errors, HistoryQuery, HistoryStore, Machine, StateName, Stateful};
use statecraft::executor::{TransitionError, Transitions};
use statecraft::persistence::{MemoryHistory, MemoryRepository};
use std::sync::{Arc, OnceLock};

#[derive(Clone, Debug)]
struct Article {
    id: u64,
    title: String,
    state: StateName,
    errors: Errors,
}

static MACHINE: OnceLock<Machine<Article>> = OnceLock::new();

fn define() -> Result<Machine<Article>, statecraft::ConfigurationError> {
    MachineBuilder::new()
        .initial_state("draft")?
        .state("review")?
        .state("published")?
        .transition("submit", "draft", "review", |t| {
            t.guard_labeled("title present", |a: &Article| !a.title.is_empty())
        })?
        .transition("approve", "review", "published", |t| t)?
        .history_table("article_transitions")?
        .build()
}

impl Stateful for Article {
    fn subject_type() -> &'static str {
        "Article"
    }

    fn machine() -> Option<&'static Machine<Self>> {
        Some(MACHINE.get_or_init(|| define().expect("article machine")))
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
}

fn new_article(id: u64) -> Article {
    let mut article = Article {
        id,
        title: String::new(),
        state: StateName::from(""),
        errors: Errors::default(),
    };
    article.initialize_state().unwrap();
    article
}

#[test]
fn publishing_workflow() {
    let repository = MemoryRepository::new();
    let mut article = new_article(1);
    repository.insert(&article);
    let history = repository.history("article_transitions");

    // Empty title: the guard blocks submission.
    let err = article.fire("submit", &repository).unwrap_err();
    match err {
        TransitionError::CheckFailed { event, guard } => {
            assert_eq!(event, "submit");
            assert_eq!(guard, "title present");
        }
        other => panic!("Expected CheckFailed, got {other:?}"),
    }
    assert_eq!(article.state, "draft");
    assert_eq!(history.len(), 0);

    article.title = "X".to_string();
    article.fire("submit", &repository).unwrap();
    assert_eq!(article.state, "review");
    assert_eq!(repository.find("1").unwrap().state, "review");
    let records = article.transition_history(&*history);
    assert_eq!(records.len(), 1);
    assert_eq!(
        (records[0].event.as_str(), records[0].from.as_str(), records[0].to.as_str()),
        ("submit", "draft", "review")
    );

    article.fire("approve", &repository).unwrap();
    assert_eq!(article.state, "published");
    let records = article.transition_history(&*history);
    assert_eq!(records.len(), 2);
    let latest = records.last().unwrap();
    assert_eq!(
        (latest.event.as_str(), latest.from.as_str(), latest.to.as_str()),
        ("approve", "review", "published")
    );
    assert_eq!(path(&records), vec!["draft", "review", "published"]);

    // No transition named submit starts from published.
    let err = article.fire("submit", &repository).unwrap_err();
    assert!(matches!(err, TransitionError::InvalidTransition { ref from, .. } if from == "published"));
    assert_eq!(article.state, "published");
    assert_eq!(history.len(), 2);
}

#[test]
fn definition_is_shared_per_type() {
    let first = Article::machine().unwrap();
    let second = Article::machine().unwrap();

    assert!(std::ptr::eq(first, second));
    assert_eq!(first.history_table(), "article_transitions");
}

#[test]
fn history_queries_cover_audit_lookups() {
    let repository = MemoryRepository::new();
    let mut first = new_article(10);
    let mut second = new_article(11);
    first.title = "First".to_string();
    second.title = "Second".to_string();

    first.fire("submit", &repository).unwrap();
    second.fire("submit", &repository).unwrap();
    first.fire("approve", &repository).unwrap();

    let history = repository.history("article_transitions");
    assert_eq!(history.for_subject("Article", "10").len(), 2);
    assert_eq!(history.query(&HistoryQuery::new().event("submit")).len(), 2);
    assert_eq!(history.query(&HistoryQuery::new().from("draft")).len(), 2);
    assert_eq!(history.query(&HistoryQuery::new().to("published")).len(), 1);

    let all = history.records();
    let window = HistoryQuery::new()
        .since(all[1].created_at)
        .until(all[2].created_at + chrono::Duration::seconds(1));
    assert!(history.query(&window).len() >= 2);
}

#[test]
fn transitions_on_different_entities_run_in_parallel() {
    let repository = Arc::new(MemoryRepository::<Article>::new());
    let handles: Vec<_> = (100..116)
        .map(|id| {
            let repository = Arc::clone(&repository);
            std::thread::spawn(move || {
                let mut article = new_article(id);
                article.title = format!("Article {id}");
                article.fire("submit", &*repository).unwrap();
                article.fire("approve", &*repository).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let history = repository.history("article_transitions");
    assert_eq!(history.len(), 32);
    for id in 100..116 {
        assert_eq!(repository.find(&id.to_string()).unwrap().state, "published");
        assert_eq!(history.for_subject("Article", &id.to_string()).len(), 2);
    }
}

#[test]
fn audit_trail_survives_checkpoint() {
    let repository = MemoryRepository::new();
    let mut article = new_article(20);
    article.title = "Archived".to_string();
    article.fire("submit", &repository).unwrap();
    article.fire("approve", &repository).unwrap();

    let history = repository.history("article_transitions");
    let bytes = HistoryCheckpoint::capture("article_transitions", &*history)
        .to_bytes()
        .unwrap();

    let archive = MemoryHistory::new();
    HistoryCheckpoint::from_bytes(&bytes)
        .unwrap()
        .restore_into(&archive)
        .unwrap();
    assert_eq!(article.transition_history(&archive), history.records());
}
