//! Article Publishing Workflow
//!
//! This example walks an article through draft -> review -> published.
//!
//! Key concepts:
//! - A machine defined once per entity type and shared through `OnceLock`
//! - Guards block an event until the entity is ready
//! - Callbacks run inside the same transaction as the save and audit record
//! - The audit trail is queried per entity after the fact
//!
//! Run with: cargo run --example article_workflow

use statecraft::builder::MachineBuilder;
use statecraft::core::history::path;
use statecraft::core::{BoxError, Errors, HistoryStore, Machine, Metadata, StateName, Stateful};
use statecraft::executor::Transitions;
use statecraft::persistence::MemoryRepository;
use std::sync::OnceLock;

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
            t.guard_method("title_present").after_method("announce")
        })?
        .transition("approve", "review", "published", |t| {
            t.after_method("announce")
        })?
        .transition("reject", "review", "draft", |t| t)?
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

    fn call_predicate(&self, name: &str) -> Option<bool> {
        match name {
            "title_present" => Some(!self.title.is_empty()),
            _ => None,
        }
    }

    fn call_method(&mut self, name: &str) -> Option<Result<(), BoxError>> {
        match name {
            "announce" => {
                println!("  [Notify] Article {} is now {}", self.id, self.state);
                Some(Ok(()))
            }
            _ => None,
        }
    }
}

fn main() {
    println!("=== Article Publishing Workflow ===\n");

    let repository = MemoryRepository::<Article>::new();
    let mut article = Article {
        id: 42,
        title: String::new(),
        state: StateName::from(""),
        errors: Errors::default(),
    };
    article.initialize_state().unwrap();
    repository.insert(&article);

    println!("Article {} starts in '{}'", article.id, article.state);
    println!("Permitted events: {:?}\n", article.permitted_events().unwrap());

    println!("Step 1: Submit without a title");
    match article.fire("submit", &repository) {
        Ok(_) => println!("  unexpected success"),
        Err(err) => println!("  ✗ {err}\n"),
    }

    println!("Step 2: Add a title and submit");
    article.title = "State machines in practice".to_string();
    article.fire("submit", &repository).unwrap();
    println!("  ✓ Now in '{}'\n", article.state);

    println!("Step 3: Approve with reviewer metadata");
    let mut metadata = Metadata::new();
    metadata.insert("reviewer".to_string(), serde_json::json!("editor@example.com"));
    article.fire_with("approve", metadata, &repository).unwrap();
    println!("  ✓ Now in '{}'\n", article.state);

    let table = Article::machine().unwrap().history_table();
    let history = repository.history(table);
    let records = article.transition_history(&*history);
    println!("Audit trail ({} records):", history.len());
    for record in &records {
        println!(
            "  {} : {} -> {} at {}",
            record.event, record.from, record.to, record.created_at
        );
    }
    let states: Vec<&str> = path(&records).into_iter().map(StateName::as_str).collect();
    println!("  Path: {}", states.join(" -> "));

    println!("\n=== Example Complete ===");
}
