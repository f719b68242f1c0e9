use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

mod chat;
pub mod classify;
pub mod local;
pub mod openai;
pub mod prompts;
pub mod router;
pub mod settings;

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Which provider operation is being routed. Fixed at call time; drives the
/// (primary, secondary) ordering inside the router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Summarize,
    ExtractTasks,
    SuggestTerms,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Summarize => "summarize",
            OperationKind::ExtractTasks => "extract_tasks",
            OperationKind::SuggestTerms => "suggest_terms",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSuggestion {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: String,
}

/// One upstream text-generation backend. Both providers implement the same
/// three operations; errors are plain strings so the router can classify them
/// by content.
pub trait AiProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn summarize<'a>(&'a self, text: &'a str) -> ProviderFuture<'a, Result<String, String>>;

    fn extract_tasks<'a>(
        &'a self,
        text: &'a str,
    ) -> ProviderFuture<'a, Result<Vec<TaskSuggestion>, String>>;

    fn suggest_related_terms<'a>(
        &'a self,
        term: &'a str,
    ) -> ProviderFuture<'a, Result<Vec<String>, String>>;
}
