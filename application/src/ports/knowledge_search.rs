//! Knowledge search port
//!
//! External lookup used by the research action to verify time-sensitive
//! claims before agents rely on them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Could not parse search results: {0}")]
    ParseFailed(String),

    #[error("Search timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

impl SearchResult {
    /// One-line rendering for prompts and memories
    pub fn summary(&self) -> String {
        if self.snippet.is_empty() {
            format!("{} ({})", self.title, self.url)
        } else {
            format!("{}: {} ({})", self.title, self.snippet, self.url)
        }
    }
}

#[async_trait]
pub trait KnowledgeSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize)
    -> Result<Vec<SearchResult>, SearchError>;
}

/// Search backend that never finds anything
pub struct NoKnowledgeSearch;

#[async_trait]
impl KnowledgeSearch for NoKnowledgeSearch {
    async fn search(
        &self,
        _query: &str,
        _max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        Ok(Vec::new())
    }
}
