//! DuckDuckGo Instant Answer search.
//!
//! Uses the [DuckDuckGo Instant Answer API](https://api.duckduckgo.com/),
//! which needs no API key and returns abstracts, answers, definitions and
//! related topics rather than a full result listing. Each populated section
//! becomes one [`SearchResult`].

use async_trait::async_trait;
use council_application::ports::knowledge_search::{KnowledgeSearch, SearchError, SearchResult};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";
const USER_AGENT: &str = "AgentCouncil/0.4 (Knowledge Search)";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new() -> Result<Self, SearchError> {
        Self::with_endpoint(DDG_API_URL, DEFAULT_TIMEOUT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| SearchError::RequestFailed(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl KnowledgeSearch for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>, SearchError> {
        let query = query.trim();
        if query.is_empty() || max_results == 0 {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SearchError::Timeout
                } else {
                    SearchError::RequestFailed(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            return Err(SearchError::RequestFailed(format!(
                "search API returned {}",
                response.status()
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SearchError::ParseFailed(e.to_string()))?;
        let results = parse_instant_answer(query, &body, max_results);
        debug!("Search '{}' returned {} results", query, results.len());
        Ok(results)
    }
}

fn text<'a>(data: &'a Value, key: &str) -> Option<&'a str> {
    data[key].as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// Turn an Instant Answer body into results, most authoritative first:
/// abstract, answer, definition, then related topics (nested groups flattened).
fn parse_instant_answer(query: &str, data: &Value, max_results: usize) -> Vec<SearchResult> {
    let mut results = Vec::new();

    if let Some(abstract_text) = text(data, "AbstractText") {
        results.push(SearchResult {
            title: text(data, "Heading")
                .or_else(|| text(data, "AbstractSource"))
                .unwrap_or(query)
                .to_string(),
            url: text(data, "AbstractURL").unwrap_or_default().to_string(),
            snippet: abstract_text.to_string(),
        });
    }

    if let Some(answer) = text(data, "Answer") {
        results.push(SearchResult {
            title: format!("Instant answer: {query}"),
            url: String::new(),
            snippet: answer.to_string(),
        });
    }

    if let Some(definition) = text(data, "Definition") {
        results.push(SearchResult {
            title: format!(
                "Definition ({})",
                text(data, "DefinitionSource").unwrap_or("unknown source")
            ),
            url: text(data, "DefinitionURL").unwrap_or_default().to_string(),
            snippet: definition.to_string(),
        });
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        let flattened = topics.iter().flat_map(|topic| match topic["Topics"].as_array() {
            Some(group) => group.iter().collect::<Vec<_>>(),
            None => vec![topic],
        });
        for topic in flattened {
            let Some(snippet) = text(topic, "Text") else {
                continue;
            };
            // Topic text reads "Title - description"; keep the head as the title
            let title = snippet.split(" - ").next().unwrap_or(snippet);
            results.push(SearchResult {
                title: title.to_string(),
                url: text(topic, "FirstURL").unwrap_or_default().to_string(),
                snippet: snippet.to_string(),
            });
        }
    }

    results.truncate(max_results);
    results
}
