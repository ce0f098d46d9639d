// ABOUTME: Web search API client used to locate nutrition-fact source pages
// ABOUTME: Queries are restricted to an allow-list of trusted nutrition domains
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Mealsnap Contributors

//! Web Search Client
//!
//! A thin client for an external text-search capability. The nutrition
//! resolver uses it to fetch candidate pages for regex extraction; every
//! query carries the caller's domain allow-list and a result-count hint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::errors::{AppError, AppResult};

/// One search hit: a source URL and the page content the API returned
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Source page URL
    pub url: String,
    /// Extracted page content (plain text)
    pub content: String,
}

/// Search capability consumed by the nutrition resolver
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a text search restricted to the given domains
    ///
    /// Returns hits in the API's relevance order.
    async fn search(
        &self,
        query: &str,
        include_domains: &[&str],
        max_results: u32,
    ) -> AppResult<Vec<SearchHit>>;
}

/// Web search client configuration
#[derive(Debug, Clone)]
pub struct WebSearchConfig {
    /// Search API key
    pub api_key: String,
    /// Search API endpoint
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl WebSearchConfig {
    /// Build from the pipeline-level [`SearchConfig`], if it is usable
    #[must_use]
    pub fn from_pipeline_config(config: &SearchConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            api_key,
            base_url: config.base_url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchRequestBody<'a> {
    api_key: &'a str,
    query: &'a str,
    include_domains: &'a [&'a str],
    max_results: u32,
    include_raw_content: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponseBody {
    results: Vec<SearchResultEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchResultEntry {
    url: Option<String>,
    content: Option<String>,
    #[serde(rename = "raw_content")]
    raw_content: Option<String>,
}

/// HTTP web search client
pub struct WebSearchClient {
    config: WebSearchConfig,
    http_client: reqwest::Client,
}

impl WebSearchClient {
    /// Create a new search client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: WebSearchConfig) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AppError::from)?;
        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl SearchProvider for WebSearchClient {
    async fn search(
        &self,
        query: &str,
        include_domains: &[&str],
        max_results: u32,
    ) -> AppResult<Vec<SearchHit>> {
        if query.is_empty() {
            return Err(AppError::invalid_input("Search query cannot be empty"));
        }

        let body = SearchRequestBody {
            api_key: &self.config.api_key,
            query,
            include_domains,
            max_results,
            include_raw_content: true,
        };

        let response = self
            .http_client
            .post(&self.config.base_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::external_service("search API", e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::external_service(
                "search API",
                format!(
                    "HTTP {}: {}",
                    response.status(),
                    response.text().await.unwrap_or_default()
                ),
            ));
        }

        let parsed: SearchResponseBody = response.json().await.map_err(|e| {
            AppError::external_service("search API", format!("JSON parse error: {e}"))
        })?;

        let hits = parsed
            .results
            .into_iter()
            .filter_map(|entry| {
                let url = entry.url?;
                // Prefer raw page content when the API returned it
                let content = entry.raw_content.or(entry.content)?;
                Some(SearchHit { url, content })
            })
            .collect();

        Ok(hits)
    }
}

/// Mock search client for tests: canned hits or a canned error, plus a call counter
pub struct MockSearchClient {
    outcome: Result<Vec<SearchHit>, String>,
    calls: AtomicUsize,
}

impl MockSearchClient {
    /// A mock returning the given hits on every call
    #[must_use]
    pub fn with_hits(hits: Vec<SearchHit>) -> Self {
        Self {
            outcome: Ok(hits),
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock returning no hits
    #[must_use]
    pub fn empty() -> Self {
        Self::with_hits(Vec::new())
    }

    /// A mock that fails every call
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of searches issued against this mock
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchProvider for MockSearchClient {
    async fn search(
        &self,
        _query: &str,
        _include_domains: &[&str],
        _max_results: u32,
    ) -> AppResult<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Ok(hits) => Ok(hits.clone()),
            Err(message) => Err(AppError::external_service("mock search", message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_counts_calls() {
        let mock = MockSearchClient::empty();
        let _ = mock.search("rice nutrition", &[], 5).await.unwrap();
        let _ = mock.search("rice nutrition", &[], 5).await.unwrap();
        assert_eq!(mock.call_count(), 2);
    }

    #[test]
    fn test_config_from_pipeline_requires_key() {
        let pipeline = SearchConfig {
            enabled: true,
            api_key: None,
            base_url: "https://api.tavily.com/search".into(),
            max_results: 5,
            timeout_secs: 15,
        };
        assert!(WebSearchConfig::from_pipeline_config(&pipeline).is_none());
    }
}
