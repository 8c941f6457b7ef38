//! Web search provider abstraction.
//!
//! The resolver only depends on the `SearchProvider` trait; the shipped
//! implementation is a JSON-over-HTTP client for search APIs that
//! respond with an optional structured price, a ranked result list, and
//! an optional free-text answer.

use crate::config::LivePriceSettings;
use crate::error::{Result, UrverkError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// A provider response, in decreasing order of structure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchOutcome {
    /// Structured price at the top level of the response, when the
    /// provider resolved one itself.
    #[serde(default)]
    pub price: Option<StructuredPrice>,
    /// Ranked results, best first.
    #[serde(default)]
    pub results: Vec<SearchHit>,
    /// Free-text answer synthesized by the provider.
    #[serde(default)]
    pub answer: Option<String>,
}

/// An explicit price field in a provider response.
#[derive(Debug, Clone, Deserialize)]
pub struct StructuredPrice {
    pub value: f64,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

/// A single ranked search result.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "content")]
    pub snippet: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub price: Option<StructuredPrice>,
}

impl SearchHit {
    /// All free text carried by this hit, concatenated for parsing.
    pub fn combined_text(&self) -> String {
        [&self.title, &self.snippet, &self.summary]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Trait for web search providers.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run a free-text search and return the provider's response.
    async fn search(&self, query: &str) -> Result<SearchOutcome>;

    /// Identifier used as the source label when a candidate carries no URL.
    fn label(&self) -> &str;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
    max_results: usize,
}

/// JSON-over-HTTP search provider.
pub struct HttpSearchProvider {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    max_results: usize,
    label: String,
}

impl HttpSearchProvider {
    /// Create a provider for the given endpoint.
    ///
    /// The client carries an explicit request timeout so a slow provider
    /// cannot stall a request indefinitely.
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        timeout: Duration,
        max_results: usize,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UrverkError::Search(format!("Failed to create HTTP client: {}", e)))?;

        let label = Url::parse(endpoint)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| "web-search".to_string());

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
            max_results,
            label,
        })
    }

    /// Create a provider from settings, reading the API key from the
    /// configured environment variable.
    pub fn from_settings(settings: &LivePriceSettings) -> Result<Self> {
        let api_key = std::env::var(&settings.api_key_env).ok().filter(|k| !k.is_empty());
        Self::new(
            &settings.endpoint,
            api_key,
            Duration::from_secs(settings.timeout_seconds),
            settings.max_results,
        )
    }
}

#[async_trait]
impl SearchProvider for HttpSearchProvider {
    async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let request = SearchRequest {
            query,
            api_key: self.api_key.as_deref(),
            max_results: self.max_results,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UrverkError::Search(format!(
                "Search API error: {} - {}",
                status, body
            )));
        }

        let outcome: SearchOutcome = response.json().await?;
        Ok(outcome)
    }

    fn label(&self) -> &str {
        &self.label
    }
}
