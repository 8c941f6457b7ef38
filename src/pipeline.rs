//! Query resolution pipeline.
//!
//! Composes intent classification, catalog retrieval and live price
//! resolution into a single request/response cycle. Retrieval failures
//! are fatal to the request; price resolution failures degrade to a
//! catalog-only answer.

use crate::catalog::{CatalogMatch, CatalogRetriever};
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, UrverkError};
use crate::intent;
use crate::pricing::{
    HttpSearchProvider, LivePriceResolver, PriceCache, ResolvedPrice, SearchProvider,
};
use crate::vector_store::{open_store, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

/// Message returned when the vector store has no entry for the question.
const NO_MATCH_MESSAGE: &str =
    "I couldn't find a matching watch in the catalog for that question.";

/// Answer to a single question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// Human-readable answer text, always non-empty.
    pub answer: String,
    /// Normalized catalog match, when one was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CatalogMatch>,
    /// Evidence for a resolved live price.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<Provenance>,
}

/// Where a resolved price came from and the exact text it was read from.
#[derive(Debug, Clone, Serialize)]
pub struct Provenance {
    pub source: Option<String>,
    pub raw: String,
}

/// The top-level query pipeline.
pub struct QueryPipeline {
    retriever: CatalogRetriever,
    resolver: LivePriceResolver,
}

impl QueryPipeline {
    /// Create a pipeline with default components from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::with_config(
            &settings.embedding.model,
            settings.embedding.dimensions as usize,
        ));

        let store = open_store(settings)?;

        let provider: Arc<dyn SearchProvider> =
            Arc::new(HttpSearchProvider::from_settings(&settings.live_price)?);

        Ok(Self::with_components(settings, embedder, store, provider))
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: &Settings,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        provider: Arc<dyn SearchProvider>,
    ) -> Self {
        let retriever =
            CatalogRetriever::new(embedder, store).with_top_k(settings.retrieval.top_k);

        let cache = PriceCache::new(
            Duration::from_secs(settings.live_price.cache_ttl_seconds),
            settings.live_price.cache_capacity,
        );
        let resolver = LivePriceResolver::new(provider, cache);

        Self {
            retriever,
            resolver,
        }
    }

    /// Answer a single question.
    ///
    /// Empty questions are rejected before any collaborator is called.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        if question.trim().is_empty() {
            return Err(UrverkError::InvalidInput(
                "Question must not be empty".to_string(),
            ));
        }

        let Some(matched) = self.retriever.retrieve(question).await? else {
            return Ok(Answer {
                answer: NO_MATCH_MESSAGE.to_string(),
                metadata: None,
                provenance: Vec::new(),
            });
        };

        let intent = intent::classify(question);
        info!(
            "Matched {} {} (live price: {})",
            matched.brand, matched.model_name, intent.needs_live_price
        );

        if !intent.needs_live_price {
            return Ok(Answer {
                answer: describe(&matched),
                metadata: Some(matched),
                provenance: Vec::new(),
            });
        }

        match self
            .resolver
            .resolve(&matched.brand, &matched.model_name, &matched.reference_number)
            .await
        {
            Some(price) => {
                let answer = price_message(&matched, &price);
                let provenance = vec![Provenance {
                    source: price.source.clone(),
                    raw: price.raw.clone(),
                }];
                Ok(Answer {
                    answer,
                    metadata: Some(matched),
                    provenance,
                })
            }
            None => Ok(Answer {
                answer: format!(
                    "{} I couldn't fetch a live market price right now.",
                    describe(&matched)
                ),
                metadata: Some(matched),
                provenance: Vec::new(),
            }),
        }
    }
}

/// Short display name for a match: brand, model, reference.
fn display_name(matched: &CatalogMatch) -> String {
    let mut name = [matched.brand.as_str(), matched.model_name.as_str()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        name = "matched watch".to_string();
    }

    if !matched.reference_number.is_empty() {
        name.push_str(&format!(" (ref. {})", matched.reference_number));
    }

    name
}

/// Catalog-only answer text.
fn describe(matched: &CatalogMatch) -> String {
    let name = display_name(matched);

    if matched.description.is_empty() {
        format!("The {} is in the catalog.", name)
    } else {
        format!("The {}: {}", name, matched.description)
    }
}

/// Price-bearing answer text.
fn price_message(matched: &CatalogMatch, price: &ResolvedPrice) -> String {
    let amount = match (price.value, price.currency.as_deref()) {
        (Some(value), Some(currency)) => format!("{} {}", currency, format_amount(value)),
        (Some(value), None) => format_amount(value),
        _ => price.raw.clone(),
    };

    let mut message = format!(
        "The {} is currently listed around {}",
        display_name(matched),
        amount
    );

    if let Some(source) = &price.source {
        message.push_str(&format!(" ({})", source));
    }

    message.push_str(&format!(
        ", as of {}.",
        price.resolved_at.format("%Y-%m-%d %H:%M UTC")
    ));

    message
}

fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::{SearchHit, SearchOutcome};
    use crate::vector_store::{CatalogEntry, MemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEmbedder {
        embedding: Vec<f32>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.embedding.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            Ok(texts.iter().map(|_| self.embedding.clone()).collect())
        }

        fn dimensions(&self) -> usize {
            self.embedding.len()
        }
    }

    struct StubProvider {
        outcome: crate::error::Result<SearchOutcome>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl SearchProvider for StubProvider {
        async fn search(&self, _query: &str) -> Result<SearchOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.outcome {
                Ok(outcome) => Ok(outcome.clone()),
                Err(_) => Err(UrverkError::Search("network unreachable".to_string())),
            }
        }

        fn label(&self) -> &str {
            "stub"
        }
    }

    fn listing_outcome() -> SearchOutcome {
        SearchOutcome {
            price: None,
            results: vec![SearchHit {
                title: Some("Rolex Submariner 126610LN".to_string()),
                snippet: Some("Mint, listed at $9,500 on Chrono24".to_string()),
                summary: None,
                url: Some("https://chrono24.com/listing/1".to_string()),
                price: None,
            }],
            answer: None,
        }
    }

    async fn pipeline_with(
        entries: Vec<CatalogEntry>,
        outcome: Result<SearchOutcome>,
    ) -> (QueryPipeline, Arc<StubEmbedder>, Arc<StubProvider>) {
        let store = Arc::new(MemoryVectorStore::new());
        store.upsert_batch(&entries).await.unwrap();

        let embedder = Arc::new(StubEmbedder {
            embedding: vec![1.0, 0.0, 0.0],
            calls: AtomicUsize::new(0),
        });
        let provider = Arc::new(StubProvider {
            outcome,
            calls: AtomicUsize::new(0),
        });

        let pipeline = QueryPipeline::with_components(
            &Settings::default(),
            embedder.clone(),
            store,
            provider.clone(),
        );

        (pipeline, embedder, provider)
    }

    fn submariner() -> CatalogEntry {
        CatalogEntry::new(
            "Rolex".to_string(),
            "Submariner".to_string(),
            "126610LN".to_string(),
            "Iconic dive watch with a unidirectional ceramic bezel.".to_string(),
            "diver".to_string(),
            "automatic".to_string(),
            "3235".to_string(),
            vec![1.0, 0.0, 0.0],
        )
    }

    #[tokio::test]
    async fn test_empty_question_is_client_error() {
        let (pipeline, embedder, provider) =
            pipeline_with(vec![submariner()], Ok(listing_outcome())).await;

        let err = pipeline.answer("   ").await.unwrap_err();
        assert!(matches!(err, UrverkError::InvalidInput(_)));

        // No collaborator was invoked.
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_match_skips_price_resolution() {
        let (pipeline, _, provider) = pipeline_with(vec![], Ok(listing_outcome())).await;

        let answer = pipeline
            .answer("What's the Submariner selling for right now?")
            .await
            .unwrap();

        assert_eq!(answer.answer, NO_MATCH_MESSAGE);
        assert!(answer.metadata.is_none());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_catalog_only_answer() {
        let (pipeline, _, provider) =
            pipeline_with(vec![submariner()], Ok(listing_outcome())).await;

        let answer = pipeline
            .answer("What movement does the Submariner use?")
            .await
            .unwrap();

        assert!(answer.answer.contains("Rolex Submariner"));
        assert!(answer.answer.contains("ceramic bezel"));
        assert!(answer.provenance.is_empty());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let metadata = answer.metadata.unwrap();
        assert_eq!(metadata.caliber, "3235");
    }

    #[tokio::test]
    async fn test_price_answer_with_provenance() {
        let (pipeline, _, _) = pipeline_with(vec![submariner()], Ok(listing_outcome())).await;

        let answer = pipeline
            .answer("What's the Submariner selling for right now?")
            .await
            .unwrap();

        assert!(answer.answer.contains("$ 9500"));
        assert!(answer.answer.contains("https://chrono24.com/listing/1"));
        assert_eq!(answer.provenance.len(), 1);
        assert_eq!(answer.provenance[0].raw, "$ 9,500");
        assert_eq!(
            answer.provenance[0].source.as_deref(),
            Some("https://chrono24.com/listing/1")
        );
    }

    #[tokio::test]
    async fn test_provider_failure_degrades_gracefully() {
        let (pipeline, _, provider) = pipeline_with(
            vec![submariner()],
            Err(UrverkError::Search("network unreachable".to_string())),
        )
        .await;

        let answer = pipeline
            .answer("How much is the Submariner?")
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(answer.answer.contains("ceramic bezel"));
        assert!(answer.answer.contains("couldn't fetch a live market price"));
        assert!(answer.provenance.is_empty());
    }
}
