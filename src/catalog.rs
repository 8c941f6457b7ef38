//! Catalog retrieval: question text to the best-matching catalog entry.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_store::{SearchResult, VectorStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

/// The single best-scoring catalog entry for a question.
///
/// All metadata fields are plain strings defaulting to empty, so
/// downstream formatting never has to deal with absent values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogMatch {
    pub id: Option<String>,
    pub score: Option<f32>,
    pub brand: String,
    pub model_name: String,
    pub reference_number: String,
    pub description: String,
    pub category: String,
    pub movement: String,
    pub caliber: String,
}

impl From<SearchResult> for CatalogMatch {
    fn from(result: SearchResult) -> Self {
        Self {
            id: Some(result.entry.id.to_string()),
            score: Some(result.score),
            brand: result.entry.brand,
            model_name: result.entry.model_name,
            reference_number: result.entry.reference_number,
            description: result.entry.description,
            category: result.entry.category,
            movement: result.entry.movement,
            caliber: result.entry.caliber,
        }
    }
}

/// Retrieves the closest catalog entry for a question.
///
/// Single-shot best-effort: no retry, no re-ranking. The vector store is
/// trusted to return results in descending similarity order.
pub struct CatalogRetriever {
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn VectorStore>,
    top_k: usize,
}

impl CatalogRetriever {
    /// Create a retriever with the default candidate breadth.
    pub fn new(embedder: Arc<dyn Embedder>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            embedder,
            store,
            top_k: 3,
        }
    }

    /// Set the number of nearest-neighbor candidates fetched per question.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Retrieve the best match for a question, or `None` when the store
    /// has no entries near it.
    ///
    /// Embedding or store failures propagate; without a catalog match
    /// there is nothing truthful to answer from.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn retrieve(&self, question: &str) -> Result<Option<CatalogMatch>> {
        let embedding = self.embedder.embed(question).await?;

        let results = self.store.search(&embedding, self.top_k).await?;
        debug!("Vector store returned {} candidates", results.len());

        Ok(results.into_iter().next().map(CatalogMatch::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UrverkError;
    use crate::vector_store::{CatalogEntry, MemoryVectorStore};
    use async_trait::async_trait;

    struct StubEmbedder {
        embedding: Option<Vec<f32>>,
    }

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            self.embedding
                .clone()
                .ok_or_else(|| UrverkError::Embedding("service unavailable".to_string()))
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            3
        }
    }

    fn entry(brand: &str, model: &str, embedding: Vec<f32>) -> CatalogEntry {
        CatalogEntry::new(
            brand.to_string(),
            model.to_string(),
            "REF".to_string(),
            format!("{} {}", brand, model),
            String::new(),
            String::new(),
            String::new(),
            embedding,
        )
    }

    #[tokio::test]
    async fn test_retrieve_best_match() {
        let store = Arc::new(MemoryVectorStore::new());
        store.upsert(&entry("Rolex", "Submariner", vec![1.0, 0.0, 0.0])).await.unwrap();
        store.upsert(&entry("Omega", "Speedmaster", vec![0.0, 1.0, 0.0])).await.unwrap();

        let retriever = CatalogRetriever::new(
            Arc::new(StubEmbedder { embedding: Some(vec![0.9, 0.1, 0.0]) }),
            store,
        );

        let matched = retriever.retrieve("submariner?").await.unwrap().unwrap();
        assert_eq!(matched.brand, "Rolex");
        assert_eq!(matched.model_name, "Submariner");
        assert!(matched.score.unwrap() > 0.5);
        assert!(matched.id.is_some());
    }

    #[tokio::test]
    async fn test_empty_store_yields_none() {
        let retriever = CatalogRetriever::new(
            Arc::new(StubEmbedder { embedding: Some(vec![1.0, 0.0, 0.0]) }),
            Arc::new(MemoryVectorStore::new()),
        );

        assert!(retriever.retrieve("anything").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_embedding_failure_propagates() {
        let retriever = CatalogRetriever::new(
            Arc::new(StubEmbedder { embedding: None }),
            Arc::new(MemoryVectorStore::new()),
        );

        assert!(retriever.retrieve("anything").await.is_err());
    }
}
