//! Vector store abstraction for Urverk.
//!
//! Provides a trait-based interface for different vector database backends.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::SqliteVectorStore;

use crate::config::Settings;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// A catalog entry stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Unique entry ID.
    pub id: Uuid,
    /// Watch brand (e.g., "Rolex").
    pub brand: String,
    /// Model name (e.g., "Submariner").
    pub model_name: String,
    /// Manufacturer reference number (e.g., "126610LN").
    pub reference_number: String,
    /// Free-text description of the watch.
    pub description: String,
    /// Category (e.g., "diver", "dress", "chronograph").
    pub category: String,
    /// Movement type (e.g., "automatic").
    pub movement: String,
    /// Caliber designation (e.g., "3235").
    pub caliber: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this entry was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl CatalogEntry {
    /// Create a new catalog entry.
    pub fn new(
        brand: String,
        model_name: String,
        reference_number: String,
        description: String,
        category: String,
        movement: String,
        caliber: String,
        embedding: Vec<f32>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            brand,
            model_name,
            reference_number,
            description,
            category,
            movement,
            caliber,
            embedding,
            indexed_at: Utc::now(),
        }
    }

    /// Text representation used to embed this entry.
    pub fn embedding_text(&self) -> String {
        [
            self.brand.as_str(),
            self.model_name.as_str(),
            self.reference_number.as_str(),
            self.category.as_str(),
            self.movement.as_str(),
            self.caliber.as_str(),
            self.description.as_str(),
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
    }

    /// Key identifying the same physical model across re-imports.
    pub fn dedupe_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.brand.trim().to_lowercase(),
            self.model_name.trim().to_lowercase(),
            self.reference_number.trim().to_lowercase()
        )
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched entry.
    pub entry: CatalogEntry,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Summary information about an indexed brand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrandSummary {
    /// Brand name.
    pub brand: String,
    /// Number of indexed entries.
    pub entry_count: u32,
    /// When the brand's newest entry was indexed.
    pub indexed_at: DateTime<Utc>,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Store an entry with its embedding, replacing any entry for the same model.
    async fn upsert(&self, entry: &CatalogEntry) -> Result<()>;

    /// Bulk upsert entries.
    async fn upsert_batch(&self, entries: &[CatalogEntry]) -> Result<usize>;

    /// Search for similar entries.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Search with a minimum similarity threshold.
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>>;

    /// Delete entries by brand.
    async fn delete_by_brand(&self, brand: &str) -> Result<usize>;

    /// List all indexed brands.
    async fn list_brands(&self) -> Result<Vec<BrandSummary>>;

    /// Get total entry count.
    async fn entry_count(&self) -> Result<usize>;
}

/// Open the vector store configured in settings.
pub fn open_store(settings: &Settings) -> Result<Arc<dyn VectorStore>> {
    Ok(match settings.vector_store.provider.as_str() {
        "memory" => Arc::new(MemoryVectorStore::new()),
        _ => Arc::new(SqliteVectorStore::new(&settings.sqlite_path())?),
    })
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_dedupe_key_normalizes() {
        let entry = CatalogEntry::new(
            "Rolex".to_string(),
            " Submariner ".to_string(),
            "126610LN".to_string(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            vec![],
        );
        assert_eq!(entry.dedupe_key(), "rolex|submariner|126610ln");
    }

    #[test]
    fn test_embedding_text_skips_empty_fields() {
        let entry = CatalogEntry::new(
            "Omega".to_string(),
            "Speedmaster".to_string(),
            String::new(),
            "Manual-wind chronograph".to_string(),
            "chronograph".to_string(),
            String::new(),
            String::new(),
            vec![],
        );
        let text = entry.embedding_text();
        assert!(text.starts_with("Omega Speedmaster"));
        assert!(!text.contains("  "));
    }
}
