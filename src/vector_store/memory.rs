//! In-memory vector store implementation.
//!
//! Useful for testing and small catalogs.

use super::{cosine_similarity, BrandSummary, CatalogEntry, SearchResult, VectorStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory vector store, keyed by the entry's dedupe key.
pub struct MemoryVectorStore {
    entries: RwLock<HashMap<String, CatalogEntry>>,
}

impl MemoryVectorStore {
    /// Create a new in-memory vector store.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for MemoryVectorStore {
    async fn upsert(&self, entry: &CatalogEntry) -> Result<()> {
        let mut entries = self.entries.write().unwrap();
        entries.insert(entry.dedupe_key(), entry.clone());
        Ok(())
    }

    async fn upsert_batch(&self, batch: &[CatalogEntry]) -> Result<usize> {
        let mut entries = self.entries.write().unwrap();
        for entry in batch {
            entries.insert(entry.dedupe_key(), entry.clone());
        }
        Ok(batch.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let entries = self.entries.read().unwrap();

        let mut results: Vec<SearchResult> = entries
            .values()
            .map(|entry| {
                let score = cosine_similarity(query_embedding, &entry.embedding);
                SearchResult {
                    entry: entry.clone(),
                    score,
                }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn delete_by_brand(&self, brand: &str) -> Result<usize> {
        let normalized = brand.trim().to_lowercase();
        let mut entries = self.entries.write().unwrap();
        let initial_len = entries.len();
        entries.retain(|_, entry| entry.brand.trim().to_lowercase() != normalized);
        Ok(initial_len - entries.len())
    }

    async fn list_brands(&self) -> Result<Vec<BrandSummary>> {
        let entries = self.entries.read().unwrap();

        let mut brand_map: HashMap<String, BrandSummary> = HashMap::new();

        for entry in entries.values() {
            let summary = brand_map.entry(entry.brand.clone()).or_insert_with(|| {
                BrandSummary {
                    brand: entry.brand.clone(),
                    entry_count: 0,
                    indexed_at: entry.indexed_at,
                }
            });

            summary.entry_count += 1;
            if entry.indexed_at > summary.indexed_at {
                summary.indexed_at = entry.indexed_at;
            }
        }

        let mut brands: Vec<BrandSummary> = brand_map.into_values().collect();
        brands.sort_by(|a, b| a.brand.cmp(&b.brand));

        Ok(brands)
    }

    async fn entry_count(&self) -> Result<usize> {
        let entries = self.entries.read().unwrap();
        Ok(entries.len())
    }
}
