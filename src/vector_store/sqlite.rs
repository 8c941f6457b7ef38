//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For production use cases with large catalogs, consider using sqlite-vec
//! extension or a dedicated vector database.

use super::{cosine_similarity, BrandSummary, CatalogEntry, SearchResult, VectorStore};
use crate::error::{Result, UrverkError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, instrument};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS entries (
        id TEXT PRIMARY KEY,
        dedupe_key TEXT NOT NULL UNIQUE,
        brand TEXT NOT NULL,
        model_name TEXT NOT NULL,
        reference_number TEXT NOT NULL,
        description TEXT NOT NULL,
        category TEXT NOT NULL,
        movement TEXT NOT NULL,
        caliber TEXT NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_entries_brand ON entries(brand);
    CREATE INDEX IF NOT EXISTS idx_entries_indexed_at ON entries(indexed_at);
"#;

/// SQLite-based vector store.
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create a new SQLite vector store.
    #[instrument(skip_all)]
    pub fn new(path: &Path) -> Result<Self> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized SQLite vector store at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite vector store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding
            .iter()
            .flat_map(|f| f.to_le_bytes())
            .collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| {
                let arr: [u8; 4] = chunk.try_into().unwrap_or_default();
                f32::from_le_bytes(arr)
            })
            .collect()
    }

    fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CatalogEntry> {
        let id_str: String = row.get(0)?;
        let embedding_bytes: Vec<u8> = row.get(8)?;
        let indexed_at_str: String = row.get(9)?;

        Ok(CatalogEntry {
            id: uuid::Uuid::parse_str(&id_str).unwrap_or_default(),
            brand: row.get(1)?,
            model_name: row.get(2)?,
            reference_number: row.get(3)?,
            description: row.get(4)?,
            category: row.get(5)?,
            movement: row.get(6)?,
            caliber: row.get(7)?,
            embedding: Self::bytes_to_embedding(&embedding_bytes),
            indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}

const UPSERT_SQL: &str = r#"
    INSERT OR REPLACE INTO entries
    (id, dedupe_key, brand, model_name, reference_number, description,
     category, movement, caliber, embedding, indexed_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT id, brand, model_name, reference_number, description,
           category, movement, caliber, embedding, indexed_at
    FROM entries
"#;

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip(self, entry))]
    async fn upsert(&self, entry: &CatalogEntry) -> Result<()> {
        let conn = self.conn.lock().map_err(|e| {
            UrverkError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        conn.execute(
            UPSERT_SQL,
            params![
                entry.id.to_string(),
                entry.dedupe_key(),
                entry.brand,
                entry.model_name,
                entry.reference_number,
                entry.description,
                entry.category,
                entry.movement,
                entry.caliber,
                Self::embedding_to_bytes(&entry.embedding),
                entry.indexed_at.to_rfc3339(),
            ],
        )?;

        debug!("Upserted entry {}", entry.id);
        Ok(())
    }

    #[instrument(skip(self, entries))]
    async fn upsert_batch(&self, entries: &[CatalogEntry]) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            UrverkError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let tx = conn.unchecked_transaction()?;

        for entry in entries {
            tx.execute(
                UPSERT_SQL,
                params![
                    entry.id.to_string(),
                    entry.dedupe_key(),
                    entry.brand,
                    entry.model_name,
                    entry.reference_number,
                    entry.description,
                    entry.category,
                    entry.movement,
                    entry.caliber,
                    Self::embedding_to_bytes(&entry.embedding),
                    entry.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        info!("Batch upserted {} entries", entries.len());
        Ok(entries.len())
    }

    #[instrument(skip(self, query_embedding))]
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query_embedding, limit, 0.0).await
    }

    #[instrument(skip(self, query_embedding))]
    async fn search_with_threshold(
        &self,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        let conn = self.conn.lock().map_err(|e| {
            UrverkError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(SELECT_COLUMNS)?;
        let entries = stmt.query_map([], Self::row_to_entry)?;

        let mut results: Vec<SearchResult> = entries
            .filter_map(|entry_result| entry_result.ok())
            .map(|entry| {
                let score = cosine_similarity(query_embedding, &entry.embedding);
                SearchResult { entry, score }
            })
            .filter(|r| r.score >= min_score)
            .collect();

        // Sort by score descending
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        debug!("Found {} matching entries", results.len());
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn delete_by_brand(&self, brand: &str) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            UrverkError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let deleted = conn.execute(
            "DELETE FROM entries WHERE lower(trim(brand)) = lower(trim(?1))",
            params![brand],
        )?;

        info!("Deleted {} entries for brand {}", deleted, brand);
        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn list_brands(&self) -> Result<Vec<BrandSummary>> {
        let conn = self.conn.lock().map_err(|e| {
            UrverkError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let mut stmt = conn.prepare(
            r#"
            SELECT brand, COUNT(*) as entry_count, MAX(indexed_at) as indexed_at
            FROM entries
            GROUP BY brand
            ORDER BY brand
            "#,
        )?;

        let brands = stmt.query_map([], |row| {
            let indexed_at_str: String = row.get(2)?;
            Ok(BrandSummary {
                brand: row.get(0)?,
                entry_count: row.get(1)?,
                indexed_at: DateTime::parse_from_rfc3339(&indexed_at_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now()),
            })
        })?;

        let result: Vec<BrandSummary> = brands.filter_map(|b| b.ok()).collect();
        Ok(result)
    }

    async fn entry_count(&self) -> Result<usize> {
        let conn = self.conn.lock().map_err(|e| {
            UrverkError::VectorStore(format!("Failed to acquire lock: {}", e))
        })?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(brand: &str, model: &str, reference: &str, embedding: Vec<f32>) -> CatalogEntry {
        CatalogEntry::new(
            brand.to_string(),
            model.to_string(),
            reference.to_string(),
            "A test watch".to_string(),
            "diver".to_string(),
            "automatic".to_string(),
            "3235".to_string(),
            embedding,
        )
    }

    #[tokio::test]
    async fn test_sqlite_vector_store() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(&entry("Rolex", "Submariner", "126610LN", vec![1.0, 0.0, 0.0]))
            .await
            .unwrap();

        let brands = store.list_brands().await.unwrap();
        assert_eq!(brands.len(), 1);
        assert_eq!(brands[0].brand, "Rolex");

        let results = store.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!((results[0].score - 1.0).abs() < 0.001);
        assert_eq!(results[0].entry.reference_number, "126610LN");

        let deleted = store.delete_by_brand("Rolex").await.unwrap();
        assert_eq!(deleted, 1);

        let brands = store.list_brands().await.unwrap();
        assert!(brands.is_empty());
    }

    #[tokio::test]
    async fn test_reimport_replaces_entry() {
        let store = SqliteVectorStore::in_memory().unwrap();

        store
            .upsert(&entry("Rolex", "Submariner", "126610LN", vec![1.0, 0.0]))
            .await
            .unwrap();
        store
            .upsert(&entry("ROLEX", "submariner", "126610ln", vec![0.0, 1.0]))
            .await
            .unwrap();

        assert_eq!(store.entry_count().await.unwrap(), 1);

        let results = store.search(&[0.0, 1.0], 1).await.unwrap();
        assert!((results[0].score - 1.0).abs() < 0.001);
    }

    #[tokio::test]
    async fn test_on_disk_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let store = SqliteVectorStore::new(&path).unwrap();
            store
                .upsert(&entry("Omega", "Speedmaster", "310.30.42", vec![0.5, 0.5]))
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::new(&path).unwrap();
        assert_eq!(store.entry_count().await.unwrap(), 1);
    }
}
