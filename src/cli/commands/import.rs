//! Import command implementation.
//!
//! Reads a JSON catalog file, embeds each entry's searchable text and
//! indexes the result in the vector store.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::vector_store::{open_store, CatalogEntry};
use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeSet;

/// A single record in an import file. Only the brand is required.
#[derive(Debug, Deserialize)]
struct ImportRecord {
    brand: String,
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    reference_number: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    movement: String,
    #[serde(default)]
    caliber: String,
}

impl ImportRecord {
    fn into_entry(self) -> CatalogEntry {
        CatalogEntry::new(
            self.brand,
            self.model_name,
            self.reference_number,
            self.description,
            self.category,
            self.movement,
            self.caliber,
            Vec::new(),
        )
    }
}

/// Run the import command.
pub async fn run_import(file: &str, replace: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Import) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let content = std::fs::read_to_string(file)?;
    let records: Vec<ImportRecord> = serde_json::from_str(&content)?;

    if records.is_empty() {
        Output::warning("No records found in file.");
        return Ok(());
    }

    let store = open_store(&settings)?;
    let embedder = OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    );

    let spinner = Output::spinner(&format!("Embedding {} catalog entries...", records.len()));

    let mut entries: Vec<CatalogEntry> = records.into_iter().map(ImportRecord::into_entry).collect();

    let texts: Vec<String> = entries.iter().map(|e| e.embedding_text()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;
    for (entry, embedding) in entries.iter_mut().zip(embeddings) {
        entry.embedding = embedding;
    }

    spinner.set_message("Indexing entries...");

    if replace {
        let brands: BTreeSet<String> = entries.iter().map(|e| e.brand.clone()).collect();
        for brand in &brands {
            let deleted = store.delete_by_brand(brand).await?;
            if deleted > 0 {
                Output::info(&format!("Removed {} existing entries for {}", deleted, brand));
            }
        }
    }

    let count = store.upsert_batch(&entries).await?;
    spinner.finish_and_clear();

    Output::success(&format!("Indexed {} catalog entries.", count));
    Ok(())
}
