//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::vector_store::open_store;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    settings: Settings,
) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Search) {
        Output::error(&format!("{}", e));
        return Err(e.into());
    }

    let store = open_store(&settings)?;
    let embedder = OpenAIEmbedder::with_config(
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    );

    let spinner = Output::spinner("Searching catalog...");

    let query_embedding = embedder.embed(query).await?;
    let results = store
        .search_with_threshold(&query_embedding, limit, min_score)
        .await?;

    spinner.finish_and_clear();

    if results.is_empty() {
        Output::info("No matching catalog entries found.");
        return Ok(());
    }

    Output::header(&format!("Results ({})", results.len()));
    for result in &results {
        let name = format!("{} {}", result.entry.brand, result.entry.model_name);
        Output::search_result(
            name.trim(),
            &result.entry.reference_number,
            result.score,
            &result.entry.description,
        );
    }

    Ok(())
}
