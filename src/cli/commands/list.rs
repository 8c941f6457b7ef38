//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::vector_store::open_store;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let store = open_store(&settings)?;

    match store.list_brands().await {
        Ok(brands) => {
            if brands.is_empty() {
                Output::info("No catalog entries indexed yet. Use 'urverk import <file>' to add some.");
            } else {
                Output::header(&format!("Indexed Brands ({})", brands.len()));
                println!();

                for brand in &brands {
                    Output::brand_info(&brand.brand, brand.entry_count);
                }

                let total = store.entry_count().await?;
                println!();
                Output::kv("Total brands", &brands.len().to_string());
                Output::kv("Total entries", &total.to_string());
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to list brands: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
