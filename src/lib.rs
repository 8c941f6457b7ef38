//! Urverk - Watch Catalog Q&A with Live Prices
//!
//! A local-first CLI tool for answering questions about a luxury-watch catalog.
//!
//! The name "Urverk" comes from the Norwegian word for "clockwork."
//!
//! # Overview
//!
//! Urverk allows you to:
//! - Import a watch catalog and build a searchable vector index from it
//! - Ask questions and get answers grounded in the closest catalog entry
//! - Augment price questions with a freshly resolved live market price
//! - Search the catalog semantically
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `catalog` - Catalog retrieval (question -> best-matching entry)
//! - `intent` - Price-intent classification
//! - `pricing` - Live price resolution (cache, provider, text parsing)
//! - `pipeline` - Query resolution pipeline
//!
//! # Example
//!
//! ```rust,no_run
//! use urverk::config::Settings;
//! use urverk::pipeline::QueryPipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = QueryPipeline::new(&settings)?;
//!
//!     let answer = pipeline.answer("How much is a Submariner right now?").await?;
//!     println!("{}", answer.answer);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod intent;
pub mod openai;
pub mod pipeline;
pub mod pricing;
pub mod vector_store;

pub use error::{Result, UrverkError};
