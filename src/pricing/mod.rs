//! Live market price resolution.
//!
//! Resolves a current market price for a catalog entry on demand:
//! cache lookup, web search provider call, multi-stage candidate
//! extraction, and a time-boxed cache write on success.

mod cache;
mod parser;
mod provider;
mod resolver;

pub use cache::{cache_key, PriceCache};
pub use parser::PriceParser;
pub use provider::{HttpSearchProvider, SearchHit, SearchOutcome, SearchProvider, StructuredPrice};
pub use resolver::LivePriceResolver;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A tentative price extracted from unstructured or semi-structured
/// provider output. Never guessed beyond what the text supports: a
/// candidate may carry only the raw match and currency when the numeric
/// token failed to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCandidate {
    /// Parsed numeric value, if the matched token was a valid number.
    pub value: Option<f64>,
    /// Currency code or symbol as found in the text.
    pub currency: Option<String>,
    /// The matched price text, kept for auditability.
    pub raw: String,
    /// URL or provider identifier the candidate came from.
    pub source: Option<String>,
}

/// A price candidate stamped with its resolution instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// Parsed numeric value, if any.
    pub value: Option<f64>,
    /// Currency code or symbol, if any.
    pub currency: Option<String>,
    /// The matched price text.
    pub raw: String,
    /// URL or provider identifier the price came from.
    pub source: Option<String>,
    /// When this price was resolved from the provider.
    pub resolved_at: DateTime<Utc>,
    /// True when served from the cache rather than a fresh provider call.
    #[serde(default)]
    pub from_cache: bool,
}

impl ResolvedPrice {
    /// Stamp a candidate with the current instant.
    pub fn from_candidate(candidate: PriceCandidate) -> Self {
        Self {
            value: candidate.value,
            currency: candidate.currency,
            raw: candidate.raw,
            source: candidate.source,
            resolved_at: Utc::now(),
            from_cache: false,
        }
    }
}
