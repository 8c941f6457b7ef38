//! Live price resolution.
//!
//! Orchestrates the fallback chain for a single lookup: cache, provider
//! call, staged candidate extraction, cache write. Provider failures are
//! logged and swallowed so a price question still gets a catalog answer.

use super::{cache_key, PriceCache, PriceCandidate, PriceParser, ResolvedPrice};
use super::{SearchOutcome, SearchProvider, StructuredPrice};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Marketplace hint terms appended to every provider query.
const MARKET_HINTS: &str = "current market price listing chrono24 ebay";

/// Resolves current market prices for catalog entries.
pub struct LivePriceResolver {
    provider: Arc<dyn SearchProvider>,
    cache: PriceCache,
    parser: PriceParser,
}

impl LivePriceResolver {
    /// Create a resolver over a search provider and price cache.
    pub fn new(provider: Arc<dyn SearchProvider>, cache: PriceCache) -> Self {
        Self {
            provider,
            cache,
            parser: PriceParser::new(),
        }
    }

    /// Resolve a live price for the given model.
    ///
    /// Returns `None` when the provider fails or no candidate can be
    /// extracted; failures are never propagated. Successful resolutions
    /// are cached under the normalized key, except when both brand and
    /// model are empty (such keys would conflate unrelated lookups).
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        brand: &str,
        model_name: &str,
        reference_number: &str,
    ) -> Option<ResolvedPrice> {
        let key = cache_key(brand, model_name, reference_number);
        let cacheable = !brand.trim().is_empty() || !model_name.trim().is_empty();

        if cacheable {
            if let Some(hit) = self.cache.get(&key) {
                debug!("Serving cached price for {}", key);
                return Some(hit);
            }
        }

        let query = build_query(brand, model_name, reference_number);

        let outcome = match self.provider.search(&query).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Live price lookup failed: {}", e);
                return None;
            }
        };

        let candidate = self.extract_candidate(&outcome)?;
        let resolved = ResolvedPrice::from_candidate(candidate);

        if cacheable {
            self.cache.insert(&key, resolved.clone());
        }

        Some(resolved)
    }

    /// Extract a candidate in strict priority order: top-level structured
    /// price, then the first ranked result with structured price or
    /// parsable text, then the provider's own free-text answer.
    fn extract_candidate(&self, outcome: &SearchOutcome) -> Option<PriceCandidate> {
        if let Some(price) = &outcome.price {
            return Some(self.from_structured(price, None));
        }

        for hit in &outcome.results {
            if let Some(price) = &hit.price {
                return Some(self.from_structured(price, hit.url.as_deref()));
            }

            if let Some(mut candidate) = self.parser.parse(&hit.combined_text()) {
                candidate.source = hit
                    .url
                    .clone()
                    .or_else(|| Some(self.provider.label().to_string()));
                return Some(candidate);
            }
        }

        if let Some(answer) = &outcome.answer {
            if let Some(mut candidate) = self.parser.parse(answer) {
                candidate.source = Some(self.provider.label().to_string());
                return Some(candidate);
            }
        }

        None
    }

    fn from_structured(
        &self,
        price: &StructuredPrice,
        fallback_source: Option<&str>,
    ) -> PriceCandidate {
        let raw = match &price.currency {
            Some(currency) => format!("{} {}", currency, price.value),
            None => price.value.to_string(),
        };

        PriceCandidate {
            value: Some(price.value),
            currency: price.currency.clone(),
            raw,
            source: price
                .source
                .clone()
                .or_else(|| fallback_source.map(str::to_string))
                .or_else(|| Some(self.provider.label().to_string())),
        }
    }
}

/// Build the provider query from the model fields and marketplace hints.
fn build_query(brand: &str, model_name: &str, reference_number: &str) -> String {
    [brand, model_name, reference_number, MARKET_HINTS]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
