//! Time-boxed price cache.
//!
//! Process-wide map from normalized (brand, model, reference) keys to
//! resolved prices. Entries become stale after a fixed time-to-live and
//! are ignored on read, not deleted; the map itself is bounded by a
//! capacity with least-recently-used eviction so key cardinality cannot
//! grow it without limit. Only successful resolutions are ever written,
//! so failed lookups are retried on every subsequent request.

use super::ResolvedPrice;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;

/// Normalize a (brand, model, reference) tuple into a cache key.
///
/// Fields are trimmed, lower-cased and pipe-joined; empty fields
/// collapse to empty segments.
pub fn cache_key(brand: &str, model: &str, reference: &str) -> String {
    format!(
        "{}|{}|{}",
        brand.trim().to_lowercase(),
        model.trim().to_lowercase(),
        reference.trim().to_lowercase()
    )
}

struct CacheSlot {
    price: ResolvedPrice,
    stored_at: Instant,
    seq: u64,
}

struct CacheInner {
    slots: HashMap<String, CacheSlot>,
    /// Recency queue of (seq, key); records whose seq no longer matches
    /// the slot are skipped during eviction.
    order: VecDeque<(u64, String)>,
    tick: u64,
}

/// Bounded price cache with TTL staleness and LRU eviction.
pub struct PriceCache {
    inner: Mutex<CacheInner>,
    ttl: Duration,
    capacity: usize,
}

impl PriceCache {
    /// Create a cache with the given time-to-live and key capacity.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(CacheInner {
                slots: HashMap::new(),
                order: VecDeque::new(),
                tick: 0,
            }),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Look up a fresh entry, marking the result as served-from-cache.
    ///
    /// Stale entries are ignored but left in place until overwritten or
    /// evicted.
    pub fn get(&self, key: &str) -> Option<ResolvedPrice> {
        let mut inner = self.inner.lock().unwrap();

        match inner.slots.get(key) {
            Some(slot) if slot.stored_at.elapsed() < self.ttl => {}
            _ => return None,
        }

        inner.tick += 1;
        let tick = inner.tick;
        inner.order.push_back((tick, key.to_string()));

        let slot = inner.slots.get_mut(key)?;
        slot.seq = tick;

        let mut price = slot.price.clone();
        price.from_cache = true;
        Some(price)
    }

    /// Store a resolved price, overwriting any previous entry for the key.
    pub fn insert(&self, key: &str, price: ResolvedPrice) {
        let mut inner = self.inner.lock().unwrap();

        inner.tick += 1;
        let tick = inner.tick;
        inner.order.push_back((tick, key.to_string()));
        inner.slots.insert(
            key.to_string(),
            CacheSlot {
                price,
                stored_at: Instant::now(),
                seq: tick,
            },
        );

        while inner.slots.len() > self.capacity {
            let Some((seq, candidate)) = inner.order.pop_front() else {
                break;
            };
            let evict = inner
                .slots
                .get(&candidate)
                .is_some_and(|slot| slot.seq == seq);
            if evict {
                inner.slots.remove(&candidate);
                debug!("Evicted cached price for {}", candidate);
            }
        }
    }

    /// Number of keys currently held (fresh or stale).
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceCandidate;

    fn price(raw: &str) -> ResolvedPrice {
        ResolvedPrice::from_candidate(PriceCandidate {
            value: Some(9500.0),
            currency: Some("$".to_string()),
            raw: raw.to_string(),
            source: Some("https://example.com/listing".to_string()),
        })
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(
            cache_key("Rolex", "Submariner", "126610LN"),
            cache_key("rolex", " submariner ", "126610ln")
        );
        assert_eq!(cache_key("", "", ""), "||");
    }

    #[test]
    fn test_fresh_hit_is_marked() {
        let cache = PriceCache::new(Duration::from_secs(60), 8);
        let stored = price("$ 9,500");
        cache.insert("rolex|submariner|126610ln", stored.clone());

        let hit = cache.get("rolex|submariner|126610ln").unwrap();
        assert!(hit.from_cache);
        assert_eq!(hit.value, stored.value);
        assert_eq!(hit.currency, stored.currency);
        assert_eq!(hit.raw, stored.raw);
        assert_eq!(hit.source, stored.source);
        assert_eq!(hit.resolved_at, stored.resolved_at);
    }

    #[test]
    fn test_stale_entry_ignored_not_deleted() {
        let cache = PriceCache::new(Duration::ZERO, 8);
        cache.insert("rolex|submariner|126610ln", price("$ 9,500"));

        assert!(cache.get("rolex|submariner|126610ln").is_none());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_overwrite_refreshes() {
        let cache = PriceCache::new(Duration::from_secs(60), 8);
        cache.insert("k", price("$ 9,500"));
        cache.insert("k", price("$ 9,800"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("k").unwrap().raw, "$ 9,800");
    }

    #[test]
    fn test_lru_eviction() {
        let cache = PriceCache::new(Duration::from_secs(60), 2);
        cache.insert("a", price("$ 1"));
        cache.insert("b", price("$ 2"));

        // Touch "a" so "b" becomes the least recently used key.
        assert!(cache.get("a").is_some());

        cache.insert("c", price("$ 3"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_miss_on_unknown_key() {
        let cache = PriceCache::new(Duration::from_secs(60), 8);
        assert!(cache.get("omega|speedmaster|").is_none());
    }
}
