// Search-as-you-type suggestions: debounced, cached, and never overwritten by a stale response
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::api::{ApiError, BackendApi};
use crate::config::SuggestionConfig;

#[derive(Debug, Default)]
struct CacheCounters {
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
    expired_count: AtomicUsize,
    eviction_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub expired_count: usize,
    pub eviction_count: usize,
}

struct CacheEntry {
    suggestions: Vec<String>,
    created_at: Instant,
    last_accessed: Instant,
}

impl CacheEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() > ttl
    }
}

pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

pub struct SuggestionCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
    counters: CacheCounters,
}

impl SuggestionCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
            counters: CacheCounters::default(),
        }
    }

    pub fn get(&self, query: &str) -> Option<Vec<String>> {
        let key = normalize_query(query);

        let expired = match self.entries.get_mut(&key) {
            Some(mut entry) => {
                if entry.is_expired(self.ttl) {
                    true
                } else {
                    entry.last_accessed = Instant::now();
                    self.counters.hit_count.fetch_add(1, Ordering::SeqCst);
                    return Some(entry.suggestions.clone());
                }
            }
            None => false,
        };

        // Guard from get_mut is gone here, removing cannot deadlock the shard
        if expired && self.entries.remove(&key).is_some() {
            self.counters.expired_count.fetch_add(1, Ordering::SeqCst);
        }
        self.counters.miss_count.fetch_add(1, Ordering::SeqCst);
        None
    }

    pub fn store(&self, query: &str, suggestions: Vec<String>) {
        let key = normalize_query(query);
        let now = Instant::now();
        self.entries.insert(
            key.clone(),
            CacheEntry {
                suggestions,
                created_at: now,
                last_accessed: now,
            },
        );

        // Trim after inserting so concurrent stores can't leave us above the cap
        while self.entries.len() > self.max_entries {
            if !self.evict_least_recently_used(&key) {
                break;
            }
        }
    }

    // Never evicts `keep`, the entry that was just stored
    fn evict_least_recently_used(&self, keep: &str) -> bool {
        let oldest_key = self
            .entries
            .iter()
            .filter(|entry| entry.key() != keep)
            .min_by_key(|entry| entry.value().last_accessed)
            .map(|entry| entry.key().clone());

        match oldest_key {
            Some(key) => {
                if self.entries.remove(&key).is_some() {
                    self.counters.eviction_count.fetch_add(1, Ordering::SeqCst);
                    debug!("Evicted suggestions for '{}'", key);
                }
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.entries.len(),
            hit_count: self.counters.hit_count.load(Ordering::SeqCst),
            miss_count: self.counters.miss_count.load(Ordering::SeqCst),
            expired_count: self.counters.expired_count.load(Ordering::SeqCst),
            eviction_count: self.counters.eviction_count.load(Ordering::SeqCst),
        }
    }
}

/// Debounced suggestion lookups.
///
/// Every call to [`Suggester::suggest`] bumps a generation counter. A call
/// whose generation has been overtaken, either while waiting out the debounce
/// or while its request was in flight, resolves to `Ok(None)` and its response
/// is dropped, so only the newest keystroke can ever update the caller.
pub struct Suggester<B: BackendApi + ?Sized> {
    backend: Arc<B>,
    cache: SuggestionCache,
    debounce: Duration,
    min_query_len: usize,
    generation: AtomicU64,
}

impl<B: BackendApi + ?Sized> Suggester<B> {
    pub fn new(backend: Arc<B>, config: &SuggestionConfig) -> Self {
        Self {
            backend,
            cache: SuggestionCache::new(config.ttl(), config.max_entries),
            debounce: config.debounce(),
            min_query_len: config.min_query_len,
            generation: AtomicU64::new(0),
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub async fn suggest(&self, input: &str) -> Result<Option<Vec<String>>, ApiError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = normalize_query(input);

        if query.chars().count() < self.min_query_len {
            return Ok(Some(Vec::new()));
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if !self.is_current(generation) {
            debug!("Dropping superseded query '{}' before sending", query);
            return Ok(None);
        }

        if let Some(cached) = self.cache.get(&query) {
            return Ok(Some(cached));
        }

        let outcome = self.backend.search_suggestions(&query).await;
        if let Ok(suggestions) = &outcome {
            // Cache even if stale; the answer is still right for its own query
            self.cache.store(&query, suggestions.clone());
        }

        // A superseded lookup must not surface anything, not even its error
        if !self.is_current(generation) {
            debug!("Dropping stale suggestions for '{}'", query);
            return Ok(None);
        }
        outcome.map(Some)
    }

    // Invalidate any in-flight lookup, e.g. when the search box is cleared
    pub fn cancel_pending(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn cache_stats(&self) -> CacheStatsReport {
        self.cache.stats()
    }
}
