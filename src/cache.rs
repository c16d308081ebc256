//! Bounded in-memory translation cache.
//!
//! Entries are immutable once inserted and live until evicted or cleared.
//! When the cache is full, the oldest fifth of the entries (by insertion
//! order) is dropped in one sweep before the new entry goes in.

use crate::i18n::Language;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Default maximum number of cached translations.
pub const DEFAULT_CACHE_LIMIT: usize = 5000;

/// Identifies one translation request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub source: Language,
    pub target: Language,
    pub text: String,
}

impl CacheKey {
    pub fn new(source: Language, target: Language, text: impl Into<String>) -> Self {
        Self {
            source,
            target,
            text: text.into(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<CacheKey, String>,
    /// Keys in insertion order, oldest first
    order: VecDeque<CacheKey>,
}

/// Translation cache shared by every caller of one translator.
///
/// The eviction sweep and the insert that triggered it happen under one
/// lock, so concurrent writers never observe more than `capacity` entries.
#[derive(Debug)]
pub struct TranslationCache {
    capacity: usize,
    state: Mutex<CacheState>,
}

impl TranslationCache {
    /// Create a cache holding at most `capacity` entries (minimum 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Mutex::new(CacheState::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries dropped by one eviction sweep: 20% of capacity.
    fn eviction_batch(&self) -> usize {
        (self.capacity / 5).max(1)
    }

    pub fn get(&self, key: &CacheKey) -> Option<String> {
        self.state.lock().entries.get(key).cloned()
    }

    /// Insert a translation.
    ///
    /// A key that is already cached keeps its first value and its place in
    /// the eviction order.
    pub fn put(&self, key: CacheKey, value: String) {
        let mut state = self.state.lock();

        if state.entries.contains_key(&key) {
            return;
        }

        if state.entries.len() >= self.capacity {
            let batch = self.eviction_batch();
            for _ in 0..batch {
                match state.order.pop_front() {
                    Some(oldest) => {
                        state.entries.remove(&oldest);
                    }
                    None => break,
                }
            }
            debug!(
                "Translation cache full ({} entries), evicted {} oldest",
                self.capacity, batch
            );
        }

        state.order.push_back(key.clone());
        state.entries.insert(key, value);
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.order.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TranslationCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_LIMIT)
    }
}
