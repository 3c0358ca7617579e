//! Process-local cache store
//!
//! Same expiry rules as the disk cache, without persistence. Used when no cache
//! directory is available and as a lightweight store in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use super::key::ttl_for;
use super::CacheStore;
use crate::clock::{Clock, SystemClock};

/// In-memory cache keyed by cache key
#[derive(Debug, Clone)]
pub struct InMemoryCache {
    entries: Arc<Mutex<HashMap<String, (Vec<u8>, DateTime<Utc>)>>>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            clock,
        }
    }

    /// Number of entries currently held, expired or not
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.lock().ok()?;
        let cached_at = entries.get(key)?.1;

        if self.clock.now() - cached_at > ttl_for(key) {
            debug!(key, "in-memory cache entry expired");
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|(payload, _)| payload.clone())
    }

    async fn put(&self, key: &str, payload: &[u8]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), (payload.to_vec(), self.clock.now()));
        }
    }

    async fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }
}
