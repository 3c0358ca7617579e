//! Cache module for storing API responses
//!
//! This module provides the `CacheStore` seam used by the repository, a disk-backed
//! `CacheManager`, an `InMemoryCache`, and the key derivation and expiry rules they
//! share. Caching is best-effort: read failures are misses and write failures are
//! logged and dropped.

mod key;
mod manager;
mod memory;

pub use key::{derive_key, file_stem, ttl_for, CacheCategory, KeyParam, DEFAULT_TTL_HOURS};
pub use manager::CacheManager;
pub use memory::InMemoryCache;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

/// Keyed, time-expiring storage of serialized payloads
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the payload stored under `key` if it exists and has not expired
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `payload` under `key` with the current time, replacing any prior entry
    async fn put(&self, key: &str, payload: &[u8]);

    /// Removes every entry
    async fn clear(&self);
}

/// Reads and decodes a JSON payload, treating decode failures as a miss
pub async fn get_json<T: DeserializeOwned>(store: &dyn CacheStore, key: &str) -> Option<T> {
    let bytes = store.get(key).await?;
    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, error = %e, "cached payload does not match expected shape");
            None
        }
    }
}

/// Encodes `value` as JSON and stores it
pub async fn put_json<T: Serialize + ?Sized>(store: &dyn CacheStore, key: &str, value: &T) {
    match serde_json::to_vec(value) {
        Ok(bytes) => store.put(key, &bytes).await,
        Err(e) => warn!(key, error = %e, "failed to encode payload for cache"),
    }
}
