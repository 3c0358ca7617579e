//! Cache manager for persisting API responses to disk
//!
//! Provides a `CacheManager` that stores each payload together with its write
//! timestamp in one JSON file per key. Expired entries are deleted on read and
//! never returned.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::key::{file_stem, ttl_for};
use super::CacheStore;
use crate::clock::{Clock, SystemClock};

/// Extension used for entry files
const ENTRY_EXTENSION: &str = "json";

/// Distinguishes temp files written concurrently by this process
static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Wrapper struct for cached data stored on disk
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    /// The full cache key, kept so a file can be matched back to its key
    key: String,
    /// When the data was cached
    cached_at: DateTime<Utc>,
    /// The cached payload, stored verbatim
    data: Box<RawValue>,
}

/// Manages reading and writing cached responses on disk
///
/// The cache manager stores data as JSON files in an XDG-compliant cache directory
/// (`~/.cache/pitchside/` on Linux). Entries are written to a temp file and renamed
/// into place, so a reader sees either the old entry or the new one.
#[derive(Debug, Clone)]
pub struct CacheManager {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Source of "now" for timestamps and expiry
    clock: Arc<dyn Clock>,
}

impl CacheManager {
    /// Creates a new CacheManager using XDG-compliant cache directory
    ///
    /// Returns `None` if the cache directory cannot be determined (e.g., no home directory).
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "pitchside")?;
        Some(Self::with_dir(project_dirs.cache_dir().to_path_buf()))
    }

    /// Creates a new CacheManager with a custom cache directory
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self {
            cache_dir,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the time source used for timestamps and expiry
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the path to the entry file for the given key
    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{}.{}", file_stem(key), ENTRY_EXTENSION))
    }

    /// Reads and decodes the entry for `key`, if one is on disk
    async fn read_entry(&self, key: &str, path: &Path) -> io::Result<Option<CacheEntry>> {
        let content = match fs::read(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let entry: CacheEntry = serde_json::from_slice(&content)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        if entry.key != key {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("entry file belongs to key '{}'", entry.key),
            ));
        }

        Ok(Some(entry))
    }

    /// Serializes an entry and moves it into place
    async fn write_entry(&self, key: &str, payload: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir).await?;

        let text = String::from_utf8(payload.to_vec())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        let data = RawValue::from_string(text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let entry = CacheEntry {
            key: key.to_string(),
            cached_at: self.clock.now(),
            data,
        };
        let json = serde_json::to_vec(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let path = self.entry_path(key);
        let tmp_path = tmp_path_for(&path);
        if let Err(e) = write_and_rename(&tmp_path, &path, &json).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(e);
        }
        Ok(())
    }

    /// Deletes the entry at `path` if it is still the one written at `cached_at`
    ///
    /// A `put` may have replaced the file since it was read; the fresh entry is
    /// kept. The check and the delete are not atomic, so a replacement landing
    /// in between is lost and the next read is a miss.
    async fn remove_expired(
        &self,
        key: &str,
        path: &Path,
        cached_at: DateTime<Utc>,
    ) -> io::Result<()> {
        match self.read_entry(key, path).await {
            Ok(Some(current)) if current.cached_at != cached_at => {
                debug!(key, "expired entry already replaced");
                return Ok(());
            }
            Ok(None) => return Ok(()),
            _ => {}
        }
        match fs::remove_file(path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Deletes every entry file in the cache directory
    async fn remove_entries(&self) -> io::Result<usize> {
        let mut dir = match fs::read_dir(&self.cache_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        while let Some(item) = dir.next_entry().await? {
            let path = item.path();
            let is_entry = path
                .extension()
                .is_some_and(|ext| ext == ENTRY_EXTENSION);
            if is_entry && item.file_type().await?.is_file() {
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(removed)
    }
}

#[async_trait]
impl CacheStore for CacheManager {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let path = self.entry_path(key);
        let entry = match self.read_entry(key, &path).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                debug!(key, "cache miss");
                return None;
            }
            Err(e) => {
                warn!(key, error = %e, "ignoring unreadable cache entry");
                return None;
            }
        };

        let age = self.clock.now() - entry.cached_at;
        if age > ttl_for(key) {
            info!(key, age_secs = age.num_seconds(), "cache entry expired");
            if let Err(e) = self.remove_expired(key, &path, entry.cached_at).await {
                warn!(key, error = %e, "failed to remove expired cache entry");
            }
            return None;
        }

        debug!(key, "cache hit");
        Some(entry.data.get().as_bytes().to_vec())
    }

    async fn put(&self, key: &str, payload: &[u8]) {
        match self.write_entry(key, payload).await {
            Ok(()) => debug!(key, bytes = payload.len(), "cache entry written"),
            Err(e) => warn!(key, error = %e, "failed to write cache entry"),
        }
    }

    async fn clear(&self) {
        match self.remove_entries().await {
            Ok(removed) => info!(removed, dir = %self.cache_dir.display(), "cache cleared"),
            Err(e) => warn!(error = %e, dir = %self.cache_dir.display(), "failed to clear cache"),
        }
    }
}

/// Builds a unique sibling path for staging a write
fn tmp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("entry");
    let seq = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{}.tmp.{}.{}", file_name, std::process::id(), seq))
}

/// Writes, flushes and syncs the temp file, then renames it over `path`
async fn write_and_rename(tmp_path: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(tmp_path)
        .await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    fs::rename(tmp_path, path).await
}
