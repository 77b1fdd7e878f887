//! Result cache keyed by request fingerprint.
//!
//! A fingerprint combines the backend mode, the image identity and the
//! serialized options. Path sources are identified by their path string;
//! in-memory buffers by a BLAKE3 hash of their full content, so two different
//! buffers of the same length never share an entry.
//!
//! An entry older than the TTL is dropped when it is looked up, and every
//! insert sweeps out the other expired entries. There is no in-flight
//! de-duplication; concurrent misses on the same fingerprint both dispatch
//! and the last insert wins.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use blake3::Hasher;

use crate::config::Mode;
use crate::types::{AnalysisOptions, AnalysisResult, ImageSource};

/// Cache key for one `(mode, image, options)` request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(mode: Mode, image: &ImageSource, options: &AnalysisOptions) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(mode.as_str().as_bytes());
        hasher.update(b"|");
        match image {
            ImageSource::Path(path) => {
                hasher.update(b"path:");
                hasher.update(path.to_string_lossy().as_bytes());
            }
            ImageSource::Bytes(bytes) => {
                hasher.update(b"bytes:");
                hasher.update(bytes);
            }
        }
        hasher.update(b"|");
        // Options is a plain struct of optional scalars; serialization cannot fail.
        let options_json = serde_json::to_string(options).unwrap_or_default();
        hasher.update(options_json.as_bytes());
        Self(hasher.finalize().to_hex().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

struct CacheEntry {
    result: AnalysisResult,
    inserted_at: Instant,
}

/// In-memory map of fingerprints to results.
#[derive(Default)]
pub struct ResultCache {
    entries: Mutex<HashMap<Fingerprint, CacheEntry>>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a live entry. Entries older than `ttl` are evicted and missed.
    pub fn get(&self, key: &Fingerprint, ttl: Option<Duration>) -> Option<AnalysisResult> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = match (entries.get(key), ttl) {
            (None, _) => return None,
            (Some(entry), Some(ttl)) => entry.inserted_at.elapsed() >= ttl,
            (Some(_), None) => false,
        };
        if expired {
            tracing::debug!("Cache entry {} expired", key.as_str());
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.result.clone())
    }

    /// Store `result`, first dropping every entry older than `ttl`.
    pub fn insert(&self, key: Fingerprint, result: AnalysisResult, ttl: Option<Duration>) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(ttl) = ttl {
            let before = entries.len();
            entries.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
            let swept = before - entries.len();
            if swept > 0 {
                tracing::debug!("Swept {swept} expired cache entries");
            }
        }
        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
