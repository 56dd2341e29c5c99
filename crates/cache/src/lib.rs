//! Local asset cache for the folio backend.
//!
//! Reads of repository files keyed by a stable blob id go through an
//! [`AssetCache`]: the cache is consulted before a network fetch and
//! populated after a successful one. The contract is get-or-set only —
//! no TTL, no eviction, no invalidation. Two concurrent misses on the same
//! key both fetch and both write; that is benign because both writes carry
//! the same decoded value.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache backend error: {0}")]
    Backend(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Async key-value store for decoded file content.
///
/// Keys are namespaced stable identifiers (`gl.<blob-id>`); values are the
/// decoded bytes of the file. Implementations back this with memory, disk,
/// or whatever the host embeds.
#[async_trait]
pub trait AssetCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;
}

/// In-memory [`AssetCache`] shared across clones.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every cached entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
        debug!("cleared asset cache");
    }
}

#[async_trait]
impl AssetCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        let value = entries.get(key).cloned();
        if value.is_some() {
            debug!("cache hit for {}", key);
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }
}
