//! In-memory backend with native primitives.
//!
//! Models a store whose set/hash operations are native and whose lock is a
//! true atomic set-if-not-exists with expiry. All state sits behind a
//! single mutex, so every operation the trait calls atomic really is.

use async_trait::async_trait;
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
    time::Duration,
};
use tokio::{sync::Mutex, time::Instant};

use super::{StateStore, StoreResult};

#[derive(Default)]
struct Inner {
    blobs: HashMap<String, String>,
    sets: HashMap<String, HashSet<String>>,
    hashes: HashMap<String, HashMap<String, String>>,
    /// Lock key -> expiry instant.
    locks: HashMap<String, Instant>,
}

/// Shared in-memory store. Cloning shares the underlying state, so every
/// handle observes the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.blobs.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.blobs.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(set) = inner.sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                inner.sets.remove(key);
            }
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .sets
            .get(key)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        let inner = self.inner.lock().await;
        Ok(inner.hashes.get(key).and_then(|h| h.get(field)).cloned())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(hash) = inner.hashes.get_mut(key) {
            hash.remove(field);
            if hash.is_empty() {
                inner.hashes.remove(key);
            }
        }
        Ok(())
    }

    async fn acquire_lock(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let mut inner = self.inner.lock().await;
        let now = Instant::now();
        // An expired lock counts as absent and is taken over.
        if let Some(expires_at) = inner.locks.get(key)
            && *expires_at > now
        {
            return Ok(false);
        }
        inner.locks.insert(key.to_string(), now + ttl);
        Ok(true)
    }

    async fn release_lock(&self, key: &str) -> StoreResult<()> {
        let mut inner = self.inner.lock().await;
        inner.locks.remove(key);
        Ok(())
    }
}
