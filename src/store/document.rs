//! Document-oriented backend.
//!
//! Models a store that only offers blob get/set/delete plus an atomic
//! add-if-absent, with no first-class expiry. Sets and hashes are
//! simulated as JSON documents via read-modify-write, so they are only
//! safe while the corresponding session lock is held. The lock itself
//! rides on add-if-absent key-exists semantics: the expiry instant is
//! stored inside the lock document, an expired document counts as absent,
//! and release means deleting the key.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::Arc,
    time::Duration,
};
use tokio::sync::Mutex;

use super::{StateStore, StoreResult};

#[derive(Deserialize, Serialize)]
struct LockDoc {
    expires_at: DateTime<Utc>,
}

/// Shared document store. Cloning shares the underlying documents.
#[derive(Clone, Default)]
pub struct DocumentStore {
    docs: Arc<Mutex<HashMap<String, String>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document only if the key is absent. Returns true iff the
    /// document was written. This is the backend's one atomic primitive.
    async fn add_if_absent(&self, key: &str, value: &str) -> bool {
        let mut docs = self.docs.lock().await;
        if docs.contains_key(key) {
            return false;
        }
        docs.insert(key.to_string(), value.to_string());
        true
    }

    async fn read_set(&self, key: &str) -> StoreResult<BTreeSet<String>> {
        let docs = self.docs.lock().await;
        match docs.get(key) {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(BTreeSet::new()),
        }
    }

    async fn write_set(&self, key: &str, set: &BTreeSet<String>) -> StoreResult<()> {
        let mut docs = self.docs.lock().await;
        if set.is_empty() {
            docs.remove(key);
        } else {
            docs.insert(key.to_string(), serde_json::to_string(set)?);
        }
        Ok(())
    }

    async fn read_hash(&self, key: &str) -> StoreResult<BTreeMap<String, String>> {
        let docs = self.docs.lock().await;
        match docs.get(key) {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(BTreeMap::new()),
        }
    }

    async fn write_hash(&self, key: &str, hash: &BTreeMap<String, String>) -> StoreResult<()> {
        let mut docs = self.docs.lock().await;
        if hash.is_empty() {
            docs.remove(key);
        } else {
            docs.insert(key.to_string(), serde_json::to_string(hash)?);
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for DocumentStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let docs = self.docs.lock().await;
        Ok(docs.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut docs = self.docs.lock().await;
        docs.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        let mut docs = self.docs.lock().await;
        docs.remove(key);
        Ok(())
    }

    // Set and hash simulation below is read-modify-write over a JSON
    // document: only safe while the session lock is held.

    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut set = self.read_set(key).await?;
        set.insert(member.to_string());
        self.write_set(key, &set).await
    }

    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut set = self.read_set(key).await?;
        set.remove(member);
        self.write_set(key, &set).await
    }

    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>> {
        Ok(self.read_set(key).await?.into_iter().collect())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        let mut hash = self.read_hash(key).await?;
        hash.insert(field.to_string(), value.to_string());
        self.write_hash(key, &hash).await
    }

    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        Ok(self.read_hash(key).await?.get(field).cloned())
    }

    async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<()> {
        let mut hash = self.read_hash(key).await?;
        hash.remove(field);
        self.write_hash(key, &hash).await
    }

    async fn acquire_lock(&self, key: &str, ttl: Duration) -> StoreResult<bool> {
        let ttl = chrono::TimeDelta::from_std(ttl)
            .map_err(|e| super::StoreError::Backend(e.to_string()))?;
        let doc = serde_json::to_string(&LockDoc {
            expires_at: Utc::now() + ttl,
        })?;

        if self.add_if_absent(key, &doc).await {
            return Ok(true);
        }

        // The key exists; a stale holder may have crashed. Check the
        // expiry recorded in the document and take over if it passed.
        let mut docs = self.docs.lock().await;
        let Some(raw) = docs.get(key) else {
            // Released between our two looks; take it.
            docs.insert(key.to_string(), doc);
            return Ok(true);
        };
        let existing: LockDoc = serde_json::from_str(raw)?;
        if existing.expires_at > Utc::now() {
            return Ok(false);
        }
        docs.insert(key.to_string(), doc);
        Ok(true)
    }

    async fn release_lock(&self, key: &str) -> StoreResult<()> {
        self.delete(key).await
    }
}
