//! Shared state store abstraction.
//!
//! Multiple server processes may handle requests for the same session
//! concurrently, so all session state lives in an external shared store
//! behind this trait rather than in process memory. The engine holds state
//! in memory only for the duration of one lock-protected transaction.
//!
//! Two backends are provided:
//! - [`MemoryStore`]: native set/hash primitives and a true atomic
//!   set-if-absent-with-expiry lock.
//! - [`DocumentStore`]: blob storage only; sets and hashes are simulated
//!   via JSON read-modify-write, and the lock rides on an atomic
//!   add-if-absent with the expiry carried inside the value. Simulated
//!   collections are NOT safe against concurrent access outside the
//!   session lock.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod document;
pub mod lock;
pub mod memory;

pub use document::DocumentStore;
pub use lock::{RetryPolicy, SessionLock};
pub use memory::MemoryStore;

/// Set listing every live draft session identifier. Lets the timer sweep
/// enumerate work without a full scan.
pub const ACTIVE_DRAFTS_KEY: &str = "drafts:active";

/// Key of the serialized session blob.
pub fn draft_key(session_id: &str) -> String {
    format!("draft:{session_id}")
}

/// Key of the per-session mutual-exclusion lock.
pub fn draft_lock_key(session_id: &str) -> String {
    format!("lock:draft:{session_id}")
}

/// Errors surfaced by store backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Key/value store with set, hash, and lock primitives.
///
/// Backends differ in atomicity: see the module docs. Callers must treat
/// set/hash operations as lock-protected-only unless the backend
/// documents otherwise.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Fetch a blob by key.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Store a blob, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Delete a blob. Deleting a missing key is not an error.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Add a member to a set.
    async fn set_add(&self, key: &str, member: &str) -> StoreResult<()>;

    /// Remove a member from a set.
    async fn set_remove(&self, key: &str, member: &str) -> StoreResult<()>;

    /// All members of a set, in unspecified order.
    async fn set_members(&self, key: &str) -> StoreResult<Vec<String>>;

    /// Set a field in a hash map.
    async fn hash_set(&self, key: &str, field: &str, value: &str) -> StoreResult<()>;

    /// Fetch a field from a hash map.
    async fn hash_get(&self, key: &str, field: &str) -> StoreResult<Option<String>>;

    /// Delete a field from a hash map.
    async fn hash_delete(&self, key: &str, field: &str) -> StoreResult<()>;

    /// Atomically acquire a named lock if it is absent (or expired),
    /// with the given time-to-live. Returns true iff acquired.
    async fn acquire_lock(&self, key: &str, ttl: Duration) -> StoreResult<bool>;

    /// Release a previously acquired lock.
    async fn release_lock(&self, key: &str) -> StoreResult<()>;
}
