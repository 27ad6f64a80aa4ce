//! Session lock acquisition with named retry policies.
//!
//! Two disciplines exist: direct pick requests retry on a short interval
//! up to a ceiling (absorbing double-taps without a spurious failure),
//! while the timer sweep tries once and skips the session on contention.
//! Both run through the same helper so the timing constants live in one
//! place instead of at every call site.

use std::{sync::Arc, time::Duration};
use tokio::time::{Instant, sleep};

use super::{StateStore, StoreResult};

/// How long to keep trying to acquire a lock.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryPolicy {
    /// One attempt; contention is reported immediately. Used by the timer
    /// sweep, which picks the session back up at its next tick.
    FailFast,
    /// Retry every `interval` until `max_wait` has elapsed.
    BoundedRetry {
        interval: Duration,
        max_wait: Duration,
    },
}

/// A held session lock. Release is explicit: callers release on every
/// path, success or error, after writing the session back.
pub struct SessionLock {
    store: Arc<dyn StateStore>,
    key: String,
}

impl SessionLock {
    /// Attempt to acquire `key` under the given policy. Returns `None`
    /// when the lock could not be acquired within the policy's budget.
    pub async fn acquire(
        store: Arc<dyn StateStore>,
        key: &str,
        ttl: Duration,
        policy: RetryPolicy,
    ) -> StoreResult<Option<Self>> {
        let deadline = match policy {
            RetryPolicy::FailFast => None,
            RetryPolicy::BoundedRetry { max_wait, .. } => Some(Instant::now() + max_wait),
        };

        loop {
            if store.acquire_lock(key, ttl).await? {
                return Ok(Some(Self {
                    store,
                    key: key.to_string(),
                }));
            }

            match (policy, deadline) {
                (RetryPolicy::BoundedRetry { interval, .. }, Some(deadline))
                    if Instant::now() + interval <= deadline =>
                {
                    sleep(interval).await;
                }
                _ => return Ok(None),
            }
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Release the lock. Consumes the guard.
    pub async fn release(self) -> StoreResult<()> {
        self.store.release_lock(&self.key).await
    }
}
