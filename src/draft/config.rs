//! Draft configuration models.

use std::time::Duration;

/// Draft timing configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftConfig {
    /// Think time granted per active pack (default: 60s)
    pub pick_time: Duration,

    /// Session lock time-to-live. Bounds the blast radius of a crashed
    /// holder; an abandoned lock self-expires instead of deadlocking the
    /// session forever. (default: 5s)
    pub lock_ttl: Duration,

    /// Interval between lock acquisition attempts for direct requests
    /// (default: 100ms)
    pub lock_retry_interval: Duration,

    /// Ceiling on total lock retry time for direct requests. Absorbs
    /// accidental double-submission without surfacing a spurious failure.
    /// (default: 2s)
    pub lock_retry_max: Duration,

    /// Deadline for the deck-building phase. `None` leaves the phase
    /// untimed (the default).
    pub deck_building_time: Option<Duration>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            pick_time: Duration::from_secs(60),
            lock_ttl: Duration::from_secs(5),
            lock_retry_interval: Duration::from_millis(100),
            lock_retry_max: Duration::from_secs(2),
            deck_building_time: None,
        }
    }
}

impl DraftConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.pick_time.is_zero() {
            return Err("Pick time must be non-zero".to_string());
        }

        if self.lock_ttl.is_zero() {
            return Err("Lock TTL must be non-zero".to_string());
        }

        if self.lock_retry_interval > self.lock_retry_max {
            return Err("Lock retry interval must not exceed the retry ceiling".to_string());
        }

        Ok(())
    }
}
