use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur during draft operations.
///
/// The `*NotFound` family is always recoverable: it means the session
/// moved on before the request arrived (e.g. a timeout autopick consumed
/// the pack), and the caller should re-read current state and treat the
/// request as stale.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("draft session {0} does not exist")]
    SessionNotFound(String),
    #[error("player {0} is not seated in this draft")]
    PlayerNotFound(String),
    #[error("player {0} has no active pack")]
    NoActivePack(String),
    #[error("card {0} is not in the active pack")]
    CardNotFound(String),
    #[error("could not acquire session lock {key}")]
    LockContention { key: String },
    #[error("expected {expected} packs, got {actual}")]
    MalformedInput { expected: usize, actual: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DraftError {
    /// True for the recoverable stale-request family.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::SessionNotFound(_)
                | Self::PlayerNotFound(_)
                | Self::NoActivePack(_)
                | Self::CardNotFound(_)
        )
    }
}
