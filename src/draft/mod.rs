//! Draft session engine - the pick/pass/timer protocol.
//!
//! This module implements:
//! - Session creation from a pre-partitioned pack list
//! - The pick/pass state machine with rotating pass direction and
//!   table-size-dependent picks per turn
//! - The round-completion barrier between the three rounds
//! - The timer-driven autopick sweep for bots and timed-out humans
//! - Pause/resume with deadline refresh
//!
//! All mutations run under the per-session store lock; see [`crate::store`].

pub mod config;
pub mod engine;
pub mod entities;
pub mod errors;
pub mod rules;

pub use config::DraftConfig;
pub use engine::{DraftManager, SeatAssignment, spawn_timer_sweep};
pub use entities::{
    Card, CardId, Color, DraftSession, DraftStatus, Pack, PlayerDraftState, PlayerId, Rarity,
    SessionId,
};
pub use errors::DraftError;
pub use rules::{PassDirection, pass_direction, picks_required, receiving_seat};
