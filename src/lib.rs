//! # Booster Draft
//!
//! A multi-player booster draft session engine.
//!
//! A fixed set of card packs is distributed to seated participants, who
//! alternately pick cards and pass the remainder along a rotating seating
//! order under per-pick time limits, with computer-controlled participants
//! that pick instantly and later auto-build a deck.
//!
//! Multiple server processes may handle requests for the same session
//! concurrently (a pick request racing a timer sweep, for instance), so
//! all session mutations are serialized through an external shared store
//! under a per-session lock rather than through in-process memory.
//!
//! ## Core Modules
//!
//! - [`draft`]: Session engine - pick/pass state machine, round barrier,
//!   timer sweep, pause handling
//! - [`bot`]: Pure pick heuristic and deck assembler for bot seats
//! - [`store`]: Shared state store abstraction with two backends of
//!   differing atomicity
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use booster_draft::{
//!     draft::{DraftConfig, DraftManager, Pack, SeatAssignment},
//!     store::MemoryStore,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let manager = DraftManager::new(Arc::new(MemoryStore::new()), DraftConfig::default());
//!
//! // Two seats need exactly six packs.
//! let seats = vec![SeatAssignment::human("alice"), SeatAssignment::bot("bot-1")];
//! let packs: Vec<Pack> = (0..6).map(|i| Pack::new(format!("p{i}"), vec![])).collect();
//! let session = manager.create_draft("room-1", seats, packs, vec![]).await?;
//! assert_eq!(session.pack_number, 1);
//! # Ok(())
//! # }
//! ```

/// Bot pick heuristic and deck assembler.
pub mod bot;

/// Core draft session engine, entities, and rules.
pub mod draft;

/// Shared state store abstraction and backends.
pub mod store;

pub use draft::{
    Card, Color, DraftConfig, DraftError, DraftManager, DraftSession, DraftStatus, Pack,
    PlayerDraftState, Rarity, SeatAssignment,
};
pub use store::{DocumentStore, MemoryStore, StateStore};
