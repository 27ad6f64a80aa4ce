//! Bot players: instant pick selection and automatic deck assembly.
//!
//! Both functions are pure - no state, no I/O - so the engine can call
//! them from inside a locked transaction and tests can score them
//! directly.

pub mod deck;
pub mod picker;

pub use deck::build_deck;
pub use picker::select_best_card;
