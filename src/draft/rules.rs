//! Table rules as pure functions of session metadata.
//!
//! The picks-per-turn and pass-direction rules are kept here, out of the
//! engine flow, so each can be tested on its own.

use super::entities::SeatIndex;

/// Direction a pack travels when passed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PassDirection {
    /// To the next seat (index + 1).
    Left,
    /// To the previous seat (index - 1).
    Right,
}

/// How many cards a player takes from an active pack before it passes.
/// A 4-seat table drafts two at a time; every other size drafts one.
pub fn picks_required(seat_count: usize) -> u8 {
    if seat_count == 4 { 2 } else { 1 }
}

/// Packs travel left in rounds 1 and 3, right in round 2.
pub fn pass_direction(pack_number: u8) -> PassDirection {
    if pack_number == 2 {
        PassDirection::Right
    } else {
        PassDirection::Left
    }
}

/// Seat that receives a pack vacated by `seat_idx` in the given round.
pub fn receiving_seat(seat_idx: SeatIndex, seat_count: usize, pack_number: u8) -> SeatIndex {
    match pass_direction(pack_number) {
        PassDirection::Left => (seat_idx + 1) % seat_count,
        PassDirection::Right => (seat_idx + seat_count - 1) % seat_count,
    }
}
