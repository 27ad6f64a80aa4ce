use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{HashMap, VecDeque},
    fmt,
};

/// Session/room identifier.
pub type SessionId = String;

/// Player identifier. Bots share the same namespace as humans.
pub type PlayerId = String;

/// Card identifier. Removal identity is always by id, never by name;
/// duplicate names are legal within a pack.
pub type CardId = String;

/// Seat positions around the table. Pass order follows seat order.
pub type SeatIndex = usize;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    /// Name of the basic land that produces this color.
    pub fn basic_land_name(self) -> &'static str {
        match self {
            Self::White => "Plains",
            Self::Blue => "Island",
            Self::Black => "Swamp",
            Self::Red => "Mountain",
            Self::Green => "Forest",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::White => "W",
            Self::Blue => "U",
            Self::Black => "B",
            Self::Red => "R",
            Self::Green => "G",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Mythic,
}

impl Rarity {
    /// Weight used when summing color strength for deck assembly.
    pub fn weight(self) -> u32 {
        match self {
            Self::Common => 1,
            Self::Uncommon => 2,
            Self::Rare => 3,
            Self::Mythic => 4,
        }
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Mythic => "mythic",
        };
        write!(f, "{repr}")
    }
}

/// An immutable card value. Cards are copied by value when moved between
/// collections; `metadata` is an opaque display payload that the engine
/// round-trips untouched.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Empty means colorless.
    #[serde(default)]
    pub colors: Vec<Color>,
    pub rarity: Rarity,
    /// Popularity rank, lower = more played. `None` means unranked.
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub mana_value: u8,
    #[serde(default)]
    pub type_line: String,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl Card {
    pub fn is_land(&self) -> bool {
        self.type_line.contains("Land")
    }

    pub fn is_colorless(&self) -> bool {
        self.colors.is_empty()
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.rarity)
    }
}

/// An ordered bundle of cards circulated among players during a round.
///
/// A pack is a moving unit: at any instant it is owned by exactly one of a
/// player's active-pack slot, a player's pass-in queue, a player's unopened
/// reserve, or nothing at all once emptied and discarded.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Pack {
    pub id: String,
    pub cards: Vec<Card>,
}

impl Pack {
    pub fn new(id: String, cards: Vec<Card>) -> Self {
        Self { id, cards }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Removes and returns the card matching `card_id`, preserving the
    /// order of the remaining cards.
    pub fn remove_card(&mut self, card_id: &str) -> Option<Card> {
        let idx = self.cards.iter().position(|c| c.id == card_id)?;
        Some(self.cards.remove(idx))
    }
}

/// Per-seat draft state.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct PlayerDraftState {
    pub player_id: PlayerId,
    pub is_bot: bool,
    /// Accumulated picks, append-only until deck building.
    pub pool: Vec<Card>,
    /// Pack currently being picked from.
    pub active_pack: Option<Pack>,
    /// Packs passed to this player, waiting to be opened.
    pub queue: VecDeque<Pack>,
    /// This player's own remaining packs for later rounds.
    pub unopened_packs: VecDeque<Pack>,
    /// Picks taken from the current active pack this turn.
    pub picked_in_current_step: u8,
    /// Deadline for the current active pack.
    pub pick_expires_at: DateTime<Utc>,
    /// True once the player has no active pack and an empty queue,
    /// i.e. stalled pending a new round.
    pub is_waiting: bool,
    /// Populated for bots once deck building is assigned.
    pub deck: Option<Vec<Card>>,
}

impl PlayerDraftState {
    pub fn new(player_id: PlayerId, is_bot: bool, pick_expires_at: DateTime<Utc>) -> Self {
        Self {
            player_id,
            is_bot,
            pool: Vec::new(),
            active_pack: None,
            queue: VecDeque::new(),
            unopened_packs: VecDeque::new(),
            picked_in_current_step: 0,
            pick_expires_at,
            is_waiting: false,
            deck: None,
        }
    }

    /// Count of cards in every location this player currently owns.
    pub fn card_count(&self) -> usize {
        self.pool.len()
            + self.active_pack.as_ref().map_or(0, |p| p.cards.len())
            + self.queue.iter().map(|p| p.cards.len()).sum::<usize>()
            + self
                .unopened_packs
                .iter()
                .map(|p| p.cards.len())
                .sum::<usize>()
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    Drafting,
    DeckBuilding,
    Complete,
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Drafting => "drafting",
            Self::DeckBuilding => "deck_building",
            Self::Complete => "complete",
        };
        write!(f, "{repr}")
    }
}

/// Aggregate root for one draft session.
///
/// Every mutation reads the full aggregate from the store, mutates it in
/// memory, and writes it back while holding the session lock. The store is
/// the sole source of truth; no copy outlives a locked transaction.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct DraftSession {
    pub session_id: SessionId,
    /// Fixed seating order; defines pass direction.
    pub seats: Vec<PlayerId>,
    /// Current round, 1 through 3.
    pub pack_number: u8,
    pub players: HashMap<PlayerId, PlayerDraftState>,
    /// Reference pool used by deck assembly.
    pub basic_lands: Vec<Card>,
    pub status: DraftStatus,
    pub is_paused: bool,
    pub start_time: DateTime<Utc>,
}

impl DraftSession {
    /// Seat index of a player, if seated.
    pub fn seat_of(&self, player_id: &str) -> Option<SeatIndex> {
        self.seats.iter().position(|id| id == player_id)
    }

    /// True iff every seated player is simultaneously stalled. This is the
    /// round-completion barrier condition.
    pub fn all_waiting(&self) -> bool {
        self.seats
            .iter()
            .all(|id| self.players.get(id).is_some_and(|p| p.is_waiting))
    }

    /// Total cards across all packs, queues, and pools. Constant from
    /// creation until deck building (cards only move, never vanish).
    pub fn card_count(&self) -> usize {
        self.players.values().map(PlayerDraftState::card_count).sum()
    }
}
