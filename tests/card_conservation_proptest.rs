//! Property-based tests for card conservation and pack ownership.
//!
//! Drafts of arbitrary shape are driven entirely by autopicks; at every
//! observable point, the union of cards across packs, queues, and pools
//! must match what was supplied at creation, and every pack must live in
//! exactly one location.

use std::{collections::HashSet, sync::Arc};

use booster_draft::{
    draft::{Card, Color, DraftConfig, DraftManager, DraftSession, DraftStatus, Pack, Rarity,
        SeatAssignment},
    store::MemoryStore,
};
use proptest::prelude::*;

fn card(pack_idx: usize, card_idx: usize, color_idx: usize, rarity_idx: usize) -> Card {
    let color = Color::ALL[color_idx % Color::ALL.len()];
    let rarity = match rarity_idx % 4 {
        0 => Rarity::Common,
        1 => Rarity::Uncommon,
        2 => Rarity::Rare,
        _ => Rarity::Mythic,
    };
    Card {
        id: format!("{pack_idx}-{card_idx}"),
        name: format!("Card {pack_idx}-{card_idx}"),
        colors: vec![color],
        rarity,
        rank: Some((pack_idx * 97 + card_idx * 13) as u32 % 20_000),
        mana_value: (card_idx % 7) as u8,
        type_line: "Creature".to_string(),
        metadata: serde_json::Value::Null,
    }
}

/// All card ids currently present anywhere in the session.
fn all_card_ids(session: &DraftSession) -> Vec<String> {
    let mut ids = Vec::new();
    for player in session.players.values() {
        ids.extend(player.pool.iter().map(|c| c.id.clone()));
        if let Some(pack) = &player.active_pack {
            ids.extend(pack.cards.iter().map(|c| c.id.clone()));
        }
        for pack in player.queue.iter().chain(player.unopened_packs.iter()) {
            ids.extend(pack.cards.iter().map(|c| c.id.clone()));
        }
    }
    ids
}

/// Every live pack id, across every location.
fn all_pack_ids(session: &DraftSession) -> Vec<String> {
    let mut ids = Vec::new();
    for player in session.players.values() {
        if let Some(pack) = &player.active_pack {
            ids.push(pack.id.clone());
        }
        for pack in player.queue.iter().chain(player.unopened_packs.iter()) {
            ids.push(pack.id.clone());
        }
    }
    ids
}

fn run_draft(seat_count: usize, cards_per_pack: usize) -> Result<(), TestCaseError> {
    let rt = tokio::runtime::Runtime::new().expect("tokio runtime");
    rt.block_on(async {
        let manager = DraftManager::new(Arc::new(MemoryStore::new()), DraftConfig::default());

        let seats: Vec<SeatAssignment> = (0..seat_count)
            .map(|i| SeatAssignment::bot(format!("bot-{i}")))
            .collect();
        let packs: Vec<Pack> = (0..seat_count * 3)
            .map(|p| {
                Pack::new(
                    format!("pack-{p}"),
                    (0..cards_per_pack).map(|c| card(p, c, p + c, c)).collect(),
                )
            })
            .collect();
        let total_cards = seat_count * 3 * cards_per_pack;

        let session = manager
            .create_draft("room-prop", seats, packs, vec![])
            .await
            .expect("create");
        let expected: HashSet<String> = all_card_ids(&session).into_iter().collect();
        prop_assert_eq!(expected.len(), total_cards);

        // Each tick autopicks each seated bot at most once; the whole
        // draft finishes well inside this bound.
        for _ in 0..(total_cards + 8) {
            manager.check_timers().await.expect("sweep");
            let session = manager
                .get_draft("room-prop")
                .await
                .expect("load")
                .expect("exists");

            if session.status == DraftStatus::Drafting {
                // Conservation: nothing vanishes, nothing is duplicated.
                let ids = all_card_ids(&session);
                prop_assert_eq!(ids.len(), total_cards);
                let unique: HashSet<String> = ids.into_iter().collect();
                prop_assert_eq!(&unique, &expected);

                // Exclusive pack location: no pack in two places at once.
                let pack_ids = all_pack_ids(&session);
                let unique_packs: HashSet<&String> = pack_ids.iter().collect();
                prop_assert_eq!(unique_packs.len(), pack_ids.len());
            } else {
                // Pools alone hold everything once drafting ends.
                let pooled: usize = session.players.values().map(|p| p.pool.len()).sum();
                prop_assert_eq!(pooled, total_cards);
                return Ok(());
            }
        }
        panic!("draft did not finish within the tick budget");
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn cards_are_conserved_for_any_table_shape(
        seat_count in 2usize..=6,
        cards_per_pack in 1usize..=5,
    ) {
        run_draft(seat_count, cards_per_pack)?;
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn four_seat_double_picks_also_conserve(cards_per_pack in 2usize..=6) {
        run_draft(4, cards_per_pack)?;
    }
}
