//! Bot deck assembly.
//!
//! Converts a finished draft pool plus a basic land supply into a playable
//! 40-card deck. Pure and deterministic.

use std::collections::HashMap;

use uuid::Uuid;

use crate::draft::entities::{Card, Color, Rarity};

/// Target deck size, spells plus lands.
const DECK_SIZE: usize = 40;

/// Maximum number of non-land spells; the rest is lands.
const SPELL_TARGET: usize = 23;

/// Per-bucket caps for the first curve pass, keyed by mana value
/// (2-or-less, 3, 4, 5, 6-or-more).
const CURVE_CAPS: [(u8, usize); 5] = [(2, 7), (3, 6), (4, 4), (5, 3), (6, 3)];

fn curve_bucket(mana_value: u8) -> u8 {
    mana_value.clamp(2, 6)
}

/// The pool's two strongest colors by rarity-weighted occurrence, ties
/// broken by the fixed color order.
fn strongest_colors(pool: &[Card]) -> Vec<Color> {
    let mut strength: HashMap<Color, u32> = HashMap::new();
    for card in pool {
        for color in &card.colors {
            *strength.entry(*color).or_default() += card.rarity.weight();
        }
    }

    let mut ranked: Vec<(Color, u32)> = Color::ALL
        .iter()
        .filter_map(|c| strength.get(c).map(|w| (*c, *w)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(2).map(|(c, _)| c).collect()
}

/// Choose up to 23 spells: playable colors only, best rarity first, one
/// curve-capped pass and then a cap-free fill.
fn choose_spells(pool: &[Card], colors: &[Color]) -> Vec<Card> {
    let mut candidates: Vec<&Card> = pool
        .iter()
        .filter(|c| !c.is_land())
        .filter(|c| c.colors.iter().all(|color| colors.contains(color)))
        .collect();
    candidates.sort_by(|a, b| b.rarity.weight().cmp(&a.rarity.weight()));

    let mut chosen: Vec<Card> = Vec::with_capacity(SPELL_TARGET);
    let mut bucket_counts: HashMap<u8, usize> = HashMap::new();
    let mut leftovers: Vec<&Card> = Vec::new();

    for card in candidates {
        if chosen.len() == SPELL_TARGET {
            break;
        }
        let bucket = curve_bucket(card.mana_value);
        let cap = CURVE_CAPS
            .iter()
            .find(|(b, _)| *b == bucket)
            .map_or(0, |(_, cap)| *cap);
        let count = bucket_counts.entry(bucket).or_default();
        if *count < cap {
            *count += 1;
            chosen.push(card.clone());
        } else {
            leftovers.push(card);
        }
    }

    // Second pass ignores the curve caps.
    for card in leftovers {
        if chosen.len() == SPELL_TARGET {
            break;
        }
        chosen.push(card.clone());
    }

    chosen
}

/// Split `total` lands across the two colors in proportion to their
/// occurrence among the chosen spells, then nudge the largest allocation
/// until the sum matches exactly.
fn allocate_lands(spells: &[Card], colors: &[Color], total: usize) -> Vec<(Color, usize)> {
    if colors.is_empty() || total == 0 {
        return colors.iter().map(|c| (*c, 0)).collect();
    }

    let occurrences: Vec<usize> = colors
        .iter()
        .map(|color| {
            spells
                .iter()
                .filter(|card| card.colors.contains(color))
                .count()
        })
        .collect();
    let symbol_total: usize = occurrences.iter().sum();

    let mut allocation: Vec<(Color, usize)> = if symbol_total == 0 {
        colors.iter().map(|c| (*c, total / colors.len())).collect()
    } else {
        colors
            .iter()
            .zip(&occurrences)
            .map(|(c, n)| (*c, total * n / symbol_total))
            .collect()
    };

    // Rounding correction: add to or remove from the currently largest
    // allocation until the total is exact.
    loop {
        let allocated: usize = allocation.iter().map(|(_, n)| n).sum();
        if allocated == total {
            break;
        }
        let Some(largest) = allocation.iter_mut().max_by_key(|(_, n)| *n) else {
            break;
        };
        if allocated < total {
            largest.1 += 1;
        } else {
            largest.1 -= 1;
        }
    }

    allocation
}

/// A basic land card for `color`: cloned from the supply when available,
/// otherwise a synthetic placeholder.
fn land_for(color: Color, supply: &[Card]) -> Card {
    let name = color.basic_land_name();
    if let Some(template) = supply.iter().find(|c| c.name == name) {
        let mut land = template.clone();
        land.id = Uuid::new_v4().to_string();
        return land;
    }
    Card {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        colors: vec![color],
        rarity: Rarity::Common,
        rank: None,
        mana_value: 0,
        type_line: "Basic Land".to_string(),
        metadata: serde_json::Value::Null,
    }
}

/// Build a 40-card deck from a finished pool: the two strongest colors'
/// best spells on a mana curve, filled out with basic lands.
pub fn build_deck(pool: &[Card], basic_lands: &[Card]) -> Vec<Card> {
    let colors = strongest_colors(pool);
    let spells = choose_spells(pool, &colors);

    let land_total = DECK_SIZE.saturating_sub(spells.len());
    let mut deck = spells.clone();
    for (color, count) in allocate_lands(&spells, &colors, land_total) {
        for _ in 0..count {
            deck.push(land_for(color, basic_lands));
        }
    }

    // An all-colorless pool has no color to key lands from; pad with the
    // first basic so the deck still reaches 40.
    while deck.len() < DECK_SIZE {
        deck.push(land_for(Color::White, basic_lands));
    }

    deck
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: &str, colors: Vec<Color>, rarity: Rarity, mana_value: u8) -> Card {
        Card {
            id: id.to_string(),
            name: id.to_string(),
            colors,
            rarity,
            rank: None,
            mana_value,
            type_line: "Creature".to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    /// A plausible two-color pool: 45 cards across red, green, and blue.
    fn sample_pool() -> Vec<Card> {
        let mut pool = Vec::new();
        for i in 0..18 {
            pool.push(card(
                &format!("r{i}"),
                vec![Color::Red],
                if i == 0 { Rarity::Rare } else { Rarity::Common },
                2 + (i % 5) as u8,
            ));
        }
        for i in 0..15 {
            pool.push(card(
                &format!("g{i}"),
                vec![Color::Green],
                if i < 2 { Rarity::Uncommon } else { Rarity::Common },
                2 + (i % 5) as u8,
            ));
        }
        for i in 0..12 {
            pool.push(card(
                &format!("u{i}"),
                vec![Color::Blue],
                Rarity::Common,
                3,
            ));
        }
        pool
    }

    #[test]
    fn deck_is_exactly_forty_cards() {
        let deck = build_deck(&sample_pool(), &[]);
        assert_eq!(deck.len(), 40);
    }

    #[test]
    fn spells_stay_inside_the_two_chosen_colors() {
        let deck = build_deck(&sample_pool(), &[]);
        let spells: Vec<&Card> = deck.iter().filter(|c| !c.is_land()).collect();
        assert!(spells.len() <= SPELL_TARGET);
        // Red and green outweigh blue; no blue spell may appear.
        assert!(spells.iter().all(|c| !c.colors.contains(&Color::Blue)));
    }

    #[test]
    fn lands_fill_the_remainder() {
        let deck = build_deck(&sample_pool(), &[]);
        let lands = deck.iter().filter(|c| c.is_land()).count();
        let spells = deck.len() - lands;
        assert_eq!(spells + lands, DECK_SIZE);
        assert!(lands >= DECK_SIZE - SPELL_TARGET);
    }

    #[test]
    fn land_split_follows_color_occurrence() {
        let spells = vec![
            card("r1", vec![Color::Red], Rarity::Common, 2),
            card("r2", vec![Color::Red], Rarity::Common, 2),
            card("r3", vec![Color::Red], Rarity::Common, 3),
            card("g1", vec![Color::Green], Rarity::Common, 3),
        ];
        let allocation = allocate_lands(&spells, &[Color::Red, Color::Green], 17);
        let total: usize = allocation.iter().map(|(_, n)| n).sum();
        assert_eq!(total, 17);
        let red = allocation[0].1;
        let green = allocation[1].1;
        assert!(red > green, "3:1 spell split should favor red lands");
    }

    #[test]
    fn rounding_correction_hits_the_exact_total() {
        // 1:1 occurrence, odd land count: correction must land on 17.
        let spells = vec![
            card("r1", vec![Color::Red], Rarity::Common, 2),
            card("g1", vec![Color::Green], Rarity::Common, 2),
        ];
        let allocation = allocate_lands(&spells, &[Color::Red, Color::Green], 17);
        assert_eq!(allocation.iter().map(|(_, n)| n).sum::<usize>(), 17);
    }

    #[test]
    fn supply_lands_are_cloned_with_fresh_ids() {
        let mut island = card("supply-island", vec![], Rarity::Common, 0);
        island.name = "Mountain".to_string();
        island.type_line = "Basic Land".to_string();

        let deck = build_deck(&sample_pool(), &[island]);
        let mountains: Vec<&Card> = deck.iter().filter(|c| c.name == "Mountain").collect();
        assert!(!mountains.is_empty());
        // Instances are distinct cards, not shared ids.
        assert!(mountains.iter().all(|c| c.id != "supply-island"));
    }

    #[test]
    fn empty_supply_falls_back_to_placeholders() {
        let deck = build_deck(&sample_pool(), &[]);
        let lands: Vec<&Card> = deck.iter().filter(|c| c.is_land()).collect();
        assert!(!lands.is_empty());
        assert!(lands.iter().all(|c| c.type_line == "Basic Land"));
    }

    #[test]
    fn first_curve_pass_respects_bucket_caps() {
        // 23 two-drops: the curve pass caps at 7, the fill pass takes the
        // rest, so all 23 still make the deck.
        let pool: Vec<Card> = (0..23)
            .map(|i| card(&format!("r{i}"), vec![Color::Red], Rarity::Common, 2))
            .collect();
        let spells = choose_spells(&pool, &[Color::Red]);
        assert_eq!(spells.len(), 23);
    }

    #[test]
    fn higher_rarity_spells_are_preferred() {
        // 30 commons and one mythic; the mythic must make the cut.
        let mut pool: Vec<Card> = (0..30)
            .map(|i| card(&format!("c{i}"), vec![Color::Red], Rarity::Common, 3))
            .collect();
        pool.push(card("bomb", vec![Color::Red], Rarity::Mythic, 4));

        let deck = build_deck(&pool, &[]);
        assert!(deck.iter().any(|c| c.id == "bomb"));
    }
}
