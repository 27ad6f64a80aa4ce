//! Bot card-selection heuristic.
//!
//! Pure scoring of an open pack against the bot's accumulated pool.
//! Deterministic given its inputs: ties are broken by input order, and any
//! shuffling happens upstream of this module.

use std::collections::HashMap;

use crate::draft::entities::{Card, Color, Rarity};

// === Rarity Tier Values ===

/// Score contribution for a mythic rare.
const TIER_MYTHIC: f32 = 5.0;

/// Score contribution for a rare.
const TIER_RARE: f32 = 4.0;

/// Score contribution for an uncommon.
const TIER_UNCOMMON: f32 = 3.0;

/// Score contribution for a common.
const TIER_COMMON: f32 = 2.0;

// === Popularity ===

/// Only cards ranked inside the top this-many receive a popularity bonus.
const POPULARITY_RANK_CUTOFF: u32 = 10_000;

/// Maximum popularity bonus (rank 1). Falls off linearly to zero at the
/// cutoff.
const POPULARITY_BONUS_MAX: f32 = 2.0;

// === Color Commitment ===

/// Pool size at which the bot is considered committed to its two most
/// frequent colors.
const COMMITMENT_THRESHOLD: usize = 5;

/// On-color bonus before the commitment threshold.
const EARLY_COLOR_BONUS: f32 = 1.0;

/// On-color bonus once committed.
const COMMITTED_COLOR_BONUS: f32 = 3.0;

/// Penalty for splashing a third color once committed.
const SPLASH_PENALTY: f32 = 1.0;

/// Flat bonus for colorless/artifact filler, playable in any deck.
const COLORLESS_FILLER_BONUS: f32 = 0.5;

fn tier_value(rarity: Rarity) -> f32 {
    match rarity {
        Rarity::Mythic => TIER_MYTHIC,
        Rarity::Rare => TIER_RARE,
        Rarity::Uncommon => TIER_UNCOMMON,
        Rarity::Common => TIER_COMMON,
    }
}

/// The pool's two most frequent colors, ties broken by the fixed color
/// order so the result is deterministic.
fn committed_colors(pool: &[Card]) -> Vec<Color> {
    let mut counts: HashMap<Color, usize> = HashMap::new();
    for card in pool {
        for color in &card.colors {
            *counts.entry(*color).or_default() += 1;
        }
    }

    let mut ranked: Vec<(Color, usize)> = Color::ALL
        .iter()
        .filter_map(|c| counts.get(c).map(|n| (*c, *n)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(2).map(|(c, _)| c).collect()
}

fn score_card(card: &Card, committed: &[Color], pool_size: usize) -> f32 {
    let mut score = tier_value(card.rarity);

    if let Some(rank) = card.rank
        && rank >= 1
        && rank <= POPULARITY_RANK_CUTOFF
    {
        score += POPULARITY_BONUS_MAX * (POPULARITY_RANK_CUTOFF - rank) as f32
            / POPULARITY_RANK_CUTOFF as f32;
    }

    if card.is_colorless() {
        score += COLORLESS_FILLER_BONUS;
    } else {
        let on_color = card.colors.iter().any(|c| committed.contains(c));
        let off_color = card.colors.iter().any(|c| !committed.contains(c));

        if on_color {
            score += if pool_size >= COMMITMENT_THRESHOLD {
                COMMITTED_COLOR_BONUS
            } else {
                EARLY_COLOR_BONUS
            };
        }
        if off_color && pool_size >= COMMITMENT_THRESHOLD {
            score -= SPLASH_PENALTY;
        }
    }

    score
}

/// Pick the best card from `open_cards` given the bot's accumulated
/// `pool`. Returns `None` only when the pack is empty. Ties go to the
/// earlier card.
pub fn select_best_card<'a>(open_cards: &'a [Card], pool: &[Card]) -> Option<&'a Card> {
    let committed = committed_colors(pool);
    let mut best: Option<(&Card, f32)> = None;
    for card in open_cards {
        let score = score_card(card, &committed, pool.len());
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((card, score)),
        }
    }
    best.map(|(card, _)| card)
}
