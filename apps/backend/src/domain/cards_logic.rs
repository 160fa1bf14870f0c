//! Hand bookkeeping: rank buckets, multiset containment and removal

use std::collections::BTreeMap;

use super::cards_types::{Card, Rank};
use crate::errors::domain::{DomainError, ValidationKind};

/// Count of cards per rank, indexed by `Rank::index()`.
pub fn rank_counts(cards: &[Card]) -> [u8; Rank::COUNT] {
    let mut counts = [0u8; Rank::COUNT];
    for c in cards {
        counts[c.rank.index()] += 1;
    }
    counts
}

/// Cards grouped by rank; each bucket is sorted ascending.
pub fn rank_buckets(cards: &[Card]) -> BTreeMap<Rank, Vec<Card>> {
    let mut buckets: BTreeMap<Rank, Vec<Card>> = BTreeMap::new();
    for c in cards {
        buckets.entry(c.rank).or_default().push(*c);
    }
    for bucket in buckets.values_mut() {
        bucket.sort();
    }
    buckets
}

/// Whether `hand` holds every card in `cards` (as a multiset).
pub fn hand_contains_all(hand: &[Card], cards: &[Card]) -> bool {
    let mut remaining = hand.to_vec();
    for c in cards {
        match remaining.iter().position(|h| h == c) {
            Some(pos) => {
                remaining.swap_remove(pos);
            }
            None => return false,
        }
    }
    true
}

/// Remove `cards` from `hand`, failing without touching `hand` if any is missing.
pub fn remove_cards(hand: &mut Vec<Card>, cards: &[Card]) -> Result<(), DomainError> {
    if !hand_contains_all(hand, cards) {
        return Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            "Card not in hand",
        ));
    }
    for c in cards {
        if let Some(pos) = hand.iter().position(|h| h == c) {
            hand.remove(pos);
        }
    }
    Ok(())
}

/// The weakest card of the hand.
pub fn lowest_card(hand: &[Card]) -> Option<Card> {
    hand.iter().copied().min()
}

/// Sorted copy, used as a canonical key for card sets.
pub fn sorted(cards: &[Card]) -> Vec<Card> {
    let mut v = cards.to_vec();
    v.sort();
    v
}
