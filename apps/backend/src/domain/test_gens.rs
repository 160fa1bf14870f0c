// Proptest generators for domain types.
// Hands are drawn from one shuffled deck so cards never repeat.

use proptest::prelude::*;

use crate::domain::dealing::full_deck;
use crate::domain::{Card, Rank};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|s| s.parse::<u32>().ok())
        .unwrap_or(32)
        .max(1);
    ProptestConfig {
        failure_persistence: None,
        cases,
        ..ProptestConfig::default()
    }
}

/// `count` distinct deck cards, sorted.
pub fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    Just(()).prop_perturb(move |_, mut rng| {
        let mut deck = full_deck();
        let n = count.min(deck.len());
        for i in 0..n {
            let j = rng.random_range(i..deck.len());
            deck.swap(i, j);
        }
        deck.truncate(n);
        deck.sort();
        deck
    })
}

/// A hand of 1..=20 cards.
pub fn hand() -> impl Strategy<Value = Vec<Card>> {
    (1usize..=20).prop_flat_map(unique_cards)
}

/// Two disjoint hands of up to 20 cards each.
pub fn two_hands() -> impl Strategy<Value = (Vec<Card>, Vec<Card>)> {
    (1usize..=20, 1usize..=20).prop_flat_map(|(a, b)| {
        unique_cards(a + b).prop_perturb(move |cards, mut rng| {
            let mut cards = cards;
            for i in (1..cards.len()).rev() {
                let j = rng.random_range(0..=i);
                cards.swap(i, j);
            }
            let mut first = cards[..a].to_vec();
            let mut second = cards[a..].to_vec();
            first.sort();
            second.sort();
            (first, second)
        })
    })
}

/// 6..=10 cards from four adjacent ranks plus the jokers, so quads, planes
/// and repeated attachments turn up often.
pub fn dense_hand() -> impl Strategy<Value = Vec<Card>> {
    (0usize..=Rank::Ace.index() - 3, 6usize..=10).prop_perturb(|(low, count), mut rng| {
        let mut pool: Vec<Card> = full_deck()
            .into_iter()
            .filter(|c| c.is_joker() || (low..low + 4).contains(&c.rank.index()))
            .collect();
        for i in 0..count {
            let j = rng.random_range(i..pool.len());
            pool.swap(i, j);
        }
        pool.truncate(count);
        pool.sort();
        pool
    })
}
