//! Property tests for dealing (pure domain).
//!
//! Properties tested:
//! - A deal partitions the 54-card deck into 17/17/17 plus a 3-card bottom
//! - Hands come back sorted
//! - The same derived seed always produces the same deal

include!("../../common/proptest_prelude.rs");

use std::collections::HashSet;

use arena_backend::domain::rules::{BOTTOM_SIZE, DECK_SIZE, HAND_SIZE};
use arena_backend::domain::{classify, deal, derive_dealing_seed, generate_moves, Card, Four2Policy};
use proptest::prelude::*;

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Property: hands and bottom are disjoint and cover the whole deck.
    #[test]
    fn prop_deal_partitions_deck(seed in any::<u64>()) {
        let d = deal(Some(seed));

        let mut all: Vec<Card> = Vec::new();
        for hand in &d.hands {
            prop_assert_eq!(hand.len(), HAND_SIZE);
            all.extend(hand.iter().copied());
        }
        prop_assert_eq!(d.bottom.len(), BOTTOM_SIZE);
        all.extend(d.bottom.iter().copied());

        let unique: HashSet<Card> = all.iter().copied().collect();
        prop_assert_eq!(all.len(), DECK_SIZE);
        prop_assert_eq!(unique.len(), DECK_SIZE, "a card was dealt twice");
    }

    /// Property: every hand is sorted ascending.
    #[test]
    fn prop_hands_are_sorted(seed in any::<u64>()) {
        let d = deal(Some(seed));
        for hand in &d.hands {
            prop_assert!(hand.windows(2).all(|w| w[0] <= w[1]));
        }
    }

    /// Property: a session seed and match number pin the deal.
    #[test]
    fn prop_derived_seed_is_reproducible(session_seed in any::<u64>(), match_no in 1u32..=100) {
        let seed = derive_dealing_seed(session_seed, match_no);
        prop_assert_eq!(deal(Some(seed)), deal(Some(seed)));
    }

    /// Property: every lead the generator offers for a dealt hand is a real combo.
    #[test]
    fn prop_leads_from_dealt_hand_classify(seed in any::<u64>()) {
        let d = deal(Some(seed));
        let moves = generate_moves(&d.hands[0], None, Four2Policy::Both);
        prop_assert!(!moves.is_empty());
        for mv in &moves {
            prop_assert!(classify(mv, Four2Policy::Both).is_some(), "unclassifiable lead {:?}", mv);
        }
    }
}
