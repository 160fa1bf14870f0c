/// Property-based tests for move generation
use std::collections::HashSet;

use proptest::prelude::*;

use crate::domain::cards_logic::{hand_contains_all, rank_buckets, rank_counts};
use crate::domain::test_gens;
use crate::domain::{classify, generate_moves, Card, Combo, ComboKind, Four2Policy, Rank};

fn policy() -> impl Strategy<Value = Four2Policy> {
    prop_oneof![
        Just(Four2Policy::Both),
        Just(Four2Policy::SinglesOnly),
        Just(Four2Policy::PairsOnly),
    ]
}

/// Every non-empty rank multiset of `hand`, each built from the lowest cards
/// of its ranks.
fn canonical_subsets(hand: &[Card]) -> Vec<Vec<Card>> {
    let mut out: Vec<Vec<Card>> = vec![Vec::new()];
    for bucket in rank_buckets(hand).values() {
        let mut next = Vec::with_capacity(out.len() * (bucket.len() + 1));
        for base in &out {
            for n in 0..=bucket.len() {
                let mut set = base.clone();
                set.extend(bucket.iter().take(n).copied());
                next.push(set);
            }
        }
        out = next;
    }
    out.retain(|set| !set.is_empty());
    out
}

/// Following never splits a four-of-a-kind, except as the body of a four-with-two.
fn keeps_quads_whole(set: &[Card], hand: &[Card], combo: &Combo) -> bool {
    let held = rank_counts(hand);
    let used = rank_counts(set);
    let four_two = matches!(combo.kind, ComboKind::FourTwoSingles | ComboKind::FourTwoPairs);
    Rank::ALL.into_iter().all(|r| {
        let i = r.index();
        held[i] != 4 || used[i] == 0 || (four_two && used[i] == 4 && r == combo.key)
    })
}

proptest! {
    #![proptest_config(test_gens::proptest_config())]

    /// Leading: every generated set is drawn from the hand, classifies, and appears once.
    #[test]
    fn prop_leading_moves_classify(hand in test_gens::hand(), policy in policy()) {
        let moves = generate_moves(&hand, None, policy);
        prop_assert!(!moves.is_empty(), "a non-empty hand can always lead");

        let unique: HashSet<_> = moves.iter().cloned().collect();
        prop_assert_eq!(unique.len(), moves.len());

        for m in &moves {
            prop_assert!(hand_contains_all(&hand, m), "{:?} not in hand", m);
            prop_assert!(classify(m, policy).is_some(), "{:?} does not classify", m);
        }
    }

    /// Following: every generated set beats the requirement.
    #[test]
    fn prop_following_moves_beat_requirement(
        (opponent, hand) in test_gens::two_hands(),
        pick in any::<prop::sample::Index>(),
        policy in policy(),
    ) {
        let leads = generate_moves(&opponent, None, policy);
        let lead = &leads[pick.index(leads.len())];
        let req = classify(lead, policy).unwrap();

        for m in generate_moves(&hand, Some(&req), policy) {
            let combo = classify(&m, policy);
            prop_assert!(combo.is_some(), "{:?} does not classify", m);
            let combo = combo.unwrap();
            prop_assert!(combo.beats(&req), "{:?} does not beat {:?}", m, req.kind);
            prop_assert!(
                combo.kind == req.kind || combo.is_bomb_like(),
                "{:?} changes shape against {:?}", combo.kind, req.kind
            );
        }
    }

    /// Leading: every classifiable rank multiset of the hand is offered.
    #[test]
    fn prop_leading_moves_are_complete(hand in test_gens::dense_hand(), policy in policy()) {
        let moves: HashSet<Vec<Card>> = generate_moves(&hand, None, policy).into_iter().collect();
        for set in canonical_subsets(&hand) {
            if classify(&set, policy).is_some() {
                prop_assert!(moves.contains(&set), "{:?} classifies but is not offered", set);
            }
        }
    }

    /// Following: every same-shape winner that keeps quads whole is offered,
    /// along with every overriding bomb and the rocket.
    #[test]
    fn prop_following_moves_are_complete(
        hand in test_gens::dense_hand(),
        opponent in test_gens::dense_hand(),
        pick in any::<prop::sample::Index>(),
        policy in policy(),
    ) {
        let leads = generate_moves(&opponent, None, policy);
        let req = classify(&leads[pick.index(leads.len())], policy).unwrap();
        let moves: HashSet<Vec<Card>> =
            generate_moves(&hand, Some(&req), policy).into_iter().collect();

        for set in canonical_subsets(&hand) {
            let Some(combo) = classify(&set, policy) else { continue };
            if !combo.beats(&req) {
                continue;
            }
            if combo.is_bomb_like() || keeps_quads_whole(&set, &hand, &combo) {
                prop_assert!(
                    moves.contains(&set),
                    "{:?} beats {:?} but is not offered", set, req.kind
                );
            }
        }
    }
}
