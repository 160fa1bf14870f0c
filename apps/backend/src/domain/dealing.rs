//! Deterministic card dealing logic.

use crate::domain::rules::{BOTTOM_SIZE, DECK_SIZE, HAND_SIZE, PLAYERS};
use crate::domain::{Card, Rank, Suit};

/// Generate the full 54-card deck in standard order.
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for rank in Rank::SUITED {
        for suit in Suit::ALL {
            deck.push(Card::new(rank, suit));
        }
    }
    deck.push(Card::SMALL_JOKER);
    deck.push(Card::BIG_JOKER);
    deck
}

/// Simple deterministic RNG for shuffling.
///
/// SplitMix64: fast and well-distributed, reproducible from a seed.
struct SimpleLcg {
    state: u64,
}

impl SimpleLcg {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next(&mut self) -> u64 {
        self.state = self.state.wrapping_add(0x9E3779B97F4A7C15);
        let mut z = self.state;
        z ^= z >> 30;
        z = z.wrapping_mul(0xBF58476D1CE4E5B9);
        z ^= z >> 27;
        z = z.wrapping_mul(0x94D049BB133111EB);
        z ^ (z >> 31)
    }

    fn next_range(&mut self, max: usize) -> usize {
        let m = max as u64;
        // Rejection sampling above the largest multiple of m avoids modulo bias.
        let limit = u64::MAX - (u64::MAX % m);
        loop {
            let x = self.next();
            if x < limit {
                return (x % m) as usize;
            }
        }
    }
}

/// Fisher-Yates shuffle using deterministic RNG.
fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = SimpleLcg::new(seed);
    for i in (1..deck.len()).rev() {
        let j = rng.next_range(i + 1);
        deck.swap(i, j);
    }
}

/// Result of one deal: three sorted hands plus the bottom cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub seed: u64,
    pub hands: [Vec<Card>; PLAYERS],
    pub bottom: [Card; BOTTOM_SIZE],
}

/// Deal 17/17/17 + 3 from `seed`, or from a fresh random seed when `None`.
pub fn deal(seed: Option<u64>) -> Deal {
    let seed = seed.unwrap_or_else(rand::random::<u64>);
    let mut deck = full_deck();
    shuffle_with_seed(&mut deck, seed);

    let mut hands: [Vec<Card>; PLAYERS] = Default::default();
    for (seat, hand) in hands.iter_mut().enumerate() {
        let start = seat * HAND_SIZE;
        let mut cards = deck[start..start + HAND_SIZE].to_vec();
        cards.sort();
        *hand = cards;
    }
    let rest = &deck[PLAYERS * HAND_SIZE..];
    let bottom = [rest[0], rest[1], rest[2]];

    Deal {
        seed,
        hands,
        bottom,
    }
}
