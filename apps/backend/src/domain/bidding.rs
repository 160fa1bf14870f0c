//! Hand-strength evaluation, landlord selection and multiplier bookkeeping.

use serde::{Deserialize, Serialize};

use crate::domain::cards_logic::{rank_counts, remove_cards};
use crate::domain::rules::PLAYERS;
use crate::domain::state::Seat;
use crate::domain::{Card, Rank};

/// Rob score at or above which the default bid policy accepts.
pub const DEFAULT_BID_THRESHOLD: f64 = 7.0;
/// Score the bottom must add for the landlord's default double.
pub const LANDLORD_DOUBLE_GAIN: f64 = 2.0;

/// How the landlord is chosen.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiddingMode {
    /// Argmax of rob scores.
    #[default]
    Auto,
    /// Each seat is asked once, in seat order.
    Interactive,
}

fn longest_run(counts: &[u8; Rank::COUNT], width: u8) -> usize {
    let mut best = 0;
    let mut cur = 0;
    for &c in counts.iter().take(Rank::Ace.index() + 1) {
        if c >= width {
            cur += 1;
            best = best.max(cur);
        } else {
            cur = 0;
        }
    }
    best
}

/// Heuristic hand strength used for bidding.
pub fn eval_rob_score(hand: &[Card]) -> f64 {
    let counts = rank_counts(hand);
    let small = counts[Rank::SmallJoker.index()] > 0;
    let big = counts[Rank::BigJoker.index()] > 0;

    let mut score = 0.0;
    if small && big {
        score += 8.0;
    } else if big {
        score += 4.0;
    } else if small {
        score += 3.0;
    }
    score += 6.0 * counts.iter().filter(|&&c| c == 4).count() as f64;
    score += 2.0 * counts[Rank::Two.index()] as f64;
    score += 1.0 * counts[Rank::Ace.index()] as f64;

    let straight = longest_run(&counts, 1);
    if straight >= 5 {
        score += 0.5 * (straight - 4) as f64;
    }
    let pairs = longest_run(&counts, 2);
    if pairs >= 3 {
        score += 1.0 * (pairs - 2) as f64;
    }
    let planes = longest_run(&counts, 3);
    if planes >= 2 {
        score += 1.5 * (planes - 1) as f64;
    }
    score
}

/// Seat with the highest rob score; the first seat wins ties.
pub fn select_landlord(hands: &[Vec<Card>; PLAYERS]) -> Seat {
    let mut best = 0usize;
    let mut best_score = f64::NEG_INFINITY;
    for (seat, hand) in hands.iter().enumerate() {
        let s = eval_rob_score(hand);
        if s > best_score {
            best = seat;
            best_score = s;
        }
    }
    best as Seat
}

/// Bid policy used when an agent does not decide bids itself.
pub fn default_bid(hand: &[Card]) -> bool {
    eval_rob_score(hand) >= DEFAULT_BID_THRESHOLD
}

/// Post-reveal double policy used when an agent does not decide doubles itself.
///
/// Provisional: the landlord doubles when the bottom lifted its score enough,
/// farmers double when holding a bomb or the rocket.
pub fn default_double(is_landlord: bool, hand: &[Card], bottom: &[Card]) -> bool {
    if is_landlord {
        let mut before = hand.to_vec();
        if remove_cards(&mut before, bottom).is_err() {
            return false;
        }
        eval_rob_score(hand) - eval_rob_score(&before) >= LANDLORD_DOUBLE_GAIN
    } else {
        let counts = rank_counts(hand);
        let rocket =
            counts[Rank::SmallJoker.index()] > 0 && counts[Rank::BigJoker.index()] > 0;
        rocket || counts.contains(&4)
    }
}

/// Settlement multiplier with its breakdown.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Multiplier {
    pub bid_doublings: u32,
    pub extra_doublings: u32,
    pub bombs: u32,
    pub rocket: u32,
    pub spring: bool,
}

impl Multiplier {
    pub fn doublings(&self) -> u32 {
        self.bid_doublings + self.extra_doublings + self.bombs + self.rocket + u32::from(self.spring)
    }

    /// `2^doublings`, saturating.
    pub fn total(&self) -> u64 {
        1u64.checked_shl(self.doublings()).unwrap_or(u64::MAX)
    }
}
