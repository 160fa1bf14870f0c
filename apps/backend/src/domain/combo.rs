//! Combo model: classification of a card multiset into a comparable play.

use serde::Serialize;

use super::cards_logic::{rank_counts, sorted};
use super::cards_types::{Card, Rank};
use super::rules::{Four2Policy, MIN_PAIR_SEQUENCE, MIN_PLANE, MIN_STRAIGHT};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComboKind {
    Single,
    Pair,
    Triple,
    TripleSingle,
    TriplePair,
    Straight,
    PairSequence,
    Plane,
    PlaneSingles,
    PlanePairs,
    FourTwoSingles,
    FourTwoPairs,
    Bomb,
    Rocket,
}

impl ComboKind {
    pub const fn is_bomb_like(self) -> bool {
        matches!(self, ComboKind::Bomb | ComboKind::Rocket)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ComboKind::Single => "single",
            ComboKind::Pair => "pair",
            ComboKind::Triple => "triple",
            ComboKind::TripleSingle => "triple-single",
            ComboKind::TriplePair => "triple-pair",
            ComboKind::Straight => "straight",
            ComboKind::PairSequence => "pair-sequence",
            ComboKind::Plane => "plane",
            ComboKind::PlaneSingles => "plane-singles",
            ComboKind::PlanePairs => "plane-pairs",
            ComboKind::FourTwoSingles => "four-two-singles",
            ComboKind::FourTwoPairs => "four-two-pairs",
            ComboKind::Bomb => "bomb",
            ComboKind::Rocket => "rocket",
        }
    }
}

/// A classified play. Only `classify` constructs one.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Combo {
    pub kind: ComboKind,
    /// Anchor rank compared between combos of the same kind and length.
    pub key: Rank,
    /// Card count.
    pub len: usize,
    /// Constituent cards, sorted ascending.
    pub cards: Vec<Card>,
}

impl Combo {
    fn new(kind: ComboKind, key: Rank, cards: Vec<Card>) -> Combo {
        Combo {
            kind,
            key,
            len: cards.len(),
            cards,
        }
    }

    /// Whether this combo may be played on top of `other`.
    pub fn beats(&self, other: &Combo) -> bool {
        match (self.kind, other.kind) {
            (ComboKind::Rocket, ComboKind::Rocket) => false,
            (ComboKind::Rocket, _) => true,
            (_, ComboKind::Rocket) => false,
            (ComboKind::Bomb, ComboKind::Bomb) => self.key > other.key,
            (ComboKind::Bomb, _) => true,
            (_, ComboKind::Bomb) => false,
            (a, b) => a == b && self.len == other.len && self.key > other.key,
        }
    }

    pub fn is_bomb_like(&self) -> bool {
        self.kind.is_bomb_like()
    }
}

/// Consecutive sequenceable run covering exactly the ranks with a non-zero count,
/// all of which must equal `width`. Returns the lowest rank and the run length.
fn exact_run(counts: &[u8; Rank::COUNT], width: u8) -> Option<(Rank, usize)> {
    let present: Vec<usize> = (0..Rank::COUNT).filter(|&i| counts[i] > 0).collect();
    let first = *present.first()?;
    let last = *present.last()?;
    if present.iter().any(|&i| counts[i] != width) {
        return None;
    }
    if last - first + 1 != present.len() {
        return None;
    }
    let low = Rank::from_index(first)?;
    let high = Rank::from_index(last)?;
    if !high.is_sequenceable() {
        return None;
    }
    Some((low, present.len()))
}

/// All windows of `k` consecutive sequenceable ranks holding at least three cards,
/// highest window first.
fn triple_windows(counts: &[u8; Rank::COUNT], k: usize) -> Vec<usize> {
    let last_start = (Rank::Ace.index() + 1).saturating_sub(k);
    let mut starts: Vec<usize> = (0..=last_start)
        .filter(|&s| (s..s + k).all(|i| counts[i] >= 3))
        .collect();
    starts.reverse();
    starts
}

fn four_with_two(counts: &[u8; Rank::COUNT], n: usize, policy: Four2Policy) -> Option<(ComboKind, Rank)> {
    // Highest quad first so 33334444 anchors on the 4s.
    for q in (0..Rank::COUNT).rev() {
        if counts[q] != 4 {
            continue;
        }
        let mut rest = *counts;
        rest[q] = 0;
        let jokers = rest[Rank::SmallJoker.index()] + rest[Rank::BigJoker.index()];
        let key = Rank::from_index(q)?;
        if n == 6 && policy.allows_singles() && jokers < 2 {
            return Some((ComboKind::FourTwoSingles, key));
        }
        if n == 8 && policy.allows_pairs() && rest.iter().all(|&c| c % 2 == 0) {
            return Some((ComboKind::FourTwoPairs, key));
        }
    }
    None
}

fn plane_with_attachments(counts: &[u8; Rank::COUNT], n: usize) -> Option<(ComboKind, Rank)> {
    // Singles: k triples + k singles.
    if n % 4 == 0 && n / 4 >= MIN_PLANE {
        let k = n / 4;
        for s in triple_windows(counts, k) {
            let mut rest = *counts;
            for c in rest.iter_mut().skip(s).take(k) {
                *c -= 3;
            }
            let both_jokers =
                rest[Rank::SmallJoker.index()] == 1 && rest[Rank::BigJoker.index()] == 1;
            if !both_jokers {
                return Some((ComboKind::PlaneSingles, Rank::from_index(s)?));
            }
        }
    }
    // Pairs: k triples + k pairs.
    if n % 5 == 0 && n / 5 >= MIN_PLANE {
        let k = n / 5;
        for s in triple_windows(counts, k) {
            let mut rest = *counts;
            for c in rest.iter_mut().skip(s).take(k) {
                *c -= 3;
            }
            if rest.iter().all(|&c| c % 2 == 0) {
                return Some((ComboKind::PlanePairs, Rank::from_index(s)?));
            }
        }
    }
    None
}

/// Classify `cards` into a combo, or `None` when the multiset forms no legal shape.
pub fn classify(cards: &[Card], policy: Four2Policy) -> Option<Combo> {
    let n = cards.len();
    if n == 0 {
        return None;
    }
    let cards = sorted(cards);
    let counts = rank_counts(&cards);
    let distinct = counts.iter().filter(|&&c| c > 0).count();
    let rank_with = |want: u8| -> Option<Rank> {
        (0..Rank::COUNT)
            .rev()
            .find(|&i| counts[i] == want)
            .and_then(Rank::from_index)
    };

    if n == 2 && cards[0] == Card::SMALL_JOKER && cards[1] == Card::BIG_JOKER {
        return Some(Combo::new(ComboKind::Rocket, Rank::BigJoker, cards));
    }
    if n == 4 && distinct == 1 {
        return Some(Combo::new(ComboKind::Bomb, cards[0].rank, cards));
    }

    match (n, distinct) {
        (1, 1) => return Some(Combo::new(ComboKind::Single, cards[0].rank, cards)),
        (2, 1) => return Some(Combo::new(ComboKind::Pair, cards[0].rank, cards)),
        (3, 1) => return Some(Combo::new(ComboKind::Triple, cards[0].rank, cards)),
        (4, 2) => {
            if let Some(t) = rank_with(3) {
                return Some(Combo::new(ComboKind::TripleSingle, t, cards));
            }
        }
        (5, 2) => {
            if let (Some(t), Some(_)) = (rank_with(3), rank_with(2)) {
                return Some(Combo::new(ComboKind::TriplePair, t, cards));
            }
        }
        _ => {}
    }

    if n >= MIN_STRAIGHT {
        if let Some((low, _)) = exact_run(&counts, 1) {
            return Some(Combo::new(ComboKind::Straight, low, cards));
        }
    }
    if n >= MIN_PAIR_SEQUENCE * 2 {
        if let Some((low, _)) = exact_run(&counts, 2) {
            return Some(Combo::new(ComboKind::PairSequence, low, cards));
        }
    }
    if n >= MIN_PLANE * 3 {
        if let Some((low, _)) = exact_run(&counts, 3) {
            return Some(Combo::new(ComboKind::Plane, low, cards));
        }
    }
    if let Some((kind, key)) = four_with_two(&counts, n, policy) {
        return Some(Combo::new(kind, key, cards));
    }
    if let Some((kind, key)) = plane_with_attachments(&counts, n) {
        return Some(Combo::new(kind, key, cards));
    }
    None
}
