//! Shared move scoring.
//!
//! Grades a candidate play by two terms:
//! - exposure: how many outstanding holdings could top it, weighted by
//!   whether the seats acting next are opponents or allies;
//! - shape: how tidy the hand is after the play (fewer units, fewer
//!   isolated singles, no broken pairs/triples/bombs).
//!
//! Used to rank the heuristic agent's candidates, to pick the orchestrator's
//! fallback, and to build hints for human seats.

use serde::Serialize;

use crate::ai::trait_def::DecisionContext;
use crate::domain::cards_logic::{rank_counts, remove_cards};
use crate::domain::dealing::full_deck;
use crate::domain::{classify, Card, Combo, ComboKind, Rank};

const WIN_BONUS: f64 = 1000.0;
const OPPONENT_WEIGHTS: [f64; 2] = [1.0, 0.6];
const ALLY_WEIGHT: f64 = 0.2;
const RISK_WEIGHT: f64 = 0.1;

/// Advisory suggestion for a seat.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    /// `None` means passing is advised.
    pub cards: Option<Vec<Card>>,
    pub score: f64,
    pub reason: String,
}

fn unit_width(kind: ComboKind) -> (usize, u8) {
    // (run length divisor, cards per rank)
    match kind {
        ComboKind::Single => (1, 1),
        ComboKind::Pair => (2, 2),
        ComboKind::Triple => (3, 3),
        ComboKind::TripleSingle => (4, 3),
        ComboKind::TriplePair => (5, 3),
        ComboKind::Straight => (1, 1),
        ComboKind::PairSequence => (2, 2),
        ComboKind::Plane => (3, 3),
        ComboKind::PlaneSingles => (4, 3),
        ComboKind::PlanePairs => (5, 3),
        ComboKind::FourTwoSingles => (6, 4),
        ComboKind::FourTwoPairs => (8, 4),
        ComboKind::Bomb => (4, 4),
        ComboKind::Rocket => (2, 1),
    }
}

/// Cards no longer visible to this seat: not in hand and not yet played.
pub fn outstanding(ctx: &DecisionContext) -> Vec<Card> {
    full_deck()
        .into_iter()
        .filter(|c| !ctx.hand.contains(c) && !ctx.seen_by_seat.iter().any(|s| s.contains(c)))
        .collect()
}

/// Outstanding holdings that could beat `combo` without a bomb, plus outstanding bombs.
fn threats(combo: &Combo, out: &[Card]) -> (usize, usize) {
    let counts = rank_counts(out);
    let bombs = counts.iter().filter(|&&c| c == 4).count()
        + usize::from(
            counts[Rank::SmallJoker.index()] > 0 && counts[Rank::BigJoker.index()] > 0,
        );

    let higher = match combo.kind {
        ComboKind::Rocket => 0,
        ComboKind::Bomb => (combo.key.index() + 1..Rank::COUNT)
            .filter(|&i| counts[i] == 4)
            .count(),
        kind => {
            let (divisor, width) = unit_width(kind);
            let run = if matches!(
                kind,
                ComboKind::Straight
                    | ComboKind::PairSequence
                    | ComboKind::Plane
                    | ComboKind::PlaneSingles
                    | ComboKind::PlanePairs
            ) {
                combo.len / divisor
            } else {
                1
            };
            let top = if run > 1 { Rank::Ace.index() } else { Rank::COUNT - 1 };
            (combo.key.index() + 1..=top)
                .filter(|&s| s + run <= top + 1)
                .filter(|&s| (s..s + run).all(|i| counts[i] >= width))
                .count()
        }
    };
    let bombs = if combo.kind == ComboKind::Rocket { 0 } else { bombs };
    (higher, bombs)
}

fn exposure_weight(ctx: &DecisionContext) -> f64 {
    ctx.upcoming(2)
        .into_iter()
        .enumerate()
        .map(|(i, seat)| {
            if ctx.is_ally(seat) {
                ALLY_WEIGHT
            } else {
                OPPONENT_WEIGHTS[i]
            }
        })
        .sum()
}

/// Tidiness of a hand: fewer units and fewer isolated low singles is better.
fn shape_quality(hand: &[Card]) -> f64 {
    let counts = rank_counts(hand);
    let mut q = 0.0;
    for (i, &c) in counts.iter().enumerate() {
        if c == 0 {
            continue;
        }
        q -= 1.0;
        if c == 1 && i < Rank::Ace.index() {
            let lonely = (i == 0 || counts[i - 1] == 0) && counts.get(i + 1).map_or(true, |&n| n == 0);
            if lonely {
                q -= 0.5;
            }
        }
    }
    q
}

/// Penalty for splitting a pair, triple or bomb to make this play.
fn breakage(hand: &[Card], cards: &[Card], combo: &Combo) -> f64 {
    let held = rank_counts(hand);
    let used = rank_counts(cards);
    let mut p = 0.0;
    for i in 0..Rank::COUNT {
        if used[i] == 0 || used[i] >= held[i] {
            continue;
        }
        p += match held[i] {
            4 if combo.kind != ComboKind::Bomb => 4.0,
            3 => 2.0,
            2 => 1.5,
            _ => 0.0,
        };
    }
    p
}

/// Score one candidate play; higher is better.
pub fn score_move(ctx: &DecisionContext, cards: &[Card]) -> f64 {
    let Some(combo) = classify(cards, ctx.policy) else {
        return f64::NEG_INFINITY;
    };
    let mut rest = ctx.hand.clone();
    if remove_cards(&mut rest, cards).is_err() {
        return f64::NEG_INFINITY;
    }
    if rest.is_empty() {
        return WIN_BONUS;
    }

    let (higher, bombs) = threats(&combo, &outstanding(ctx));
    let risk = (higher as f64 + 0.5 * bombs as f64) * exposure_weight(ctx);

    let mut score = shape_quality(&rest) - shape_quality(&ctx.hand);
    score += 0.3 * cards.len() as f64;
    score -= breakage(&ctx.hand, cards, &combo);
    score -= 0.15 * combo.key.index() as f64;
    score -= RISK_WEIGHT * risk;
    if combo.is_bomb_like() {
        // Keep bombs for when they matter.
        score -= if rest.len() <= 4 { 1.0 } else { 6.0 };
    }
    score
}

/// Highest-scoring legal play; earlier candidates win ties.
pub fn best_move(ctx: &DecisionContext) -> Option<(Vec<Card>, f64)> {
    let mut best: Option<(Vec<Card>, f64)> = None;
    for m in &ctx.legal_moves {
        let s = score_move(ctx, m);
        if best.as_ref().map_or(true, |(_, b)| s > *b) {
            best = Some((m.clone(), s));
        }
    }
    best
}

/// Advisory hint for a human seat.
pub fn hint(ctx: &DecisionContext) -> Hint {
    match best_move(ctx) {
        Some((cards, score)) => {
            let kind = classify(&cards, ctx.policy)
                .map(|c| c.kind.as_str())
                .unwrap_or("play");
            Hint {
                reason: format!("best scored {kind}"),
                cards: Some(cards),
                score,
            }
        }
        None => Hint {
            cards: None,
            score: 0.0,
            reason: "no play beats the table".to_string(),
        },
    }
}
