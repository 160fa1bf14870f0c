//! Match settlement.

use serde::Serialize;

use crate::domain::bidding::Multiplier;
use crate::domain::rules::PLAYERS;
use crate::domain::state::Seat;

/// Per-seat score deltas for one finished match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settlement {
    pub landlord_won: bool,
    pub unit: i64,
    pub deltas: [i64; PLAYERS],
}

/// Whether the landlord won without either farmer playing a card.
pub fn is_spring(landlord: Seat, winner: Seat, plays_by_seat: &[u32; PLAYERS]) -> bool {
    winner == landlord
        && plays_by_seat
            .iter()
            .enumerate()
            .all(|(seat, &n)| seat == landlord as usize || n == 0)
}

/// Landlord takes or pays `2·unit`, each farmer the opposite `unit`.
pub fn settle(landlord: Seat, winner: Seat, base_score: i64, multiplier: &Multiplier) -> Settlement {
    let total = i64::try_from(multiplier.total()).unwrap_or(i64::MAX / 4);
    let unit = base_score.saturating_mul(total);
    let landlord_won = winner == landlord;
    let sign = if landlord_won { 1 } else { -1 };

    let mut deltas = [0i64; PLAYERS];
    for (seat, d) in deltas.iter_mut().enumerate() {
        *d = if seat == landlord as usize {
            unit.saturating_mul(2 * sign)
        } else {
            unit.saturating_mul(-sign)
        };
    }
    Settlement {
        landlord_won,
        unit,
        deltas,
    }
}
