//! Cards observed on the table during one session.
//!
//! Owned by the session that runs the matches and handed to agents by
//! reference; never shared between sessions.

use serde::Serialize;

use crate::domain::cards_logic::hand_contains_all;
use crate::domain::dealing::full_deck;
use crate::domain::rules::PLAYERS;
use crate::domain::state::Seat;
use crate::domain::Card;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SeenCards {
    by_seat: [Vec<Card>; PLAYERS],
}

impl SeenCards {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, seat: Seat, cards: &[Card]) {
        if let Some(slot) = self.by_seat.get_mut(seat as usize) {
            slot.extend_from_slice(cards);
        }
    }

    pub fn reset(&mut self) {
        for slot in &mut self.by_seat {
            slot.clear();
        }
    }

    pub fn by_seat(&self) -> &[Vec<Card>; PLAYERS] {
        &self.by_seat
    }

    pub fn total(&self) -> usize {
        self.by_seat.iter().map(Vec::len).sum()
    }

    /// Cards neither played nor held in `hand`: what the other seats may still hold.
    pub fn outstanding(&self, hand: &[Card]) -> Vec<Card> {
        full_deck()
            .into_iter()
            .filter(|c| !hand.contains(c) && !self.by_seat.iter().any(|s| s.contains(c)))
            .collect()
    }

    pub fn has_seen(&self, cards: &[Card]) -> bool {
        let all: Vec<Card> = self.by_seat.iter().flatten().copied().collect();
        hand_contains_all(&all, cards)
    }
}
