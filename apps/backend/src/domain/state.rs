use serde::Serialize;

use crate::domain::bidding::Multiplier;
use crate::domain::combo::{Combo, ComboKind};
use crate::domain::dealing::Deal;
use crate::domain::rules::{Four2Policy, BOTTOM_SIZE, PLAYERS};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

pub type Seat = u8; // 0..=2

/// Match progression phases.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Cards dealt, nobody has bid yet.
    Dealing,
    Bidding,
    /// Landlord known; bottom not yet merged.
    Reveal,
    /// Optional extra-double round.
    Doubling,
    Playing,
    Finished,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Landlord,
    Farmer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastPlay {
    pub seat: Seat,
    pub cards: Vec<Card>,
    pub combo: Combo,
}

/// Append-only record of committed transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum MatchEvent {
    Bid { seat: Seat, accepted: bool },
    Landlord { seat: Seat },
    Reveal { bottom: Vec<Card> },
    Double { seat: Seat, accepted: bool },
    Play { seat: Seat, cards: Vec<Card>, combo: ComboKind },
    Pass { seat: Seat },
    TrickReset { leader: Seat },
    Finished { winner: Seat },
}

/// One match, from deal to winner.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchState {
    pub policy: Four2Policy,
    pub seed: u64,
    pub hands: [Vec<Card>; PLAYERS],
    pub bottom: [Card; BOTTOM_SIZE],
    pub landlord: Option<Seat>,
    pub phase: Phase,
    /// Seat expected to act next.
    pub turn: Seat,
    /// Combo to beat; `None` when leading.
    pub requirement: Option<Combo>,
    pub last_play: Option<LastPlay>,
    /// Consecutive passes since the last play.
    pub passes: u8,
    pub history: Vec<MatchEvent>,
    /// Plays committed per seat, for the spring check.
    pub plays_by_seat: [u32; PLAYERS],
    pub multiplier: Multiplier,
    pub winner: Option<Seat>,
}

impl MatchState {
    pub fn new(deal: Deal, policy: Four2Policy) -> Self {
        Self {
            policy,
            seed: deal.seed,
            hands: deal.hands,
            bottom: deal.bottom,
            landlord: None,
            phase: Phase::Dealing,
            turn: 0,
            requirement: None,
            last_play: None,
            passes: 0,
            history: Vec::new(),
            plays_by_seat: [0; PLAYERS],
            multiplier: Multiplier::default(),
            winner: None,
        }
    }

    pub fn role(&self, seat: Seat) -> Role {
        if self.landlord == Some(seat) {
            Role::Landlord
        } else {
            Role::Farmer
        }
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat as usize]
    }

    pub fn hand_sizes(&self) -> [usize; PLAYERS] {
        [
            self.hands[0].len(),
            self.hands[1].len(),
            self.hands[2].len(),
        ]
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Dealing -> Bidding.
    pub fn start_bidding(&mut self) -> Result<(), DomainError> {
        require_phase(self, Phase::Dealing)?;
        self.phase = Phase::Bidding;
        Ok(())
    }

    /// Record one interactive bid. Each accepted bid doubles the multiplier.
    pub fn record_bid(&mut self, seat: Seat, accepted: bool) -> Result<(), DomainError> {
        require_phase(self, Phase::Bidding)?;
        require_seat(seat)?;
        if accepted {
            self.multiplier.bid_doublings += 1;
        }
        self.history.push(MatchEvent::Bid { seat, accepted });
        Ok(())
    }

    /// Bidding -> Reveal.
    pub fn set_landlord(&mut self, seat: Seat) -> Result<(), DomainError> {
        require_phase(self, Phase::Bidding)?;
        require_seat(seat)?;
        self.landlord = Some(seat);
        self.turn = seat;
        self.phase = Phase::Reveal;
        self.history.push(MatchEvent::Landlord { seat });
        Ok(())
    }

    /// Reveal: merge the bottom into the landlord's hand. Moves on to Doubling
    /// when an extra-double round is requested, otherwise straight to Playing.
    pub fn reveal(&mut self, with_doubling: bool) -> Result<(), DomainError> {
        require_phase(self, Phase::Reveal)?;
        let landlord = self.landlord.ok_or_else(|| {
            DomainError::validation(ValidationKind::PhaseMismatch, "Landlord not selected")
        })?;
        let hand = &mut self.hands[landlord as usize];
        hand.extend(self.bottom.iter().copied());
        hand.sort();
        self.history.push(MatchEvent::Reveal {
            bottom: self.bottom.to_vec(),
        });
        self.turn = landlord;
        self.phase = if with_doubling {
            Phase::Doubling
        } else {
            Phase::Playing
        };
        Ok(())
    }

    pub fn record_double(&mut self, seat: Seat, accepted: bool) -> Result<(), DomainError> {
        require_phase(self, Phase::Doubling)?;
        require_seat(seat)?;
        if accepted {
            self.multiplier.extra_doublings += 1;
        }
        self.history.push(MatchEvent::Double { seat, accepted });
        Ok(())
    }

    /// Doubling -> Playing.
    pub fn start_play(&mut self) -> Result<(), DomainError> {
        require_phase(self, Phase::Doubling)?;
        self.phase = Phase::Playing;
        Ok(())
    }
}

/// Next seat clockwise.
pub fn next_seat(seat: Seat) -> Seat {
    ((seat as usize + 1) % PLAYERS) as Seat
}

pub fn require_seat(seat: Seat) -> Result<(), DomainError> {
    if (seat as usize) < PLAYERS {
        Ok(())
    } else {
        Err(DomainError::validation(
            ValidationKind::InvalidSeat,
            format!("Invalid seat {seat}"),
        ))
    }
}

pub fn require_phase(state: &MatchState, phase: Phase) -> Result<(), DomainError> {
    if state.phase == Phase::Finished {
        return Err(DomainError::validation(
            ValidationKind::MatchFinished,
            "Match already finished",
        ));
    }
    if state.phase != phase {
        return Err(DomainError::validation(
            ValidationKind::PhaseMismatch,
            format!("Expected phase {phase:?}, found {:?}", state.phase),
        ));
    }
    Ok(())
}

pub fn require_turn(state: &MatchState, seat: Seat) -> Result<(), DomainError> {
    require_seat(seat)?;
    if state.turn != seat {
        return Err(DomainError::validation(
            ValidationKind::OutOfTurn,
            format!("Seat {seat} acted on seat {}'s turn", state.turn),
        ));
    }
    Ok(())
}
