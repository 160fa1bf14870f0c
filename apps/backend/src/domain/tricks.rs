use serde::Serialize;

use crate::domain::cards_logic::{hand_contains_all, lowest_card, remove_cards, sorted};
use crate::domain::combo::{classify, Combo, ComboKind};
use crate::domain::moves::generate_moves;
use crate::domain::rules::PLAYERS;
use crate::domain::scoring::is_spring;
use crate::domain::state::{
    next_seat, require_phase, require_turn, LastPlay, MatchEvent, MatchState, Phase, Seat,
};
use crate::domain::Card;
use crate::errors::domain::{DomainError, ValidationKind};

/// Result of a committed play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayOutcome {
    pub combo: Combo,
    pub cards_left: usize,
    /// Bomb or rocket: the multiplier just doubled.
    pub doubled: bool,
    /// The play emptied the hand and ended the match.
    pub finished: bool,
}

/// Result of a committed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassOutcome {
    /// All other seats passed; the requirement cleared and `leader` leads again.
    pub trick_reset: bool,
    pub leader: Option<Seat>,
}

/// What the acting seat may do right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegalActions {
    pub plays: Vec<Vec<Card>>,
    pub can_pass: bool,
}

/// Pass is legal only against a live requirement set by another seat.
pub fn can_pass(state: &MatchState, seat: Seat) -> bool {
    state.phase == Phase::Playing
        && state.requirement.is_some()
        && state.last_play.as_ref().is_some_and(|lp| lp.seat != seat)
}

pub fn legal_actions(state: &MatchState, seat: Seat) -> LegalActions {
    if state.phase != Phase::Playing || seat as usize >= PLAYERS {
        return LegalActions {
            plays: Vec::new(),
            can_pass: false,
        };
    }
    LegalActions {
        plays: generate_moves(state.hand(seat), state.requirement.as_ref(), state.policy),
        can_pass: can_pass(state, seat),
    }
}

/// Deadlock guard: the lowest single when the seat can neither play nor pass.
pub fn forced_play(state: &MatchState, seat: Seat) -> Option<Vec<Card>> {
    let actions = legal_actions(state, seat);
    if !actions.plays.is_empty() || actions.can_pass {
        return None;
    }
    lowest_card(state.hand(seat)).map(|c| vec![c])
}

/// Validate a play without touching the state.
pub fn validate_play(state: &MatchState, seat: Seat, cards: &[Card]) -> Result<Combo, DomainError> {
    require_phase(state, Phase::Playing)?;
    require_turn(state, seat)?;
    if !hand_contains_all(state.hand(seat), cards) {
        return Err(DomainError::validation(
            ValidationKind::CardNotInHand,
            "Card not in hand",
        ));
    }
    let combo = classify(cards, state.policy).ok_or_else(|| {
        DomainError::validation(ValidationKind::InvalidCombo, "Cards do not form a combo")
    })?;
    if let Some(req) = &state.requirement {
        if !combo.beats(req) {
            return Err(DomainError::validation(
                ValidationKind::DoesNotBeat,
                format!("{} does not beat {}", combo.kind.as_str(), req.kind.as_str()),
            ));
        }
    }
    Ok(combo)
}

/// Play `cards` for `seat`. Validates fully before mutating anything.
pub fn play(state: &mut MatchState, seat: Seat, cards: &[Card]) -> Result<PlayOutcome, DomainError> {
    let combo = validate_play(state, seat, cards)?;
    let cards = sorted(cards);

    remove_cards(&mut state.hands[seat as usize], &cards)?;
    state.requirement = Some(combo.clone());
    state.last_play = Some(LastPlay {
        seat,
        cards: cards.clone(),
        combo: combo.clone(),
    });
    state.passes = 0;
    state.plays_by_seat[seat as usize] += 1;
    state.history.push(MatchEvent::Play {
        seat,
        cards,
        combo: combo.kind,
    });

    let doubled = match combo.kind {
        ComboKind::Bomb => {
            state.multiplier.bombs += 1;
            true
        }
        ComboKind::Rocket => {
            state.multiplier.rocket += 1;
            true
        }
        _ => false,
    };

    let cards_left = state.hand(seat).len();
    let finished = cards_left == 0;
    if finished {
        state.winner = Some(seat);
        if let Some(landlord) = state.landlord {
            state.multiplier.spring = is_spring(landlord, seat, &state.plays_by_seat);
        }
        state.phase = Phase::Finished;
        state.history.push(MatchEvent::Finished { winner: seat });
    } else {
        state.turn = next_seat(seat);
    }

    Ok(PlayOutcome {
        combo,
        cards_left,
        doubled,
        finished,
    })
}

/// Pass for `seat`. After `PLAYERS - 1` consecutive passes the trick resets.
pub fn pass(state: &mut MatchState, seat: Seat) -> Result<PassOutcome, DomainError> {
    require_phase(state, Phase::Playing)?;
    require_turn(state, seat)?;
    if !can_pass(state, seat) {
        return Err(DomainError::validation(
            ValidationKind::PassNotAllowed,
            "Cannot pass while leading",
        ));
    }

    state.passes += 1;
    state.history.push(MatchEvent::Pass { seat });

    if state.passes as usize >= PLAYERS - 1 {
        let leader = state.last_play.as_ref().map(|lp| lp.seat).unwrap_or(seat);
        state.requirement = None;
        state.passes = 0;
        state.turn = leader;
        state.history.push(MatchEvent::TrickReset { leader });
        return Ok(PassOutcome {
            trick_reset: true,
            leader: Some(leader),
        });
    }

    state.turn = next_seat(seat);
    Ok(PassOutcome {
        trick_reset: false,
        leader: None,
    })
}
