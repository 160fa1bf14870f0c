//! Explicit default decisions.
//!
//! Used by agents that do not reason about a phase, and by the orchestrator
//! whenever an agent times out, errors or answers illegally.

use crate::ai::scoring::best_move;
use crate::ai::trait_def::{Decision, DecisionContext, Move};
use crate::domain::bidding::{default_bid, default_double};
use crate::domain::cards_logic::lowest_card;
use crate::domain::Role;

pub fn fallback_bid(ctx: &DecisionContext) -> Decision<bool> {
    let bid = default_bid(&ctx.hand);
    Decision::new(bid).with_reason(if bid {
        "default bid: strong hand"
    } else {
        "default bid: weak hand"
    })
}

pub fn fallback_double(ctx: &DecisionContext) -> Decision<bool> {
    let is_landlord = ctx.role == Some(Role::Landlord);
    let bottom = ctx.bottom.as_deref().unwrap_or(&[]);
    let double = default_double(is_landlord, &ctx.hand, bottom);
    Decision::new(double).with_reason(match (is_landlord, double) {
        (true, true) => "default double: bottom lifted the hand",
        (true, false) => "default double: bottom did not help",
        (false, true) => "default double: holding bomb or rocket",
        (false, false) => "default double: no bomb or rocket",
    })
}

/// Best scored legal play, else pass when legal, else the lowest single.
pub fn fallback_play(ctx: &DecisionContext) -> Decision<Move> {
    if let Some((cards, _)) = best_move(ctx) {
        return Decision::new(Move::Play { cards }).with_reason("fallback: best scored play");
    }
    if ctx.can_pass {
        return Decision::new(Move::Pass).with_reason("fallback: pass");
    }
    match lowest_card(&ctx.hand) {
        Some(card) => Decision::new(Move::Play { cards: vec![card] })
            .with_reason("fallback: forced lowest single"),
        None => Decision::new(Move::Pass).with_reason("fallback: empty hand"),
    }
}
