//! Heuristic: deterministic built-in agent.
//!
//! Play strategy:
//! - Take a winning play whenever one exists.
//! - Following an ally: pass.
//! - Following an opponent: play the best scored candidate, but hold bombs
//!   back unless the opponent is close to going out.
//! - Leading: play the best scored candidate.
//!
//! Bidding and doubling use the defaults in `ai::defaults`.
//!
//! Determinism: no randomness; ties resolve to the earliest candidate.

use async_trait::async_trait;

use crate::ai::defaults::{fallback_bid, fallback_double, fallback_play};
use crate::ai::scoring::score_move;
use crate::ai::trait_def::{AgentKind, AiError, AiPlayer, Decision, DecisionContext, Move};
use crate::domain::{classify, Card};

/// Opponent hand size at or below which bombs are spent freely.
const BOMB_URGENCY: usize = 4;

#[derive(Clone, Default)]
pub struct Heuristic;

impl Heuristic {
    pub const NAME: &'static str = "heuristic";
    pub const VERSION: &'static str = "1.0.0";

    pub fn new() -> Self {
        Self
    }

    /// Synchronous play decision.
    pub fn decide_play(ctx: &DecisionContext) -> Decision<Move> {
        let mut ranked: Vec<(&Vec<Card>, f64)> = ctx
            .legal_moves
            .iter()
            .map(|m| (m, score_move(ctx, m)))
            .collect();
        // Stable sort keeps generator order among equal scores.
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        let Some((best, best_score)) = ranked.first().map(|(m, s)| ((*m).clone(), *s)) else {
            return if ctx.can_pass {
                Decision::new(Move::Pass).with_reason("nothing beats the table")
            } else {
                // Only reachable when the orchestrator handed over no moves.
                fallback_play(ctx)
            };
        };

        if best.len() == ctx.hand.len() {
            return Decision::new(Move::Play { cards: best }).with_reason("going out");
        }

        if !ctx.can_pass {
            return Decision::new(Move::Play { cards: best })
                .with_reason(format!("lead, score {best_score:.2}"));
        }

        let following_ally = ctx.last_play_seat.is_some_and(|s| ctx.is_ally(s));
        if following_ally {
            return Decision::new(Move::Pass).with_reason("let ally's play stand");
        }

        let opponent_close = (0..ctx.hand_sizes.len())
            .filter(|&s| s as u8 != ctx.seat && !ctx.is_ally(s as u8))
            .any(|s| ctx.hand_sizes[s] <= BOMB_URGENCY);

        let pick = ranked
            .iter()
            .find(|(m, _)| {
                opponent_close
                    || classify(m, ctx.policy).is_some_and(|c| !c.is_bomb_like())
            })
            .map(|(m, s)| ((*m).clone(), *s));

        match pick {
            Some((cards, score)) => Decision::new(Move::Play { cards })
                .with_reason(format!("follow, score {score:.2}")),
            None => Decision::new(Move::Pass).with_reason("holding bombs back"),
        }
    }
}

#[async_trait]
impl AiPlayer for Heuristic {
    fn kind(&self) -> AgentKind {
        AgentKind::Heuristic
    }

    fn label(&self) -> String {
        format!("{}@{}", Self::NAME, Self::VERSION)
    }

    async fn choose_bid(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError> {
        Ok(fallback_bid(ctx))
    }

    async fn choose_double(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError> {
        Ok(fallback_double(ctx))
    }

    async fn choose_play(&self, ctx: &DecisionContext) -> Result<Decision<Move>, AiError> {
        Ok(Self::decide_play(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::scoring::test_support::play_ctx;
    use crate::domain::{try_parse_cards, Four2Policy};

    fn c(tokens: &[&str]) -> Vec<Card> {
        try_parse_cards(tokens).unwrap()
    }

    #[test]
    fn goes_out_when_possible() {
        let ctx = play_ctx(0, 0, c(&["5S", "5H"]), None);
        assert_eq!(
            Heuristic::decide_play(&ctx).value,
            Move::Play { cards: c(&["5S", "5H"]) }
        );
    }

    #[test]
    fn leads_something_legal() {
        let ctx = play_ctx(0, 0, c(&["3S", "7H", "7D", "QC"]), None);
        let Move::Play { cards } = Heuristic::decide_play(&ctx).value else {
            panic!("leader must play");
        };
        assert!(ctx.legal_moves.contains(&cards));
    }

    #[test]
    fn passes_over_ally() {
        // Seat 2 follows seat 1; both farmers.
        let req = classify(&c(&["8S"]), Four2Policy::Both);
        let mut ctx = play_ctx(2, 0, c(&["9S", "KD", "3C"]), req);
        ctx.last_play_seat = Some(1);
        assert_eq!(Heuristic::decide_play(&ctx).value, Move::Pass);
    }

    #[test]
    fn holds_bomb_against_distant_opponent() {
        let req = classify(&c(&["AS", "AH"]), Four2Policy::Both);
        let mut ctx = play_ctx(1, 0, c(&["6S", "6H", "6D", "6C", "3S", "4D"]), req);
        ctx.last_play_seat = Some(0);
        ctx.hand_sizes = [15, 6, 17];
        assert_eq!(Heuristic::decide_play(&ctx).value, Move::Pass);

        ctx.hand_sizes = [2, 6, 17];
        assert_eq!(
            Heuristic::decide_play(&ctx).value,
            Move::Play { cards: c(&["6S", "6H", "6D", "6C"]) }
        );
    }

    #[tokio::test]
    async fn trait_entry_points_answer() {
        let ai = Heuristic::new();
        let ctx = play_ctx(0, 0, c(&["3S", "4H"]), None);
        assert!(ai.choose_play(&ctx).await.is_ok());
        assert!(ai.choose_bid(&ctx).await.is_ok());
        assert_eq!(ai.kind(), AgentKind::Heuristic);
    }
}
