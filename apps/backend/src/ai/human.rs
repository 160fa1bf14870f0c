//! HumanRelay: a seat driven by a person through the ticket desk.
//!
//! Each decision opens a ticket, announces it on the session stream as a
//! `human-request` (with an advisory hint for plays) and waits for
//! `POST /api/human/decision`. The orchestrator owns the clock: it races
//! this wait against the seat timeout plus grace and invalidates the ticket
//! when time runs out.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

use crate::ai::scoring::hint;
use crate::ai::trait_def::{AgentKind, AiError, AiPlayer, Decision, DecisionContext, DecisionPhase, Move};
use crate::protocol::events::{HumanRequestEvent, StreamEvent};
use crate::services::tickets::{HumanDecision, TicketDesk, TicketRejection};

pub struct HumanRelay {
    desk: Arc<TicketDesk>,
    events: UnboundedSender<StreamEvent>,
    grace_ms: u64,
}

impl HumanRelay {
    pub fn new(desk: Arc<TicketDesk>, events: UnboundedSender<StreamEvent>, grace_ms: u64) -> Self {
        Self {
            desk,
            events,
            grace_ms,
        }
    }

    async fn ask(&self, ctx: &DecisionContext) -> Result<HumanDecision, AiError> {
        // Registered before the request goes out so an instant answer finds it.
        let waiter = self
            .desk
            .register(&ctx.session_id, &ctx.request_id, ctx.seat, ctx.phase);

        let request = HumanRequestEvent {
            session_id: ctx.session_id.clone(),
            request_id: ctx.request_id.clone(),
            match_no: ctx.match_no,
            seat: ctx.seat,
            phase: ctx.phase,
            timeout_ms: ctx.timeout_ms,
            grace_ms: self.grace_ms,
            hand: ctx.hand.clone(),
            requirement: ctx.requirement.clone(),
            legal_moves: ctx.legal_moves.clone(),
            can_pass: ctx.can_pass,
            hint: (ctx.phase == DecisionPhase::Play).then(|| hint(ctx)),
        };
        if self.events.send(StreamEvent::HumanRequest(request)).is_err() {
            self.desk.invalidate(&ctx.session_id, &ctx.request_id);
            return Err(AiError::Internal("session stream closed".into()));
        }
        debug!(session_id = %ctx.session_id, request_id = %ctx.request_id, seat = ctx.seat, "awaiting human decision");

        match waiter.await {
            Ok(Ok(decision)) => Ok(decision),
            Ok(Err(TicketRejection::Expired)) => Err(AiError::Timeout),
            Ok(Err(rejection)) => Err(AiError::Internal(format!("ticket {rejection:?}"))),
            Err(_) => Err(AiError::Internal("ticket dropped".into())),
        }
    }

    fn finish<T>(
        value: Option<T>,
        field: &str,
        reason: Option<String>,
    ) -> Result<Decision<T>, AiError> {
        let value =
            value.ok_or_else(|| AiError::InvalidMove(format!("human answer has no `{field}`")))?;
        let mut out = Decision::new(value);
        out.reason = reason;
        Ok(out)
    }
}

#[async_trait]
impl AiPlayer for HumanRelay {
    fn kind(&self) -> AgentKind {
        AgentKind::Human
    }

    async fn choose_bid(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError> {
        let d = self.ask(ctx).await?;
        Self::finish(d.bid, "bid", d.reason)
    }

    async fn choose_double(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError> {
        let d = self.ask(ctx).await?;
        Self::finish(d.double, "double", d.reason)
    }

    async fn choose_play(&self, ctx: &DecisionContext) -> Result<Decision<Move>, AiError> {
        let d = self.ask(ctx).await?;
        Self::finish(d.mv, "move", d.reason)
    }
}
