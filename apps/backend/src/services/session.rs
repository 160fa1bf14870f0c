//! Session orchestrator.
//!
//! A session runs one or more matches between three seats and streams every
//! step as a [`StreamEvent`] through a single ordered channel. Each agent
//! decision runs as its own task, raced against the seat's time budget:
//! - non-human seats that run out of time get the default decision and
//!   their call is detached;
//! - human seats get a grace interval on top of their budget, after which
//!   their ticket is invalidated and the default decision commits.
//!
//! Whatever an agent answers is re-checked against the legal actions before
//! it touches the match.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::ai::defaults::{fallback_bid, fallback_double, fallback_play};
use crate::ai::{
    build_agent, AgentDeps, AgentSpec, AiError, AiPlayer, Decision, DecisionContext,
    DecisionPhase, Move,
};
use crate::config::arena::{clamp_timeout, ArenaConfig, HUMAN_DECISION_FLOOR_MS};
use crate::domain::bidding::{eval_rob_score, select_landlord, BiddingMode};
use crate::domain::cards_logic::sorted;
use crate::domain::rules::PLAYERS;
use crate::domain::scoring::settle;
use crate::domain::tricks::{self, forced_play, legal_actions, validate_play};
use crate::domain::{
    deal, derive_dealing_seed, Card, Four2Policy, MatchState, Phase, Seat, SeenCards,
};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind, ValidationKind};
use crate::protocol::events::{
    BidEvalEvent, BotCallEvent, BotDoneEvent, ExtraDoubleEvent, GameEvent, InitEvent, LogLevel,
    MultiplierSyncEvent, PassEvent, PlayEvent, ResultEvent, StatsEvent, StreamEvent, TurnEvent,
};
use crate::services::stats::{DecisionOutcome, SessionStats};
use crate::services::tickets::TicketDesk;

/// Upper bound on play-phase turns in one match.
const MAX_TURNS: u32 = 1_000;

/// How long a human call may take to hand over an answer that reached its
/// ticket before the ticket was invalidated.
const HUMAN_SETTLE_MS: u64 = 100;

/// Largest accepted `baseScore`.
pub const MAX_BASE_SCORE: i64 = 1_000_000;

fn default_matches() -> u32 {
    1
}

fn default_base_score() -> i64 {
    1
}

/// Body of `POST /api/sessions/stream`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub agents: Vec<AgentSpec>,
    #[serde(default = "default_matches")]
    pub matches: u32,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub policy: Four2Policy,
    #[serde(default)]
    pub bidding: BiddingMode,
    #[serde(default)]
    pub extra_double: bool,
    #[serde(default = "default_base_score")]
    pub base_score: i64,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub seat_timeouts_ms: Option<Vec<u64>>,
}

impl SessionRequest {
    pub fn validate(&self, config: &ArenaConfig) -> Result<(), DomainError> {
        let invalid = |msg: String| DomainError::validation(ValidationKind::InvalidRequest, msg);
        if self.agents.len() != PLAYERS {
            return Err(invalid(format!(
                "expected {PLAYERS} agents, got {}",
                self.agents.len()
            )));
        }
        if self.matches == 0 || self.matches > config.max_matches {
            return Err(invalid(format!(
                "matches must be within 1..={}, got {}",
                config.max_matches, self.matches
            )));
        }
        if !(1..=MAX_BASE_SCORE).contains(&self.base_score) {
            return Err(invalid(format!(
                "baseScore must be within 1..={MAX_BASE_SCORE}, got {}",
                self.base_score
            )));
        }
        if let Some(per_seat) = &self.seat_timeouts_ms {
            if per_seat.len() != PLAYERS {
                return Err(invalid(format!(
                    "seatTimeoutsMs needs {PLAYERS} entries, got {}",
                    per_seat.len()
                )));
            }
        }
        Ok(())
    }
}

/// Server-wide collaborators a session borrows.
#[derive(Clone)]
pub struct SessionEnv {
    pub http: reqwest::Client,
    pub config: ArenaConfig,
    pub desk: Arc<TicketDesk>,
}

pub struct SessionHandle {
    pub session_id: String,
    pub events: UnboundedReceiver<StreamEvent>,
}

/// Start a session in the background and hand back its event stream.
///
/// An invalid request yields a stream holding a single error `log` line.
pub fn start_session(request: SessionRequest, env: SessionEnv) -> SessionHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let session_id = request
        .session_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    match Session::new(session_id.clone(), request, env, tx.clone()) {
        Ok(session) => {
            tokio::spawn(session.run());
        }
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "rejected session request");
            let _ = tx.send(StreamEvent::log(LogLevel::Error, e.to_string()));
        }
    }

    SessionHandle {
        session_id,
        events: rx,
    }
}

/// Stream consisting of one terminal error line.
pub fn rejected_stream(message: impl Into<String>) -> UnboundedReceiver<StreamEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    let _ = tx.send(StreamEvent::log(LogLevel::Error, message));
    rx
}

/// A committed decision and how it came about.
struct Resolved<T> {
    value: T,
    reason: Option<String>,
}

struct Session {
    id: String,
    request: SessionRequest,
    config: ArenaConfig,
    desk: Arc<TicketDesk>,
    agents: Vec<Arc<dyn AiPlayer>>,
    labels: Vec<String>,
    humans: [bool; PLAYERS],
    events: UnboundedSender<StreamEvent>,
    seed: u64,
    seen: SeenCards,
    stats: SessionStats,
    totals: [i64; PLAYERS],
    decision_no: u32,
}

impl Session {
    fn new(
        id: String,
        request: SessionRequest,
        env: SessionEnv,
        events: UnboundedSender<StreamEvent>,
    ) -> Result<Self, AppError> {
        request.validate(&env.config)?;

        let deps = AgentDeps {
            http: env.http,
            config: env.config.clone(),
            desk: env.desk.clone(),
            events: events.clone(),
        };
        let agents = request
            .agents
            .iter()
            .map(|spec| build_agent(spec, &deps))
            .collect::<Result<Vec<_>, _>>()?;
        let labels: Vec<String> = agents.iter().map(|a| a.label()).collect();
        let mut humans = [false; PLAYERS];
        for (seat, spec) in request.agents.iter().enumerate() {
            humans[seat] = spec.is_human();
        }
        let seed = request.seed.unwrap_or_else(rand::random::<u64>);
        let stats = SessionStats::new([labels[0].clone(), labels[1].clone(), labels[2].clone()]);

        Ok(Self {
            id,
            request,
            config: env.config,
            desk: env.desk,
            agents,
            labels,
            humans,
            events,
            seed,
            seen: SeenCards::new(),
            stats,
            totals: [0; PLAYERS],
            decision_no: 0,
        })
    }

    fn emit(&self, event: impl Into<StreamEvent>) {
        if self.events.send(event.into()).is_err() {
            debug!(session_id = %self.id, "event dropped, stream closed");
        }
    }

    async fn run(mut self) {
        info!(session_id = %self.id, matches = self.request.matches, seed = self.seed, agents = ?self.labels, "session started");
        for match_no in 1..=self.request.matches {
            if self.events.is_closed() {
                info!(session_id = %self.id, match_no, "stream closed, stopping session");
                break;
            }
            if let Err(e) = self.play_match(match_no).await {
                warn!(session_id = %self.id, match_no, error = %e, "match aborted");
                self.emit(StreamEvent::log(
                    LogLevel::Error,
                    format!("match {match_no} aborted: {e}"),
                ));
                break;
            }
        }
        self.desk.close_session(&self.id);
        info!(session_id = %self.id, totals = ?self.totals, "session finished");
    }

    async fn play_match(&mut self, match_no: u32) -> Result<(), DomainError> {
        let seed = derive_dealing_seed(self.seed, match_no);
        let mut state = MatchState::new(deal(Some(seed)), self.request.policy);
        self.seen.reset();
        state.start_bidding()?;

        let landlord = match self.request.bidding {
            BiddingMode::Auto => self.auto_bidding(&state, match_no),
            BiddingMode::Interactive => self.interactive_bidding(&mut state, match_no).await?,
        };
        state.set_landlord(landlord)?;
        debug!(session_id = %self.id, match_no, landlord, "landlord selected");

        self.emit(StreamEvent::Init(InitEvent {
            session_id: self.id.clone(),
            match_no,
            matches: self.request.matches,
            seed,
            landlord,
            hands: state.hands.clone(),
            bottom: state.bottom.to_vec(),
            agents: self.labels.clone(),
            policy: self.request.policy,
            bidding: self.request.bidding,
        }));

        state.reveal(self.request.extra_double)?;
        if state.phase == Phase::Doubling {
            self.doubling(&mut state, match_no).await?;
            state.start_play()?;
        }

        self.play_loop(&mut state, match_no).await?;
        self.finish(&state, match_no)
    }

    fn auto_bidding(&self, state: &MatchState, match_no: u32) -> Seat {
        for (seat, hand) in state.hands.iter().enumerate() {
            self.emit(GameEvent::BidEval(BidEvalEvent {
                match_no,
                seat: seat as Seat,
                score: eval_rob_score(hand),
                bid: None,
                reason: None,
            }));
        }
        select_landlord(&state.hands)
    }

    async fn interactive_bidding(
        &mut self,
        state: &mut MatchState,
        match_no: u32,
    ) -> Result<Seat, DomainError> {
        let mut landlord = None;
        for seat in 0..PLAYERS as Seat {
            let ctx = self.context(state, match_no, 0, seat, DecisionPhase::Bid, Vec::new(), false);
            let resolved = self
                .resolve(
                    ctx,
                    |agent, ctx| async move { agent.choose_bid(&ctx).await },
                    |_| true,
                    fallback_bid,
                )
                .await;
            state.record_bid(seat, resolved.value)?;
            self.emit(GameEvent::BidEval(BidEvalEvent {
                match_no,
                seat,
                score: eval_rob_score(state.hand(seat)),
                bid: Some(resolved.value),
                reason: resolved.reason,
            }));
            if resolved.value {
                landlord = Some(seat);
                self.sync_multiplier(state, match_no, "bid");
            }
        }
        Ok(match landlord {
            Some(seat) => seat,
            None => {
                let seat = select_landlord(&state.hands);
                self.emit(StreamEvent::log(
                    LogLevel::Info,
                    format!("no seat bid in match {match_no}; seat {seat} takes landlord by hand strength"),
                ));
                seat
            }
        })
    }

    async fn doubling(&mut self, state: &mut MatchState, match_no: u32) -> Result<(), DomainError> {
        for seat in 0..PLAYERS as Seat {
            let ctx =
                self.context(state, match_no, 0, seat, DecisionPhase::Double, Vec::new(), false);
            let resolved = self
                .resolve(
                    ctx,
                    |agent, ctx| async move { agent.choose_double(&ctx).await },
                    |_| true,
                    fallback_double,
                )
                .await;
            state.record_double(seat, resolved.value)?;
            self.emit(GameEvent::ExtraDouble(ExtraDoubleEvent {
                match_no,
                seat,
                role: state.role(seat),
                double: resolved.value,
                reason: resolved.reason,
            }));
            self.sync_multiplier(state, match_no, "extra-double");
        }
        Ok(())
    }

    async fn play_loop(&mut self, state: &mut MatchState, match_no: u32) -> Result<(), DomainError> {
        let mut turn_no = 0u32;
        while !state.is_finished() {
            turn_no += 1;
            if turn_no > MAX_TURNS {
                return Err(DomainError::infra(
                    InfraErrorKind::Other("turn cap".into()),
                    format!("match exceeded {MAX_TURNS} turns"),
                ));
            }
            if self.events.is_closed() {
                return Err(DomainError::infra(
                    InfraErrorKind::Other("stream closed".into()),
                    "observer disconnected",
                ));
            }

            let seat = state.turn;
            let mut actions = legal_actions(state, seat);
            if let Some(forced) = forced_play(state, seat) {
                actions.plays.push(forced);
            }

            self.emit(StreamEvent::Turn(TurnEvent {
                match_no,
                turn_no,
                seat,
                role: state.role(seat),
                hand_sizes: state.hand_sizes(),
                requirement: state.requirement.clone(),
                can_pass: actions.can_pass,
            }));

            let legal = actions.plays.clone();
            let can_pass = actions.can_pass;
            let ctx = self.context(
                state,
                match_no,
                turn_no,
                seat,
                DecisionPhase::Play,
                actions.plays,
                can_pass,
            );
            let snapshot: &MatchState = state;
            let resolved = self
                .resolve(
                    ctx,
                    |agent, ctx| async move { agent.choose_play(&ctx).await },
                    |mv| is_legal_move(snapshot, seat, &legal, can_pass, mv),
                    fallback_play,
                )
                .await;

            match resolved.value {
                Move::Pass => {
                    let outcome = tricks::pass(state, seat)?;
                    self.stats.record_pass(seat);
                    self.emit(GameEvent::Pass(PassEvent {
                        match_no,
                        turn_no,
                        seat,
                        trick_reset: outcome.trick_reset,
                        leader: outcome.leader,
                        reason: resolved.reason,
                    }));
                }
                Move::Play { cards } => {
                    let cards = sorted(&cards);
                    let outcome = tricks::play(state, seat, &cards)?;
                    self.seen.record(seat, &cards);
                    self.stats.record_play(seat, outcome.combo.is_bomb_like());
                    self.emit(GameEvent::Play(PlayEvent {
                        match_no,
                        turn_no,
                        seat,
                        cards,
                        combo: outcome.combo.kind,
                        cards_left: outcome.cards_left,
                        reason: resolved.reason,
                    }));
                    if outcome.doubled {
                        self.sync_multiplier(state, match_no, outcome.combo.kind.as_str());
                    }
                }
            }
        }
        Ok(())
    }

    fn finish(&mut self, state: &MatchState, match_no: u32) -> Result<(), DomainError> {
        let (Some(winner), Some(landlord)) = (state.winner, state.landlord) else {
            return Err(DomainError::validation(
                ValidationKind::PhaseMismatch,
                "match ended without a winner",
            ));
        };
        if state.multiplier.spring {
            self.sync_multiplier(state, match_no, "spring");
        }

        let settlement = settle(landlord, winner, self.request.base_score, &state.multiplier);
        for (total, delta) in self.totals.iter_mut().zip(settlement.deltas) {
            *total = total.saturating_add(delta);
        }
        info!(
            session_id = %self.id,
            match_no,
            winner,
            landlord,
            landlord_won = settlement.landlord_won,
            multiplier = state.multiplier.total(),
            "match finished"
        );

        self.emit(StreamEvent::Result(ResultEvent {
            match_no,
            winner,
            landlord,
            landlord_won: settlement.landlord_won,
            spring: state.multiplier.spring,
            base_score: self.request.base_score,
            multiplier: state.multiplier.clone(),
            total_multiplier: state.multiplier.total(),
            deltas: settlement.deltas,
            totals: self.totals,
        }));
        self.emit(StreamEvent::Stats(StatsEvent {
            match_no,
            seats: self.stats.seats().to_vec(),
        }));
        Ok(())
    }

    fn sync_multiplier(&self, state: &MatchState, match_no: u32, cause: &str) {
        self.emit(GameEvent::MultiplierSync(MultiplierSyncEvent {
            match_no,
            cause: cause.to_string(),
            multiplier: state.multiplier.clone(),
            total: state.multiplier.total(),
        }));
    }

    fn timeout_for(&self, seat: Seat, phase: DecisionPhase) -> u64 {
        let requested = self
            .request
            .seat_timeouts_ms
            .as_ref()
            .and_then(|per_seat| per_seat.get(seat as usize).copied())
            .or(self.request.timeout_ms)
            .unwrap_or(self.config.default_timeout_ms);
        let ms = clamp_timeout(requested);
        if self.humans[seat as usize] && phase != DecisionPhase::Play {
            ms.max(HUMAN_DECISION_FLOOR_MS)
        } else {
            ms
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn context(
        &mut self,
        state: &MatchState,
        match_no: u32,
        turn_no: u32,
        seat: Seat,
        phase: DecisionPhase,
        legal_moves: Vec<Vec<Card>>,
        can_pass: bool,
    ) -> DecisionContext {
        self.decision_no += 1;
        let revealed = matches!(
            state.phase,
            Phase::Doubling | Phase::Playing | Phase::Finished
        );
        DecisionContext {
            session_id: self.id.clone(),
            request_id: format!("m{match_no}-d{}", self.decision_no),
            match_no,
            turn_no,
            phase,
            seat,
            role: state.landlord.map(|_| state.role(seat)),
            landlord: state.landlord,
            hand: state.hand(seat).to_vec(),
            requirement: state.requirement.clone(),
            last_play_seat: state.last_play.as_ref().map(|lp| lp.seat),
            hand_sizes: state.hand_sizes(),
            seen_by_seat: self.seen.by_seat().clone(),
            bottom: revealed.then(|| state.bottom.to_vec()),
            policy: state.policy,
            legal_moves,
            can_pass,
            timeout_ms: self.timeout_for(seat, phase),
        }
    }

    /// Run one agent call under the seat's budget and settle on a legal answer.
    async fn resolve<T, F, Fut>(
        &mut self,
        ctx: DecisionContext,
        call: F,
        accept: impl Fn(&T) -> bool,
        fallback: fn(&DecisionContext) -> Decision<T>,
    ) -> Resolved<T>
    where
        T: Send + 'static,
        F: FnOnce(Arc<dyn AiPlayer>, DecisionContext) -> Fut,
        Fut: Future<Output = Result<Decision<T>, AiError>> + Send + 'static,
    {
        let seat = ctx.seat;
        let human = self.humans[seat as usize];
        let agent = self.agents[seat as usize].clone();
        let label = self.labels[seat as usize].clone();

        self.emit(GameEvent::BotCall(BotCallEvent {
            match_no: ctx.match_no,
            seat,
            agent: label.clone(),
            phase: ctx.phase,
            request_id: ctx.request_id.clone(),
            timeout_ms: ctx.timeout_ms,
        }));

        let started = Instant::now();
        let mut handle = tokio::spawn(call(agent, ctx.clone()));
        let mut joined = timeout(Duration::from_millis(ctx.timeout_ms), &mut handle).await;
        if joined.is_err() && human {
            joined = timeout(Duration::from_millis(self.config.human_grace_ms), &mut handle).await;
        }
        if joined.is_err() && human {
            // An answer the desk accepted before this point is already in the
            // waiter; anything later is refused with TICKET_EXPIRED.
            self.desk.invalidate(&ctx.session_id, &ctx.request_id);
            if let Ok(Ok(Ok(answer))) =
                timeout(Duration::from_millis(HUMAN_SETTLE_MS), &mut handle).await
            {
                joined = Ok(Ok(Ok(answer)));
            }
        }
        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (outcome, decision, fell_back) = match joined {
            Err(_) => {
                // Dropping the handle detaches the call; its answer is discarded.
                drop(handle);
                let d = fallback(&ctx).with_reason(format!("timeout after {elapsed_ms}ms"));
                (DecisionOutcome::Timeout, d, true)
            }
            Ok(Err(join_err)) => {
                let d = fallback(&ctx).with_reason(format!("agent task failed: {join_err}"));
                (DecisionOutcome::Error, d, true)
            }
            Ok(Ok(Err(err))) => {
                let outcome = match err {
                    AiError::Timeout => DecisionOutcome::Timeout,
                    AiError::InvalidMove(_) => DecisionOutcome::Invalid,
                    _ => DecisionOutcome::Error,
                };
                let d = fallback(&ctx).with_reason(format!("agent error: {err}"));
                (outcome, d, true)
            }
            Ok(Ok(Ok(d))) if accept(&d.value) => (DecisionOutcome::Ok, d, false),
            Ok(Ok(Ok(d))) => {
                let d = fallback(&ctx)
                    .with_reason(format!(
                        "illegal answer replaced ({})",
                        d.reason.as_deref().unwrap_or("no reason given")
                    ))
                    .with_usage(d.usage);
                (DecisionOutcome::Invalid, d, true)
            }
        };

        if outcome != DecisionOutcome::Ok {
            warn!(
                session_id = %ctx.session_id,
                seat,
                phase = ctx.phase.as_str(),
                request_id = %ctx.request_id,
                ?outcome,
                "agent decision replaced by default"
            );
        }

        self.stats
            .record_call(seat, outcome, elapsed_ms, decision.usage, fell_back);
        self.emit(GameEvent::BotDone(BotDoneEvent {
            match_no: ctx.match_no,
            seat,
            agent: label,
            phase: ctx.phase,
            request_id: ctx.request_id.clone(),
            elapsed_ms,
            outcome,
            fallback: fell_back,
            usage: decision.usage,
            reason: decision.reason.clone(),
        }));

        Resolved {
            value: decision.value,
            reason: decision.reason,
        }
    }
}

/// Whether `mv` is something the seat may commit right now.
fn is_legal_move(
    state: &MatchState,
    seat: Seat,
    legal: &[Vec<Card>],
    can_pass: bool,
    mv: &Move,
) -> bool {
    match mv {
        Move::Pass => can_pass,
        Move::Play { cards } => {
            !cards.is_empty()
                && (legal.contains(&sorted(cards)) || validate_play(state, seat, cards).is_ok())
        }
    }
}
