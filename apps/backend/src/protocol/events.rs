//! NDJSON stream events.
//!
//! Every line of a session stream is one [`StreamEvent`], tagged by `type`.
//! Game-level happenings ride inside `{"type":"event","kind":...}`.

use serde::Serialize;

use crate::ai::scoring::Hint;
use crate::ai::{DecisionPhase, TokenUsage};
use crate::domain::bidding::{BiddingMode, Multiplier};
use crate::domain::rules::PLAYERS;
use crate::domain::{Card, Combo, ComboKind, Four2Policy, Role, Seat};
use crate::services::stats::{DecisionOutcome, SeatStats};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum StreamEvent {
    Init(InitEvent),
    Turn(TurnEvent),
    Event(GameEvent),
    Stats(StatsEvent),
    Result(ResultEvent),
    HumanRequest(HumanRequestEvent),
    Log(LogEvent),
}

impl StreamEvent {
    pub fn log(level: LogLevel, message: impl Into<String>) -> Self {
        StreamEvent::Log(LogEvent {
            level,
            message: message.into(),
        })
    }

    /// One NDJSON line, newline included.
    pub fn to_line(&self) -> String {
        match serde_json::to_string(self) {
            Ok(mut line) => {
                line.push('\n');
                line
            }
            Err(e) => format!(
                "{{\"type\":\"log\",\"level\":\"error\",\"message\":\"unserializable event: {}\"}}\n",
                e.to_string().replace('"', "'")
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum GameEvent {
    Play(PlayEvent),
    Pass(PassEvent),
    BidEval(BidEvalEvent),
    ExtraDouble(ExtraDoubleEvent),
    MultiplierSync(MultiplierSyncEvent),
    BotCall(BotCallEvent),
    BotDone(BotDoneEvent),
}

impl From<GameEvent> for StreamEvent {
    fn from(e: GameEvent) -> Self {
        StreamEvent::Event(e)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitEvent {
    pub session_id: String,
    pub match_no: u32,
    pub matches: u32,
    pub seed: u64,
    pub landlord: Seat,
    /// Hands as dealt, before the landlord takes the bottom.
    pub hands: [Vec<Card>; PLAYERS],
    pub bottom: Vec<Card>,
    pub agents: Vec<String>,
    pub policy: Four2Policy,
    pub bidding: BiddingMode,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnEvent {
    pub match_no: u32,
    pub turn_no: u32,
    pub seat: Seat,
    pub role: Role,
    pub hand_sizes: [usize; PLAYERS],
    pub requirement: Option<Combo>,
    pub can_pass: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    pub match_no: u32,
    pub turn_no: u32,
    pub seat: Seat,
    pub cards: Vec<Card>,
    pub combo: ComboKind,
    pub cards_left: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassEvent {
    pub match_no: u32,
    pub turn_no: u32,
    pub seat: Seat,
    pub trick_reset: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leader: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidEvalEvent {
    pub match_no: u32,
    pub seat: Seat,
    pub score: f64,
    /// `None` in auto mode, where no seat is asked.
    pub bid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraDoubleEvent {
    pub match_no: u32,
    pub seat: Seat,
    pub role: Role,
    pub double: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiplierSyncEvent {
    pub match_no: u32,
    pub cause: String,
    pub multiplier: Multiplier,
    pub total: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotCallEvent {
    pub match_no: u32,
    pub seat: Seat,
    pub agent: String,
    pub phase: DecisionPhase,
    pub request_id: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDoneEvent {
    pub match_no: u32,
    pub seat: Seat,
    pub agent: String,
    pub phase: DecisionPhase,
    pub request_id: String,
    pub elapsed_ms: u64,
    pub outcome: DecisionOutcome,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsEvent {
    pub match_no: u32,
    pub seats: Vec<SeatStats>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultEvent {
    pub match_no: u32,
    pub winner: Seat,
    pub landlord: Seat,
    pub landlord_won: bool,
    pub spring: bool,
    pub base_score: i64,
    pub multiplier: Multiplier,
    pub total_multiplier: u64,
    pub deltas: [i64; PLAYERS],
    /// Running totals across the session's matches.
    pub totals: [i64; PLAYERS],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanRequestEvent {
    pub session_id: String,
    pub request_id: String,
    pub match_no: u32,
    pub seat: Seat,
    pub phase: DecisionPhase,
    pub timeout_ms: u64,
    pub grace_ms: u64,
    pub hand: Vec<Card>,
    pub requirement: Option<Combo>,
    pub legal_moves: Vec<Vec<Card>>,
    pub can_pass: bool,
    pub hint: Option<Hint>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub level: LogLevel,
    pub message: String,
}
