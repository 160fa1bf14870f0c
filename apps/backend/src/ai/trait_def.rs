//! Agent trait and the decision contract shared by every agent variant.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::rules::PLAYERS;
use crate::domain::{Card, Combo, Four2Policy, Role, Seat};
use crate::error::AppError;

/// Errors that can occur during agent decision-making.
#[derive(Debug)]
pub enum AiError {
    /// Agent failed to decide within its budget
    Timeout,
    /// Agent encountered an internal error
    Internal(String),
    /// Agent produced output that is not a legal decision
    InvalidMove(String),
    /// Upstream throttled the call
    RateLimited(String),
    /// Upstream refused the prompt on content-safety grounds
    ContentRejected(String),
    /// Network or protocol failure talking to an upstream
    Transport(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::Timeout => write!(f, "AI decision timeout"),
            AiError::Internal(msg) => write!(f, "AI internal error: {msg}"),
            AiError::InvalidMove(msg) => write!(f, "AI invalid move: {msg}"),
            AiError::RateLimited(msg) => write!(f, "AI rate limited: {msg}"),
            AiError::ContentRejected(msg) => write!(f, "AI content rejected: {msg}"),
            AiError::Transport(msg) => write!(f, "AI transport error: {msg}"),
        }
    }
}

impl std::error::Error for AiError {}

impl From<AiError> for AppError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Timeout => AppError::Timeout {
                detail: err.to_string(),
            },
            AiError::RateLimited(_) | AiError::ContentRejected(_) | AiError::Transport(_) => {
                AppError::Upstream {
                    detail: err.to_string(),
                }
            }
            _ => AppError::internal(format!("AI error: {err}")),
        }
    }
}

/// Closed set of agent variants.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    Heuristic,
    RemoteChat,
    HttpRelay,
    Human,
}

impl AgentKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentKind::Heuristic => "heuristic",
            AgentKind::RemoteChat => "remote-chat",
            AgentKind::HttpRelay => "http-relay",
            AgentKind::Human => "human",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionPhase {
    Bid,
    Double,
    Play,
}

impl DecisionPhase {
    pub const fn as_str(self) -> &'static str {
        match self {
            DecisionPhase::Bid => "bid",
            DecisionPhase::Double => "double",
            DecisionPhase::Play => "play",
        }
    }
}

/// Everything a seat may know when it has to decide.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionContext {
    pub session_id: String,
    pub request_id: String,
    pub match_no: u32,
    pub turn_no: u32,
    pub phase: DecisionPhase,
    pub seat: Seat,
    /// `None` until the landlord is known.
    pub role: Option<Role>,
    pub landlord: Option<Seat>,
    pub hand: Vec<Card>,
    pub requirement: Option<Combo>,
    pub last_play_seat: Option<Seat>,
    pub hand_sizes: [usize; PLAYERS],
    /// Cards played so far this match, per seat.
    pub seen_by_seat: [Vec<Card>; PLAYERS],
    /// Present once revealed.
    pub bottom: Option<Vec<Card>>,
    pub policy: Four2Policy,
    pub legal_moves: Vec<Vec<Card>>,
    pub can_pass: bool,
    /// Budget the orchestrator grants this decision.
    pub timeout_ms: u64,
}

impl DecisionContext {
    /// Seats `n` steps after this one, in acting order.
    pub fn upcoming(&self, n: usize) -> Vec<Seat> {
        (1..=n)
            .map(|step| ((self.seat as usize + step) % PLAYERS) as Seat)
            .collect()
    }

    /// Whether `other` plays on the same side as this seat. Unknown before the landlord is set.
    pub fn is_ally(&self, other: Seat) -> bool {
        match self.landlord {
            Some(l) => other != self.seat && other != l && self.seat != l,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// A play-phase answer. Wire form: `{"move":"play","cards":[..]}` or `{"move":"pass"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "move", rename_all = "lowercase")]
pub enum Move {
    Play { cards: Vec<Card> },
    Pass,
}

/// An answer plus the optional observability annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision<T> {
    pub value: T,
    pub reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl<T> Decision<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            reason: None,
            usage: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }
}

/// Trait for agents.
///
/// Each phase has its own entry point; agents that do not reason about a
/// phase answer with the defaults in `ai::defaults`.
#[async_trait]
pub trait AiPlayer: Send + Sync {
    fn kind(&self) -> AgentKind;

    /// Short label for logs and stats.
    fn label(&self) -> String {
        self.kind().as_str().to_string()
    }

    async fn choose_bid(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError>;

    async fn choose_double(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError>;

    async fn choose_play(&self, ctx: &DecisionContext) -> Result<Decision<Move>, AiError>;
}
