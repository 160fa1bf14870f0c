//! Agent module - everything that decides on behalf of a seat.
//!
//! This module provides:
//! - the `AiPlayer` trait and its decision contract
//! - the built-in `Heuristic` agent and shared move scoring
//! - remote agents (`RemoteChat`, `HttpRelay`) behind a retry/backoff policy
//! - `HumanRelay`, which waits on the ticket desk
//! - agent construction from session specs

pub mod backoff;
pub mod defaults;
mod heuristic;
pub mod http_relay;
pub mod human;
pub mod registry;
pub mod remote_chat;
pub mod reply;
pub mod scoring;
mod trait_def;

pub use heuristic::Heuristic;
pub use registry::{build_agent, AgentDeps, AgentSpec};
pub use trait_def::{
    AgentKind, AiError, AiPlayer, Decision, DecisionContext, DecisionPhase, Move, TokenUsage,
};
