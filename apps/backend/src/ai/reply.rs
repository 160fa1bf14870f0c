//! Decision replies from remote agents.
//!
//! Both the chat agent and the HTTP relay answer with the same JSON shape:
//! `{"bid": true}`, `{"double": false}` or `{"move": "play", "cards": ["3S"]}`,
//! each with an optional `reason`.

use serde::Deserialize;

use crate::ai::trait_def::{AiError, Decision, Move, TokenUsage};
use crate::domain::try_parse_cards;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentReply {
    #[serde(default)]
    pub bid: Option<bool>,
    #[serde(default)]
    pub double: Option<bool>,
    #[serde(default, rename = "move")]
    pub mv: Option<String>,
    #[serde(default)]
    pub cards: Option<Vec<String>>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl AgentReply {
    fn finish<T>(value: T, reason: Option<String>, usage: Option<TokenUsage>) -> Decision<T> {
        Decision {
            value,
            reason,
            usage,
        }
    }

    pub fn into_bid(self) -> Result<Decision<bool>, AiError> {
        let bid = self
            .bid
            .ok_or_else(|| AiError::InvalidMove("reply has no `bid`".into()))?;
        Ok(Self::finish(bid, self.reason, self.usage))
    }

    pub fn into_double(self) -> Result<Decision<bool>, AiError> {
        let double = self
            .double
            .ok_or_else(|| AiError::InvalidMove("reply has no `double`".into()))?;
        Ok(Self::finish(double, self.reason, self.usage))
    }

    pub fn into_move(self) -> Result<Decision<Move>, AiError> {
        let mv = match self.mv.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("pass") => Move::Pass,
            Some("play") => {
                let tokens = self
                    .cards
                    .ok_or_else(|| AiError::InvalidMove("play without `cards`".into()))?;
                let cards =
                    try_parse_cards(&tokens).map_err(|e| AiError::InvalidMove(e.to_string()))?;
                Move::Play { cards }
            }
            other => {
                return Err(AiError::InvalidMove(format!(
                    "unknown move {:?}",
                    other.unwrap_or("<missing>")
                )))
            }
        };
        Ok(Self::finish(mv, self.reason, self.usage))
    }
}

/// The outermost `{...}` span of a model's free-text answer.
pub fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

pub fn parse_reply(text: &str) -> Result<AgentReply, AiError> {
    let json = extract_json(text)
        .ok_or_else(|| AiError::InvalidMove("no JSON object in reply".into()))?;
    serde_json::from_str(json).map_err(|e| AiError::InvalidMove(format!("bad reply JSON: {e}")))
}
