//! Body of `POST /api/human/decision`.

use serde::Deserialize;

use crate::ai::{DecisionPhase, Move};
use crate::domain::try_parse_cards;
use crate::errors::domain::{DomainError, ValidationKind};
use crate::services::tickets::HumanDecision;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanDecisionRequest {
    pub session_id: String,
    pub request_id: String,
    pub phase: DecisionPhase,
    #[serde(default)]
    pub bid: Option<bool>,
    #[serde(default)]
    pub double: Option<bool>,
    /// `"play"` or `"pass"`.
    #[serde(default, rename = "move")]
    pub mv: Option<String>,
    #[serde(default)]
    pub cards: Option<Vec<String>>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl HumanDecisionRequest {
    /// Check the fields the phase needs and parse card tokens.
    pub fn into_decision(self) -> Result<HumanDecision, DomainError> {
        let missing = |field: &str| {
            DomainError::validation(
                ValidationKind::InvalidRequest,
                format!("{} decision needs `{field}`", self.phase.as_str()),
            )
        };

        let mv = match self.phase {
            DecisionPhase::Bid if self.bid.is_none() => return Err(missing("bid")),
            DecisionPhase::Double if self.double.is_none() => return Err(missing("double")),
            DecisionPhase::Play => {
                match self.mv.as_deref().map(str::to_ascii_lowercase).as_deref() {
                    Some("pass") => Some(Move::Pass),
                    Some("play") => {
                        let tokens = self.cards.as_deref().ok_or_else(|| missing("cards"))?;
                        Some(Move::Play {
                            cards: try_parse_cards(tokens)?,
                        })
                    }
                    _ => return Err(missing("move")),
                }
            }
            _ => None,
        };

        Ok(HumanDecision {
            phase: self.phase,
            bid: self.bid,
            double: self.double,
            mv,
            reason: self.reason,
        })
    }
}
