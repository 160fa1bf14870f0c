//! Shared types for the simulator.

use arena_backend::ai::AgentSpec;
use arena_backend::domain::bidding::BiddingMode;
use arena_backend::domain::Four2Policy;
use clap::ValueEnum;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    /// CSV summary only.
    Csv,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AgentType {
    Heuristic,
    /// OpenAI-compatible chat agent configured from `LLM_*` env vars.
    RemoteChat,
}

impl AgentType {
    pub fn spec(self) -> AgentSpec {
        match self {
            AgentType::Heuristic => AgentSpec::Heuristic,
            AgentType::RemoteChat => AgentSpec::RemoteChat {
                model: None,
                base_url: None,
                api_key: None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PolicyArg {
    Both,
    Singles,
    Pairs,
}

impl From<PolicyArg> for Four2Policy {
    fn from(p: PolicyArg) -> Self {
        match p {
            PolicyArg::Both => Four2Policy::Both,
            PolicyArg::Singles => Four2Policy::SinglesOnly,
            PolicyArg::Pairs => Four2Policy::PairsOnly,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum BiddingArg {
    Auto,
    Interactive,
}

impl From<BiddingArg> for BiddingMode {
    fn from(b: BiddingArg) -> Self {
        match b {
            BiddingArg::Auto => BiddingMode::Auto,
            BiddingArg::Interactive => BiddingMode::Interactive,
        }
    }
}
