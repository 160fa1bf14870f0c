//! Per-seat behavioral counters for one session.

use serde::Serialize;

use crate::ai::TokenUsage;
use crate::domain::rules::PLAYERS;
use crate::domain::Seat;

/// How a single agent call ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionOutcome {
    Ok,
    Timeout,
    Error,
    Invalid,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatStats {
    pub seat: Seat,
    pub agent: String,
    pub decisions: u32,
    pub plays: u32,
    pub passes: u32,
    pub bombs: u32,
    pub timeouts: u32,
    pub fallbacks: u32,
    pub invalid: u32,
    pub errors: u32,
    pub latency_total_ms: u64,
    pub latency_max_ms: u64,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl SeatStats {
    pub fn avg_latency_ms(&self) -> u64 {
        if self.decisions == 0 {
            0
        } else {
            self.latency_total_ms / u64::from(self.decisions)
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionStats {
    seats: [SeatStats; PLAYERS],
}

impl SessionStats {
    pub fn new(agents: [String; PLAYERS]) -> Self {
        let mut seats: [SeatStats; PLAYERS] = Default::default();
        for (i, (stats, agent)) in seats.iter_mut().zip(agents).enumerate() {
            stats.seat = i as Seat;
            stats.agent = agent;
        }
        Self { seats }
    }

    pub fn seats(&self) -> &[SeatStats; PLAYERS] {
        &self.seats
    }

    pub fn seat(&self, seat: Seat) -> &SeatStats {
        &self.seats[seat as usize]
    }

    /// Record one resolved agent call. `fallback` is set when the committed
    /// answer did not come from the agent.
    pub fn record_call(
        &mut self,
        seat: Seat,
        outcome: DecisionOutcome,
        elapsed_ms: u64,
        usage: Option<TokenUsage>,
        fallback: bool,
    ) {
        let s = &mut self.seats[seat as usize];
        s.decisions += 1;
        s.latency_total_ms += elapsed_ms;
        s.latency_max_ms = s.latency_max_ms.max(elapsed_ms);
        match outcome {
            DecisionOutcome::Ok => {}
            DecisionOutcome::Timeout => s.timeouts += 1,
            DecisionOutcome::Error => s.errors += 1,
            DecisionOutcome::Invalid => s.invalid += 1,
        }
        if fallback {
            s.fallbacks += 1;
        }
        if let Some(TokenUsage {
            prompt_tokens,
            completion_tokens,
        }) = usage
        {
            s.prompt_tokens += u64::from(prompt_tokens);
            s.completion_tokens += u64::from(completion_tokens);
        }
    }

    pub fn record_play(&mut self, seat: Seat, bomb_like: bool) {
        let s = &mut self.seats[seat as usize];
        s.plays += 1;
        if bomb_like {
            s.bombs += 1;
        }
    }

    pub fn record_pass(&mut self, seat: Seat) {
        self.seats[seat as usize].passes += 1;
    }
}
