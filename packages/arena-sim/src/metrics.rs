//! Per-match metrics folded from a session's event stream.

use std::time::Instant;

use arena_backend::domain::bidding::{BiddingMode, Multiplier};
use arena_backend::domain::Four2Policy;
use arena_backend::protocol::events::{GameEvent, InitEvent, ResultEvent, StreamEvent};
use arena_backend::services::stats::SeatStats;
use serde::Serialize;

/// Complete match metrics for output.
#[derive(Debug, Clone, Serialize)]
pub struct MatchMetrics {
    pub match_no: u32,
    pub seed: u64,
    pub timestamp: String,
    pub config: MatchConfig,
    pub result: MatchResultMetrics,
    pub play: PlayMetrics,
    pub seats: Vec<SeatStats>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchConfig {
    pub agents: Vec<String>,
    pub total_matches: u32,
    pub policy: Four2Policy,
    pub bidding: BiddingMode,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResultMetrics {
    pub winner: u8,
    pub landlord: u8,
    pub landlord_won: bool,
    pub spring: bool,
    pub base_score: i64,
    pub multiplier: Multiplier,
    pub total_multiplier: u64,
    pub deltas: [i64; 3],
    pub totals: [i64; 3],
    pub duration_ms: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlayMetrics {
    pub turns: u32,
    pub plays: u32,
    pub passes: u32,
    pub bombs: u32,
    pub fallbacks: u32,
}

/// Flat CSV row, one per match.
#[derive(Debug, Serialize)]
pub struct CsvSummaryRow {
    pub match_no: u32,
    pub seed: u64,
    pub landlord: u8,
    pub winner: u8,
    pub landlord_won: bool,
    pub spring: bool,
    pub total_multiplier: u64,
    pub seat0_delta: i64,
    pub seat1_delta: i64,
    pub seat2_delta: i64,
    pub seat0_agent: String,
    pub seat1_agent: String,
    pub seat2_agent: String,
    pub turns: u32,
    pub fallbacks: u32,
}

impl From<&MatchMetrics> for CsvSummaryRow {
    fn from(m: &MatchMetrics) -> Self {
        let agent = |seat: usize| m.config.agents.get(seat).cloned().unwrap_or_default();
        Self {
            match_no: m.match_no,
            seed: m.seed,
            landlord: m.result.landlord,
            winner: m.result.winner,
            landlord_won: m.result.landlord_won,
            spring: m.result.spring,
            total_multiplier: m.result.total_multiplier,
            seat0_delta: m.result.deltas[0],
            seat1_delta: m.result.deltas[1],
            seat2_delta: m.result.deltas[2],
            seat0_agent: agent(0),
            seat1_agent: agent(1),
            seat2_agent: agent(2),
            turns: m.play.turns,
            fallbacks: m.play.fallbacks,
        }
    }
}

/// Folds stream events into one [`MatchMetrics`] per finished match.
///
/// A match is complete once its `stats` line arrives, which always follows
/// the `result` line.
pub struct MatchCollector {
    started: Instant,
    init: Option<InitEvent>,
    result: Option<ResultEvent>,
    play: PlayMetrics,
}

impl Default for MatchCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchCollector {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            init: None,
            result: None,
            play: PlayMetrics::default(),
        }
    }

    pub fn observe(&mut self, event: StreamEvent) -> Option<MatchMetrics> {
        match event {
            StreamEvent::Init(init) => self.init = Some(init),
            StreamEvent::Turn(_) => self.play.turns += 1,
            StreamEvent::Event(GameEvent::Play(p)) => {
                self.play.plays += 1;
                if p.combo.is_bomb_like() {
                    self.play.bombs += 1;
                }
            }
            StreamEvent::Event(GameEvent::Pass(_)) => self.play.passes += 1,
            StreamEvent::Event(GameEvent::BotDone(d)) if d.fallback => self.play.fallbacks += 1,
            StreamEvent::Result(result) => self.result = Some(result),
            StreamEvent::Stats(stats) => return self.finish(stats.seats),
            _ => {}
        }
        None
    }

    fn finish(&mut self, seats: Vec<SeatStats>) -> Option<MatchMetrics> {
        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        self.started = Instant::now();
        let play = std::mem::take(&mut self.play);
        let (init, result) = (self.init.take()?, self.result.take()?);

        let timestamp = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_else(|_| String::from("unknown"));

        Some(MatchMetrics {
            match_no: result.match_no,
            seed: init.seed,
            timestamp,
            config: MatchConfig {
                agents: init.agents,
                total_matches: init.matches,
                policy: init.policy,
                bidding: init.bidding,
            },
            result: MatchResultMetrics {
                winner: result.winner,
                landlord: result.landlord,
                landlord_won: result.landlord_won,
                spring: result.spring,
                base_score: result.base_score,
                multiplier: result.multiplier,
                total_multiplier: result.total_multiplier,
                deltas: result.deltas,
                totals: result.totals,
                duration_ms,
            },
            play,
            seats,
        })
    }
}
