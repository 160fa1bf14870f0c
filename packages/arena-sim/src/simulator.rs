//! In-memory match runner.
//!
//! Drives the same session orchestrator the server uses, without HTTP, and
//! turns its event stream into per-match metrics.

use arena_backend::config::arena::ArenaConfig;
use arena_backend::protocol::events::StreamEvent;
use arena_backend::protocol::LogLevel;
use arena_backend::services::session::{start_session, SessionEnv, SessionRequest};
use arena_backend::state::app_state::AppState;
use tracing::{debug, warn};

use crate::metrics::{MatchCollector, MatchMetrics};

/// What a run produced besides the per-match metrics.
#[derive(Debug, Default)]
pub struct RunOutcome {
    pub matches: usize,
    pub errors: Vec<String>,
}

pub struct Simulator {
    env: SessionEnv,
}

impl Simulator {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            env: AppState::new(config).session_env(),
        }
    }

    /// Run every match of `request`, handing each finished match to `on_match`.
    pub async fn run(
        &self,
        request: SessionRequest,
        mut on_match: impl FnMut(MatchMetrics),
    ) -> RunOutcome {
        let mut handle = start_session(request, self.env.clone());
        let mut collector = MatchCollector::new();
        let mut outcome = RunOutcome::default();

        while let Some(event) = handle.events.recv().await {
            if let StreamEvent::Log(log) = &event {
                match log.level {
                    LogLevel::Error => {
                        warn!(session_id = %handle.session_id, message = %log.message, "session error");
                        outcome.errors.push(log.message.clone());
                    }
                    _ => debug!(session_id = %handle.session_id, message = %log.message, "session log"),
                }
            }
            if let Some(metrics) = collector.observe(event) {
                outcome.matches += 1;
                on_match(metrics);
            }
        }
        outcome
    }
}
