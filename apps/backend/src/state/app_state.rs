use std::sync::Arc;

use crate::config::arena::ArenaConfig;
use crate::services::session::SessionEnv;
use crate::services::tickets::TicketDesk;

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    /// Outstanding human tickets across all sessions
    pub tickets: Arc<TicketDesk>,
    /// Server and agent configuration
    pub config: ArenaConfig,
    /// Shared outbound client for remote agents
    pub http: reqwest::Client,
}

impl AppState {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            tickets: TicketDesk::shared(),
            config,
            http: reqwest::Client::new(),
        }
    }

    /// What a new session borrows from the server.
    pub fn session_env(&self) -> SessionEnv {
        SessionEnv {
            http: self.http.clone(),
            config: self.config.clone(),
            desk: self.tickets.clone(),
        }
    }

    /// State with default configuration and tight human grace, for tests.
    pub fn for_tests() -> Self {
        Self::new(ArenaConfig {
            human_grace_ms: 100,
            ..ArenaConfig::default()
        })
    }
}
