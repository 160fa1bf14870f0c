//! Agent construction.
//!
//! Built-in agents that need nothing but themselves are listed in a static
//! factory table, looked up by stable `name`. Seats in a session are
//! described by an [`AgentSpec`] and built with [`build_agent`], which
//! wires in the shared HTTP client, the ticket desk and the session's event
//! channel for the variants that need them.

use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::mpsc::UnboundedSender;

use crate::ai::http_relay::HttpRelay;
use crate::ai::human::HumanRelay;
use crate::ai::remote_chat::{RemoteChat, RemoteChatConfig};
use crate::ai::{AiPlayer, Heuristic};
use crate::config::arena::ArenaConfig;
use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::protocol::events::StreamEvent;
use crate::services::tickets::TicketDesk;

/// Factory definition for constructing self-contained agents.
pub struct AiFactory {
    pub name: &'static str,
    pub version: &'static str,
    pub make: fn() -> Arc<dyn AiPlayer>,
}

static AI_FACTORIES: &[AiFactory] = &[AiFactory {
    name: Heuristic::NAME,
    version: Heuristic::VERSION,
    make: make_heuristic,
}];

/// Returns the statically registered agent factories.
pub fn registered_ais() -> &'static [AiFactory] {
    AI_FACTORIES
}

/// Finds a registered agent factory by its name.
pub fn by_name(name: &str) -> Option<&'static AiFactory> {
    registered_ais().iter().find(|factory| factory.name == name)
}

fn make_heuristic() -> Arc<dyn AiPlayer> {
    Arc::new(Heuristic::new())
}

/// One seat's agent as requested by a session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum AgentSpec {
    Heuristic,
    #[serde(rename_all = "camelCase")]
    RemoteChat {
        #[serde(default)]
        model: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        api_key: Option<String>,
    },
    HttpRelay {
        url: String,
    },
    Human,
}

impl AgentSpec {
    pub fn is_human(&self) -> bool {
        matches!(self, AgentSpec::Human)
    }
}

/// What agents may borrow from the server and the session.
#[derive(Clone)]
pub struct AgentDeps {
    pub http: reqwest::Client,
    pub config: ArenaConfig,
    pub desk: Arc<TicketDesk>,
    pub events: UnboundedSender<StreamEvent>,
}

pub fn build_agent(spec: &AgentSpec, deps: &AgentDeps) -> Result<Arc<dyn AiPlayer>, AppError> {
    let agent: Arc<dyn AiPlayer> = match spec {
        AgentSpec::Heuristic => {
            let factory = by_name(Heuristic::NAME).ok_or_else(|| {
                AppError::internal(format!("agent factory '{}' missing", Heuristic::NAME))
            })?;
            (factory.make)()
        }
        AgentSpec::RemoteChat {
            model,
            base_url,
            api_key,
        } => {
            let config = RemoteChatConfig {
                base_url: base_url
                    .clone()
                    .unwrap_or_else(|| deps.config.llm_api_base.clone()),
                api_key: api_key.clone().or_else(|| deps.config.llm_api_key.clone()),
                model: model.clone().unwrap_or_else(|| deps.config.llm_model.clone()),
                ..RemoteChatConfig::default()
            };
            Arc::new(RemoteChat::new(deps.http.clone(), config))
        }
        AgentSpec::HttpRelay { url } => {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::bad_request(
                    ErrorCode::InvalidSessionRequest,
                    format!("relay url must be http(s): {url}"),
                ));
            }
            Arc::new(HttpRelay::new(deps.http.clone(), url.clone()))
        }
        AgentSpec::Human => Arc::new(HumanRelay::new(
            deps.desk.clone(),
            deps.events.clone(),
            deps.config.human_grace_ms,
        )),
    };
    Ok(agent)
}
