//! HttpRelay: forwards each decision to an external service.
//!
//! The request body is `{"phase": .., "context": DecisionContext}`; the
//! service answers with the same reply shape the chat agent uses. Failures
//! go through [`Backoff`] and end in the local default, like `RemoteChat`.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::warn;

use crate::ai::backoff::{Backoff, BackoffPolicy, CallFailure, FailureClass};
use crate::ai::defaults::{fallback_bid, fallback_double, fallback_play};
use crate::ai::reply::AgentReply;
use crate::ai::trait_def::{AgentKind, AiError, AiPlayer, Decision, DecisionContext, Move};

pub struct HttpRelay {
    client: reqwest::Client,
    url: String,
    backoff: Backoff,
}

impl HttpRelay {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            backoff: Backoff::new(BackoffPolicy::default()),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn ask(&self, ctx: &DecisionContext) -> Result<AgentReply, CallFailure> {
        let response = self
            .client
            .post(&self.url)
            .timeout(Duration::from_millis(ctx.timeout_ms))
            .json(&json!({ "phase": ctx.phase, "context": ctx }))
            .send()
            .await
            .map_err(|e| CallFailure::new(FailureClass::Other, format!("transport: {e}")))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(CallFailure::new(FailureClass::RateLimit, "status 429"));
        }
        if !status.is_success() {
            return Err(CallFailure::new(
                FailureClass::Other,
                format!("status {status}"),
            ));
        }
        response
            .json::<AgentReply>()
            .await
            .map_err(|e| CallFailure::new(FailureClass::Other, format!("bad reply: {e}")))
    }

    async fn decide<T>(
        &self,
        ctx: &DecisionContext,
        convert: fn(AgentReply) -> Result<Decision<T>, AiError>,
        fallback: fn(&DecisionContext) -> Decision<T>,
    ) -> Decision<T> {
        let outcome = self
            .backoff
            .run(|_| self.ask(ctx))
            .await
            .and_then(|reply| {
                convert(reply).map_err(|e| CallFailure::new(FailureClass::Other, e.to_string()))
            });
        match outcome {
            Ok(decision) => decision,
            Err(failure) => {
                warn!(
                    session_id = %ctx.session_id,
                    seat = ctx.seat,
                    url = %self.url,
                    error = %failure.message,
                    "relay failed, using local decision"
                );
                fallback(ctx).with_reason(format!("relay failed: {}", failure.message))
            }
        }
    }
}

#[async_trait]
impl AiPlayer for HttpRelay {
    fn kind(&self) -> AgentKind {
        AgentKind::HttpRelay
    }

    fn label(&self) -> String {
        format!("http-relay:{}", self.url)
    }

    async fn choose_bid(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError> {
        Ok(self.decide(ctx, AgentReply::into_bid, fallback_bid).await)
    }

    async fn choose_double(&self, ctx: &DecisionContext) -> Result<Decision<bool>, AiError> {
        Ok(self.decide(ctx, AgentReply::into_double, fallback_double).await)
    }

    async fn choose_play(&self, ctx: &DecisionContext) -> Result<Decision<Move>, AiError> {
        Ok(self.decide(ctx, AgentReply::into_move, fallback_play).await)
    }
}
