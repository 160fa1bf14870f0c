//! RemoteChat: agent backed by an OpenAI-compatible chat completion API.
//!
//! Each decision is one `POST {base}/chat/completions` carrying a
//! phase-specific instruction and the seat's view of the table. The prompt
//! shrinks down the ladder (`Full`, `Reduced`, `Minimal`) when the upstream
//! rejects it on content grounds. Calls go through [`Backoff`]; once it gives
//! up the agent answers with the local default instead of an error.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::ai::backoff::{Backoff, BackoffPolicy, CallFailure, FailureClass, PromptLevel};
use crate::ai::defaults::{fallback_bid, fallback_double, fallback_play};
use crate::ai::reply::{parse_reply, AgentReply};
use crate::ai::trait_def::{
    AgentKind, AiError, AiPlayer, Decision, DecisionContext, DecisionPhase, Move, TokenUsage,
};
use crate::domain::format_cards;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone)]
pub struct RemoteChatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

impl Default for RemoteChatConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.2,
        }
    }
}

pub struct RemoteChat {
    client: reqwest::Client,
    config: RemoteChatConfig,
    backoff: Backoff,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatReplyMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl From<ChatUsage> for TokenUsage {
    fn from(u: ChatUsage) -> Self {
        TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
        }
    }
}

fn instruction(phase: DecisionPhase) -> &'static str {
    match phase {
        DecisionPhase::Bid => {
            "You are a seat in a three-player landlord card game. Decide whether to bid for \
             landlord. Answer with one JSON object: {\"bid\": true|false, \"reason\": \"...\"}."
        }
        DecisionPhase::Double => {
            "You are a seat in a three-player landlord card game. Decide whether to double the \
             stakes. Answer with one JSON object: {\"double\": true|false, \"reason\": \"...\"}."
        }
        DecisionPhase::Play => {
            "You are a seat in a three-player landlord card game. Pick exactly one of the legal \
             moves. Answer with one JSON object: {\"move\": \"play\", \"cards\": [\"3S\", ...], \
             \"reason\": \"...\"} or {\"move\": \"pass\", \"reason\": \"...\"}."
        }
    }
}

fn legal_labels(ctx: &DecisionContext) -> Vec<String> {
    ctx.legal_moves.iter().map(|m| format_cards(m)).collect()
}

/// User message for `ctx` at the given verbosity.
pub fn build_prompt(ctx: &DecisionContext, level: PromptLevel) -> String {
    let body: Value = match level {
        PromptLevel::Full => json!({
            "phase": ctx.phase,
            "seat": ctx.seat,
            "role": ctx.role,
            "landlord": ctx.landlord,
            "hand": format_cards(&ctx.hand),
            "handSizes": ctx.hand_sizes,
            "bottom": ctx.bottom.as_deref().map(format_cards),
            "requirement": ctx.requirement.as_ref().map(|c| json!({
                "kind": c.kind,
                "cards": format_cards(&c.cards),
                "bySeat": ctx.last_play_seat,
            })),
            "seenBySeat": ctx.seen_by_seat.iter().map(|s| format_cards(s)).collect::<Vec<_>>(),
            "fourWithTwo": ctx.policy,
            "legalMoves": legal_labels(ctx),
            "canPass": ctx.can_pass,
        }),
        PromptLevel::Reduced => json!({
            "phase": ctx.phase,
            "hand": format_cards(&ctx.hand),
            "requirement": ctx.requirement.as_ref().map(|c| format_cards(&c.cards)),
            "legalMoves": legal_labels(ctx),
            "canPass": ctx.can_pass,
        }),
        PromptLevel::Minimal => json!({
            "phase": ctx.phase,
            "legalMoves": legal_labels(ctx),
            "canPass": ctx.can_pass,
        }),
    };
    body.to_string()
}

/// Map an upstream HTTP failure to a backoff class.
pub fn classify_status(status: u16, body: &str) -> FailureClass {
    let lowered = body.to_ascii_lowercase();
    match status {
        429 => FailureClass::RateLimit,
        400 | 403
            if lowered.contains("content_filter")
                || lowered.contains("content policy")
                || lowered.contains("content_policy") =>
        {
            FailureClass::ContentSafety
        }
        _ => FailureClass::Other,
    }
}

impl RemoteChat {
    pub const NAME: &'static str = "remote-chat";

    pub fn new(client: reqwest::Client, config: RemoteChatConfig) -> Self {
        Self::with_policy(client, config, BackoffPolicy::default())
    }

    pub fn with_policy(
        client: reqwest::Client,
        config: RemoteChatConfig,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            client,
            config,
            backoff: Backoff::new(policy),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn ask(
        &self,
        ctx: &DecisionContext,
        level: PromptLevel,
    ) -> Result<AgentReply, CallFailure> {
        let request = ChatRequest {
            model: &self.config.model,
            temperature: self.config.temperature,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: instruction(ctx.phase).to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(ctx, level),
                },
            ],
        };

        let mut builder = self
            .client
            .post(self.endpoint())
            .timeout(Duration::from_millis(ctx.timeout_ms))
            .json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        debug!(session_id = %ctx.session_id, seat = ctx.seat, phase = ctx.phase.as_str(), ?level, "chat request");
        let response = builder
            .send()
            .await
            .map_err(|e| CallFailure::new(FailureClass::Other, format!("transport: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let class = classify_status(status.as_u16(), &body);
            return Err(CallFailure::new(class, format!("status {status}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| CallFailure::new(FailureClass::Other, format!("bad response: {e}")))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CallFailure::new(FailureClass::Other, "no choices"))?;
        if choice.finish_reason.as_deref() == Some("content_filter") {
            return Err(CallFailure::new(
                FailureClass::ContentSafety,
                "finish_reason content_filter",
            ));
        }
        let content = choice
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| CallFailure::new(FailureClass::Other, "empty message"))?;

        let mut reply =
            parse_reply(&content).map_err(|e| CallFailure::new(FailureClass::Other, e.to_string()))?;
        if reply.usage.is_none() {
            reply.usage = parsed.usage.map(TokenUsage::from);
        }
        Ok(reply)
    }

    /// Ask upstream and convert; any failure yields `fallback` annotated with the cause.
    async fn decide<T>(
        &self,
        ctx: &DecisionContext,
        convert: fn(AgentReply) -> Result<Decision<T>, AiError>,
        fallback: fn(&DecisionContext) -> Decision<T>,
    ) -> Decision<T> {
        let outcome = self
            .backoff
            .run(|level| self.ask(ctx, level))
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
                    phase = ctx.phase.as_str(),
                    class = ?failure.class,
                    error = %failure.message,
                    "remote chat failed, using local decision"
                );
                let local = fallback(ctx);
                let reason = format!("remote failed ({:?}): {}", failure.class, failure.message);
                local.with_reason(reason)
            }
        }
    }
}

#[async_trait]
impl AiPlayer for RemoteChat {
    fn kind(&self) -> AgentKind {
        AgentKind::RemoteChat
    }

    fn label(&self) -> String {
        format!("{}:{}", Self::NAME, self.config.model)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::scoring::test_support::play_ctx;
    use crate::domain::{classify, try_parse_cards, Four2Policy};

    #[test]
    fn prompt_ladder_drops_detail() {
        let req = classify(&try_parse_cards(["4S"]).unwrap(), Four2Policy::Both);
        let ctx = play_ctx(1, 0, try_parse_cards(["5S", "9H"]).unwrap(), req);

        let full = build_prompt(&ctx, PromptLevel::Full);
        let reduced = build_prompt(&ctx, PromptLevel::Reduced);
        let minimal = build_prompt(&ctx, PromptLevel::Minimal);

        assert!(full.contains("seenBySeat"));
        assert!(!reduced.contains("seenBySeat"));
        assert!(reduced.contains("\"hand\""));
        assert!(!minimal.contains("\"hand\""));
        assert!(minimal.contains("legalMoves"));
        assert!(full.len() > reduced.len() && reduced.len() > minimal.len());
    }

    #[test]
    fn status_classification() {
        assert_eq!(classify_status(429, ""), FailureClass::RateLimit);
        assert_eq!(
            classify_status(400, r#"{"error":{"code":"content_filter"}}"#),
            FailureClass::ContentSafety
        );
        assert_eq!(classify_status(400, "bad json"), FailureClass::Other);
        assert_eq!(classify_status(500, "content_filter"), FailureClass::Other);
    }

    #[tokio::test]
    async fn unreachable_upstream_falls_back_with_reason() {
        let config = RemoteChatConfig {
            base_url: "http://127.0.0.1:9".into(),
            ..RemoteChatConfig::default()
        };
        let agent = RemoteChat::new(reqwest::Client::new(), config);
        let ctx = play_ctx(0, 0, try_parse_cards(["3S", "4H"]).unwrap(), None);

        let d = agent.choose_play(&ctx).await.unwrap();
        assert!(matches!(d.value, Move::Play { .. }));
        assert!(d.reason.unwrap().starts_with("remote failed"));
    }
}
