//! Retry/backoff policy for remote agents.
//!
//! Failures are classified as rate limiting, content-safety rejection or
//! other. Rate limits are paced and retried after a cooldown. Content-safety
//! rejections walk down the prompt ladder and open a risk window in which
//! calls are spaced wider and start from the reduced prompt. Anything else
//! is returned immediately so the agent can fall back locally.

use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FailureClass {
    RateLimit,
    ContentSafety,
    Other,
}

/// Prompt verbosity, most to least.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub enum PromptLevel {
    Full,
    Reduced,
    Minimal,
}

impl PromptLevel {
    pub fn next(self) -> Option<PromptLevel> {
        match self {
            PromptLevel::Full => Some(PromptLevel::Reduced),
            PromptLevel::Reduced => Some(PromptLevel::Minimal),
            PromptLevel::Minimal => None,
        }
    }
}

/// A classified failed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub class: FailureClass,
    pub message: String,
}

impl CallFailure {
    pub fn new(class: FailureClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    pub min_spacing: Duration,
    pub cooldown: Duration,
    pub max_rate_retries: u32,
    pub risk_window: Duration,
    pub risk_spacing: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            min_spacing: Duration::from_millis(250),
            cooldown: Duration::from_millis(1500),
            max_rate_retries: 2,
            risk_window: Duration::from_secs(60),
            risk_spacing: Duration::from_millis(1000),
        }
    }
}

#[derive(Debug, Default)]
struct BackoffState {
    next_slot: Option<Instant>,
    risk_until: Option<Instant>,
}

/// Per-agent pacing state.
#[derive(Debug)]
pub struct Backoff {
    policy: BackoffPolicy,
    state: Mutex<BackoffState>,
}

impl Backoff {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(BackoffState::default()),
        }
    }

    pub fn in_risk_mode(&self) -> bool {
        let state = self.state.lock();
        state.risk_until.is_some_and(|until| Instant::now() < until)
    }

    pub fn starting_level(&self) -> PromptLevel {
        if self.in_risk_mode() {
            PromptLevel::Reduced
        } else {
            PromptLevel::Full
        }
    }

    pub fn enter_risk_mode(&self) {
        let mut state = self.state.lock();
        state.risk_until = Some(Instant::now() + self.policy.risk_window);
    }

    /// Push the next call slot out by `delay`.
    fn defer(&self, delay: Duration) {
        let mut state = self.state.lock();
        let at = Instant::now() + delay;
        if state.next_slot.map_or(true, |slot| slot < at) {
            state.next_slot = Some(at);
        }
    }

    /// Wait for this caller's slot and reserve the following one.
    pub async fn pace(&self) {
        let wait_until = {
            let mut state = self.state.lock();
            let now = Instant::now();
            let spacing = if state.risk_until.is_some_and(|until| now < until) {
                self.policy.risk_spacing
            } else {
                self.policy.min_spacing
            };
            let slot = state.next_slot.filter(|s| *s > now).unwrap_or(now);
            state.next_slot = Some(slot + spacing);
            slot
        };
        sleep_until(wait_until).await;
    }

    /// Run `call` under the policy. `call` receives the prompt level to use.
    pub async fn run<T, F, Fut>(&self, mut call: F) -> Result<T, CallFailure>
    where
        F: FnMut(PromptLevel) -> Fut,
        Fut: Future<Output = Result<T, CallFailure>>,
    {
        let mut level = self.starting_level();
        let mut rate_retries = 0u32;
        loop {
            self.pace().await;
            let failure = match call(level).await {
                Ok(value) => return Ok(value),
                Err(failure) => failure,
            };
            match failure.class {
                FailureClass::RateLimit if rate_retries < self.policy.max_rate_retries => {
                    rate_retries += 1;
                    debug!(attempt = rate_retries, "rate limited, cooling down");
                    self.defer(self.policy.cooldown);
                }
                FailureClass::ContentSafety => {
                    self.enter_risk_mode();
                    match level.next() {
                        Some(next) => {
                            warn!(?level, ?next, "content rejected, reducing prompt");
                            level = next;
                        }
                        None => return Err(failure),
                    }
                }
                _ => return Err(failure),
            }
        }
    }
}
