#![allow(dead_code)]

// tests/common/mod.rs
use std::sync::Arc;

use arena_backend::config::arena::ArenaConfig;
use arena_backend::services::session::{SessionEnv, SessionHandle};
use arena_backend::services::tickets::TicketDesk;
use once_cell::sync::OnceCell;
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

// Logging is auto-installed for every test binary that includes this module
#[ctor::ctor]
fn init_logging() {
    LOGGING.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}

/// Session environment with a private ticket desk.
pub fn test_env(desk: Arc<TicketDesk>) -> SessionEnv {
    SessionEnv {
        http: reqwest::Client::new(),
        config: ArenaConfig::default(),
        desk,
    }
}

/// Drain a session stream into JSON values until the session closes it.
pub async fn collect(mut handle: SessionHandle) -> Vec<Value> {
    let mut out = Vec::new();
    while let Some(event) = handle.events.recv().await {
        out.push(to_value(&event.to_line()));
    }
    out
}

pub fn to_value(line: &str) -> Value {
    serde_json::from_str(line.trim_end()).expect("stream line is JSON")
}

/// Parse an NDJSON body into one value per line.
pub fn ndjson_lines(body: &[u8]) -> Vec<Value> {
    std::str::from_utf8(body)
        .expect("utf8 body")
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(to_value)
        .collect()
}

pub fn of_type<'a>(events: &'a [Value], ty: &str) -> Vec<&'a Value> {
    events.iter().filter(|e| e["type"] == ty).collect()
}

pub fn of_kind<'a>(events: &'a [Value], kind: &str) -> Vec<&'a Value> {
    events
        .iter()
        .filter(|e| e["type"] == "event" && e["kind"] == kind)
        .collect()
}

/// Helper function to check that the trace_id in the response body matches the X-Trace-Id header
pub fn assert_trace_id_matches(json: &Value, header_trace_id: &str) {
    let trace_id_in_body = json["trace_id"]
        .as_str()
        .expect("trace_id field should be a string");
    assert_eq!(
        trace_id_in_body, header_trace_id,
        "trace_id in body should match X-Trace-Id header"
    );
}
