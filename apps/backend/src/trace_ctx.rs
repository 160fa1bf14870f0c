//! Task-local request id for HTTP handlers.
//!
//! `RequestTrace` wraps every request future in [`with_trace_id`], so error
//! responses and handler logs can read the id without threading it through
//! arguments. Session tasks spawned from a handler do not inherit the scope;
//! they log with their `session_id` instead.

use tokio::task_local;

const UNKNOWN: &str = "unknown";

task_local! {
    static TRACE_ID: String;
}

/// The request id of the current task, or `"unknown"` outside a request.
pub fn trace_id() -> String {
    TRACE_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| UNKNOWN.to_string())
}

/// Run `future` with `trace_id` visible through [`trace_id`].
pub async fn with_trace_id<F, R>(trace_id: String, future: F) -> R
where
    F: std::future::Future<Output = R>,
{
    TRACE_ID.scope(trace_id, future).await
}
