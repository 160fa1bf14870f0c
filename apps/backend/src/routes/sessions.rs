use actix_web::{web, HttpResponse};
use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};

use crate::error::AppError;
use crate::protocol::StreamEvent;
use crate::services::session::{rejected_stream, start_session, SessionRequest};
use crate::state::app_state::AppState;

fn ndjson(events: UnboundedReceiver<StreamEvent>) -> HttpResponse {
    let body = UnboundedReceiverStream::new(events)
        .map(|event| Ok::<_, actix_web::Error>(Bytes::from(event.to_line())));
    HttpResponse::Ok()
        .content_type("application/x-ndjson")
        .insert_header(("cache-control", "no-cache"))
        .streaming(body)
}

/// `POST /api/sessions/stream`
///
/// Always answers `200` with an NDJSON stream; a malformed body yields a
/// stream holding one error `log` line.
async fn stream_session(
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let request: SessionRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "malformed session request");
            return Ok(ndjson(rejected_stream(format!(
                "invalid session request: {e}"
            ))));
        }
    };

    let handle = start_session(request, app_state.session_env());
    info!(session_id = %handle.session_id, "session stream opened");
    Ok(ndjson(handle.events))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/stream", web::post().to(stream_session));
}
