use actix_web::{web, HttpResponse};
use serde::Serialize;
use tracing::info;

use crate::domain::Seat;
use crate::error::AppError;
use crate::protocol::HumanDecisionRequest;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HumanDecisionResponse {
    ok: bool,
    session_id: String,
    request_id: String,
    seat: Seat,
}

/// `POST /api/human/decision`: resolve one outstanding ticket.
async fn submit_decision(
    body: web::Bytes,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body: HumanDecisionRequest = serde_json::from_slice(&body)?;
    let session_id = body.session_id.clone();
    let request_id = body.request_id.clone();

    let decision = body.into_decision()?;
    let seat = app_state
        .tickets
        .fulfill(&session_id, &request_id, decision)?;
    info!(session_id = %session_id, request_id = %request_id, seat, "human decision accepted");

    Ok(HttpResponse::Ok().json(HumanDecisionResponse {
        ok: true,
        session_id,
        request_id,
        seat,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/decision", web::post().to(submit_decision));
}
