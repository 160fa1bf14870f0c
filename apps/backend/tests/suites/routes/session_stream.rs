use actix_web::{test, web, App};
use arena_backend::routes;
use arena_backend::state::app_state::AppState;
use serde_json::json;

use crate::common::{ndjson_lines, of_type};

macro_rules! init_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(AppState::for_tests()))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn stream_runs_session_to_completion() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/api/sessions/stream")
        .set_json(json!({
            "sessionId": "stream-1",
            "agents": [{"kind": "heuristic"}, {"kind": "heuristic"}, {"kind": "heuristic"}],
            "matches": 2,
            "seed": 99,
            "policy": "singles",
            "baseScore": 3
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap().to_str().unwrap(),
        "application/x-ndjson"
    );

    let body = test::read_body(resp).await;
    let lines = ndjson_lines(&body);

    let inits = of_type(&lines, "init");
    assert_eq!(inits.len(), 2);
    assert!(inits
        .iter()
        .all(|i| i["sessionId"] == "stream-1" && i["policy"] == "singles"));
    assert_eq!(of_type(&lines, "result").len(), 2);
    assert_eq!(lines.last().unwrap()["type"], "stats");
}

#[actix_web::test]
async fn malformed_request_streams_one_error_line() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/api/sessions/stream")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"agents\": 3}")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let lines = ndjson_lines(&test::read_body(resp).await);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["type"], "log");
    assert_eq!(lines[0]["level"], "error");
}

#[actix_web::test]
async fn invalid_session_shape_streams_one_error_line() {
    let app = init_app!();
    let req = test::TestRequest::post()
        .uri("/api/sessions/stream")
        .set_json(json!({
            "agents": [{"kind": "heuristic"}, {"kind": "heuristic"}, {"kind": "heuristic"}],
            "matches": 0
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let lines = ndjson_lines(&test::read_body(resp).await);
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["message"].as_str().unwrap().contains("matches"));
}
