use actix_web::{test, web, App, HttpResponse};
use arena_backend::middleware::request_trace::RequestTrace;
use arena_backend::{AppError, ErrorCode};
use serde_json::Value;

use crate::common::assert_trace_id_matches;

async fn unprocessable() -> Result<HttpResponse, AppError> {
    Err(AppError::invalid(
        ErrorCode::InvalidSeat,
        "seat 7 does not exist".to_string(),
    ))
}

async fn upstream() -> Result<HttpResponse, AppError> {
    Err(AppError::Upstream {
        detail: "relay refused".to_string(),
    })
}

#[actix_web::test]
async fn test_error_responses_are_problem_details() {
    let app = test::init_service(
        App::new()
            .wrap(RequestTrace)
            .route("/_test/invalid", web::get().to(unprocessable))
            .route("/_test/upstream", web::get().to(upstream)),
    )
    .await;

    for (uri, status, code) in [
        ("/_test/invalid", 422, "INVALID_SEAT"),
        ("/_test/upstream", 502, "UPSTREAM_ERROR"),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), status, "{uri}");

        let headers = resp.headers().clone();
        let trace_id = headers
            .get("x-trace-id")
            .expect("x-trace-id header")
            .to_str()
            .unwrap()
            .to_string();
        assert!(!trace_id.is_empty());
        assert_eq!(
            headers.get("content-type").unwrap().to_str().unwrap(),
            "application/problem+json"
        );

        let body: Value = test::read_body_json(resp).await;
        for key in ["type", "title", "status", "detail", "code", "trace_id"] {
            assert!(body.get(key).is_some(), "missing {key}");
        }
        assert_eq!(body["code"], code);
        assert_eq!(body["status"], status);
        assert_trace_id_matches(&body, &trace_id);
    }
}
