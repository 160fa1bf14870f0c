use actix_web::{test, web, App};
use arena_backend::ai::{DecisionPhase, Move};
use arena_backend::domain::try_parse_cards;
use arena_backend::middleware::request_trace::RequestTrace;
use arena_backend::routes;
use arena_backend::state::app_state::AppState;
use serde_json::{json, Value};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestTrace)
                .app_data(web::Data::new($state.clone()))
                .configure(routes::configure),
        )
        .await
    };
}

/// POST a decision body; yields `(status, json body)`.
macro_rules! post_decision {
    ($app:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/human/decision")
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        let status = resp.status().as_u16();
        let body: Value = test::read_body_json(resp).await;
        (status, body)
    }};
}

#[actix_web::test]
async fn decision_resolves_open_ticket_once() {
    let state = AppState::for_tests();
    let app = init_app!(state);
    let waiter = state.tickets.register("s1", "m1-d1", 1, DecisionPhase::Bid);

    let body = json!({"sessionId": "s1", "requestId": "m1-d1", "phase": "bid", "bid": true});
    let (status, resp) = post_decision!(app, body.clone());
    assert_eq!(status, 200);
    assert_eq!(resp["ok"], true);
    assert_eq!(resp["seat"], 1);

    let delivered = waiter.await.unwrap().unwrap();
    assert_eq!(delivered.bid, Some(true));

    let (status, resp) = post_decision!(app, body);
    assert_eq!(status, 404);
    assert_eq!(resp["code"], "TICKET_NOT_FOUND");
}

#[actix_web::test]
async fn play_decision_parses_cards() {
    let state = AppState::for_tests();
    let app = init_app!(state);
    let waiter = state.tickets.register("s2", "m1-d9", 0, DecisionPhase::Play);

    let (status, _) = post_decision!(
        app,
        json!({
            "sessionId": "s2",
            "requestId": "m1-d9",
            "phase": "play",
            "move": "play",
            "cards": ["7H", "7S"]
        })
    );
    assert_eq!(status, 200);

    let delivered = waiter.await.unwrap().unwrap();
    assert_eq!(
        delivered.mv,
        Some(Move::Play {
            cards: try_parse_cards(["7H", "7S"]).unwrap()
        })
    );
}

#[actix_web::test]
async fn expired_ticket_is_conflict() {
    let state = AppState::for_tests();
    let app = init_app!(state);
    let _waiter = state.tickets.register("s3", "m1-d2", 2, DecisionPhase::Play);
    state.tickets.invalidate("s3", "m1-d2");

    let (status, resp) = post_decision!(
        app,
        json!({"sessionId": "s3", "requestId": "m1-d2", "phase": "play", "move": "pass"})
    );
    assert_eq!(status, 409);
    assert_eq!(resp["code"], "TICKET_EXPIRED");
}

#[actix_web::test]
async fn phase_mismatch_is_conflict() {
    let state = AppState::for_tests();
    let app = init_app!(state);
    let _waiter = state.tickets.register("s4", "m1-d3", 0, DecisionPhase::Double);

    let (status, resp) = post_decision!(
        app,
        json!({"sessionId": "s4", "requestId": "m1-d3", "phase": "bid", "bid": false})
    );
    assert_eq!(status, 409);
    assert_eq!(resp["code"], "PHASE_MISMATCH");

    // The ticket survives a mismatched answer.
    assert_eq!(state.tickets.open_count("s4"), 1);
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    let state = AppState::for_tests();
    let app = init_app!(state);
    let _waiter = state.tickets.register("s5", "m1-d4", 0, DecisionPhase::Play);

    let (status, resp) = post_decision!(app, json!({"sessionId": "s5"}));
    assert_eq!(status, 400);
    assert_eq!(resp["code"], "BAD_REQUEST");

    let (status, resp) = post_decision!(
        app,
        json!({"sessionId": "s5", "requestId": "m1-d4", "phase": "play", "move": "play", "cards": ["1Z"]})
    );
    assert_eq!(status, 400);
    assert_eq!(resp["code"], "PARSE_CARD");

    let (status, resp) = post_decision!(
        app,
        json!({"sessionId": "s5", "requestId": "m1-d4", "phase": "play"})
    );
    assert_eq!(status, 400);
    assert_eq!(resp["code"], "INVALID_SESSION_REQUEST");

    assert_eq!(state.tickets.open_count("s5"), 1);
}
