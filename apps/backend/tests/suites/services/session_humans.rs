//! Sessions with a human seat driven through the ticket desk.

use std::sync::Arc;

use arena_backend::ai::{AgentSpec, DecisionPhase, Move};
use arena_backend::domain::bidding::BiddingMode;
use arena_backend::domain::{Card, Four2Policy};
use arena_backend::services::session::{start_session, SessionRequest};
use arena_backend::services::tickets::{HumanDecision, TicketDesk};
use serde_json::Value;

use crate::common::{of_kind, of_type, test_env, to_value};

const HUMAN: u64 = 2;

fn request_with_human(seed: u64) -> SessionRequest {
    SessionRequest {
        session_id: Some(format!("human-{seed}")),
        agents: vec![AgentSpec::Heuristic, AgentSpec::Heuristic, AgentSpec::Human],
        matches: 1,
        seed: Some(seed),
        policy: Four2Policy::Both,
        bidding: BiddingMode::Auto,
        extra_double: false,
        base_score: 1,
        timeout_ms: Some(1_000),
        seat_timeouts_ms: None,
    }
}

fn play_decision(mv: Move) -> HumanDecision {
    HumanDecision {
        phase: DecisionPhase::Play,
        bid: None,
        double: None,
        mv: Some(mv),
        reason: Some("from test".into()),
    }
}

/// Run a session, answering each human request with `answer`.
async fn drive(
    request: SessionRequest,
    answer: impl Fn(&Value) -> Option<Move>,
) -> (Vec<Value>, Arc<TicketDesk>) {
    let desk = TicketDesk::shared();
    let mut handle = start_session(request, test_env(desk.clone()));
    let mut events = Vec::new();
    while let Some(event) = handle.events.recv().await {
        let value = to_value(&event.to_line());
        if value["type"] == "human-request" {
            if let Some(mv) = answer(&value) {
                let seat = desk
                    .fulfill(
                        value["sessionId"].as_str().unwrap(),
                        value["requestId"].as_str().unwrap(),
                        play_decision(mv),
                    )
                    .expect("ticket is open");
                assert_eq!(seat as u64, HUMAN);
            }
        }
        events.push(value);
    }
    (events, desk)
}

fn first_legal(request: &Value) -> Move {
    match request["legalMoves"].as_array().and_then(|m| m.first()) {
        Some(cards) => Move::Play {
            cards: serde_json::from_value::<Vec<Card>>(cards.clone()).unwrap(),
        },
        None => Move::Pass,
    }
}

fn human_done(events: &[Value]) -> Vec<&Value> {
    of_kind(events, "bot-done")
        .into_iter()
        .filter(|d| d["seat"] == HUMAN)
        .collect()
}

#[tokio::test(start_paused = true)]
async fn silent_human_times_out_and_match_completes() {
    let (events, desk) = drive(request_with_human(5), |_| None).await;

    let requests = of_type(&events, "human-request");
    assert!(!requests.is_empty());
    assert!(requests.iter().all(|r| r["seat"] == HUMAN && r["phase"] == "play"));
    assert!(requests.iter().all(|r| r["hint"].is_object()));

    let done = human_done(&events);
    assert_eq!(done.len(), requests.len());
    for d in &done {
        assert_eq!(d["outcome"], "timeout");
        assert_eq!(d["fallback"], true);
        // Budget plus the default grace.
        assert!(d["elapsedMs"].as_u64().unwrap() >= 2_500);
    }

    assert_eq!(of_type(&events, "result").len(), 1);
    assert_eq!(desk.open_count("human-5"), 0);
}

#[tokio::test]
async fn answered_human_moves_are_committed() {
    let (events, desk) = drive(request_with_human(9), |r| Some(first_legal(r))).await;

    let done = human_done(&events);
    assert!(!done.is_empty());
    assert!(done
        .iter()
        .all(|d| d["outcome"] == "ok" && d["fallback"] == false));

    // Committed human plays carry the answer's reason.
    assert!(of_kind(&events, "play")
        .iter()
        .filter(|p| p["seat"] == HUMAN)
        .all(|p| p["reason"] == "from test"));

    assert_eq!(of_type(&events, "result").len(), 1);
    assert_eq!(desk.open_count("human-9"), 0);
}

#[tokio::test]
async fn illegal_human_answer_is_replaced() {
    let empty_play = || Some(Move::Play { cards: Vec::new() });
    let (events, _) = drive(request_with_human(13), |_| empty_play()).await;

    let done = human_done(&events);
    assert!(!done.is_empty());
    for d in &done {
        assert_eq!(d["outcome"], "invalid");
        assert_eq!(d["fallback"], true);
        assert!(d["reason"]
            .as_str()
            .unwrap()
            .starts_with("illegal answer replaced"));
    }
    assert_eq!(of_type(&events, "result").len(), 1);
}
