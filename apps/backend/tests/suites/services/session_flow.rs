//! Sessions between heuristic seats: event order, settlement and replay.

use arena_backend::ai::AgentSpec;
use arena_backend::domain::bidding::BiddingMode;
use arena_backend::domain::Four2Policy;
use arena_backend::services::session::{start_session, SessionRequest};
use arena_backend::services::tickets::TicketDesk;
use serde_json::Value;

use crate::common::{collect, of_kind, of_type, test_env};

fn heuristic_request(seed: u64, matches: u32) -> SessionRequest {
    SessionRequest {
        session_id: None,
        agents: vec![AgentSpec::Heuristic; 3],
        matches,
        seed: Some(seed),
        policy: Four2Policy::Both,
        bidding: BiddingMode::Auto,
        extra_double: false,
        base_score: 1,
        timeout_ms: None,
        seat_timeouts_ms: None,
    }
}

async fn run(request: SessionRequest) -> Vec<Value> {
    collect(start_session(request, test_env(TicketDesk::shared()))).await
}

fn moves_only(events: &[Value]) -> Vec<Value> {
    events
        .iter()
        .filter(|e| e["type"] == "event" && (e["kind"] == "play" || e["kind"] == "pass"))
        .cloned()
        .collect()
}

#[tokio::test]
async fn heuristic_match_streams_in_order_and_settles() {
    let events = run(heuristic_request(7, 1)).await;

    // Bidding evaluations precede the init line; stats close the match.
    let init_at = events
        .iter()
        .position(|e| e["type"] == "init")
        .expect("init line");
    assert_eq!(of_kind(&events[..init_at], "bid-eval").len(), 3);
    assert_eq!(events.last().unwrap()["type"], "stats");
    assert!(of_type(&events, "log").is_empty(), "unexpected log lines");

    let init = &events[init_at];
    assert_eq!(init["hands"][0].as_array().unwrap().len(), 17);
    assert_eq!(init["bottom"].as_array().unwrap().len(), 3);

    let results = of_type(&events, "result");
    assert_eq!(results.len(), 1);
    let result = results[0];
    let deltas: Vec<i64> = result["deltas"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d.as_i64().unwrap())
        .collect();
    assert_eq!(deltas.iter().sum::<i64>(), 0);
    assert_eq!(result["totals"], result["deltas"]);
    assert_eq!(result["landlord"], init["landlord"]);
    assert_eq!(
        result["landlordWon"],
        Value::Bool(result["winner"] == result["landlord"])
    );

    // The winner's last play empties the hand.
    let last_play = of_kind(&events, "play").last().copied().expect("some play");
    assert_eq!(last_play["seat"], result["winner"]);
    assert_eq!(last_play["cardsLeft"], 0);

    // Every decision was answered in time with a legal move.
    let done = of_kind(&events, "bot-done");
    assert_eq!(done.len(), of_kind(&events, "bot-call").len());
    assert!(done
        .iter()
        .all(|d| d["outcome"] == "ok" && d["fallback"] == false));
    assert_eq!(done.len(), of_type(&events, "turn").len());
}

#[tokio::test]
async fn totals_accumulate_across_matches() {
    let events = run(heuristic_request(42, 3)).await;

    let results = of_type(&events, "result");
    assert_eq!(results.len(), 3);
    assert_eq!(of_type(&events, "init").len(), 3);
    assert_eq!(of_type(&events, "stats").len(), 3);

    let mut totals = [0i64; 3];
    for (i, result) in results.iter().enumerate() {
        assert_eq!(result["matchNo"], (i + 1) as u64);
        for (seat, total) in totals.iter_mut().enumerate() {
            *total += result["deltas"][seat].as_i64().unwrap();
        }
        let reported: Vec<i64> = result["totals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t.as_i64().unwrap())
            .collect();
        assert_eq!(reported, totals.to_vec());
    }

    // Matches are dealt from distinct derived seeds.
    let seeds: Vec<&Value> = of_type(&events, "init").iter().map(|i| &i["seed"]).collect();
    assert_ne!(seeds[0], seeds[1]);
    assert_ne!(seeds[1], seeds[2]);
}

#[tokio::test]
async fn same_seed_replays_the_same_match() {
    let first = run(heuristic_request(2024, 1)).await;
    let second = run(heuristic_request(2024, 1)).await;

    assert_eq!(moves_only(&first), moves_only(&second));
    assert_eq!(
        of_type(&first, "result")[0]["deltas"],
        of_type(&second, "result")[0]["deltas"]
    );
}

#[tokio::test]
async fn interactive_bidding_and_doubling_are_reported() {
    let mut request = heuristic_request(11, 1);
    request.bidding = BiddingMode::Interactive;
    request.extra_double = true;
    request.base_score = 2;
    let events = run(request).await;

    let bids = of_kind(&events, "bid-eval");
    assert_eq!(bids.len(), 3);
    assert!(bids.iter().all(|b| b["bid"].is_boolean()));

    let doubles = of_kind(&events, "extra-double");
    assert_eq!(doubles.len(), 3);
    let seats: Vec<u64> = doubles.iter().map(|d| d["seat"].as_u64().unwrap()).collect();
    assert_eq!(seats, vec![0, 1, 2]);

    let result = of_type(&events, "result")[0];
    assert_eq!(result["baseScore"], 2);
    let total = result["totalMultiplier"].as_i64().unwrap();
    let landlord = result["landlord"].as_u64().unwrap() as usize;
    assert_eq!(result["deltas"][landlord].as_i64().unwrap().abs(), 2 * 2 * total);

    // The last multiplier sync agrees with the settled multiplier.
    let last_sync = of_kind(&events, "multiplier-sync").last().copied().expect("sync");
    assert_eq!(last_sync["total"], result["totalMultiplier"]);
}

#[tokio::test]
async fn invalid_request_yields_single_error_line() {
    let mut request = heuristic_request(1, 1);
    request.agents.pop();
    let events = run(request).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["type"], "log");
    assert_eq!(events[0]["level"], "error");
    assert!(events[0]["message"]
        .as_str()
        .unwrap()
        .contains("expected 3 agents"));
}

#[tokio::test]
async fn relay_with_bad_scheme_is_rejected_up_front() {
    let mut request = heuristic_request(1, 1);
    request.agents[1] = AgentSpec::HttpRelay {
        url: "ftp://agents.invalid/decide".to_string(),
    };
    let events = run(request).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["level"], "error");
}
