use actix_web::{test, web, App};
use arena_backend::routes;
use arena_backend::state::app_state::AppState;
use serde_json::Value;

#[actix_web::test]
async fn test_health_endpoint() {
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(AppState::for_tests()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert!(body["app_version"].is_string());
    assert!(body["time"].as_str().unwrap().contains('T'));
}
