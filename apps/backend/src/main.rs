use actix_web::{web, App, HttpServer};
use arena_backend::config::arena::ArenaConfig;
use arena_backend::middleware::cors::cors_middleware;
use arena_backend::middleware::request_trace::RequestTrace;
use arena_backend::middleware::structured_logger::StructuredLogger;
use arena_backend::routes;
use arena_backend::state::app_state::AppState;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let config = match ArenaConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Invalid arena configuration: {e}");
            std::process::exit(1);
        }
    };

    let host = config.host.clone();
    let port = config.port;

    if config.llm_api_key.is_none() {
        tracing::warn!("LLM_API_KEY not set; remote-chat agents will fall back locally");
    }

    println!("🚀 Starting Dou Dizhu arena on http://{}:{}", host, port);

    let data = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
