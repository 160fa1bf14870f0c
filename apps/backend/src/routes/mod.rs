use actix_web::web;

pub mod health;
pub mod human;
pub mod sessions;

/// Register every route.
///
/// `main.rs` adds the middleware stack around these; tests register the
/// same paths bare so endpoint behavior can be exercised directly.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check: /health
    cfg.configure(health::configure_routes);

    // Session streams: /api/sessions/**
    cfg.service(web::scope("/api/sessions").configure(sessions::configure_routes));

    // Human decisions: /api/human/**
    cfg.service(web::scope("/api/human").configure(human::configure_routes));
}
