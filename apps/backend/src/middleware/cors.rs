// apps/backend/src/middleware/cors.rs
use std::env;

use actix_cors::Cors;
use actix_web::http::header;

/// Parse `CORS_ALLOWED_ORIGINS`: comma-separated, http(s) only, empty and "null" entries ignored.
/// Falls back to the local viewer origins when nothing valid is configured.
pub fn allowed_origins(raw: &str) -> Vec<String> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .map(|s| s.to_string())
        .collect();

    if origins.is_empty() {
        vec![
            "http://localhost:3000".to_string(),
            "http://127.0.0.1:3000".to_string(),
        ]
    } else {
        origins
    }
}

/// Build CORS middleware for the viewer:
/// - Origins come from CORS_ALLOWED_ORIGINS
/// - Only the methods the API serves
pub fn cors_middleware() -> Cors {
    let raw = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::HeaderName::from_static("x-trace-id")])
        .max_age(3600);

    for origin in allowed_origins(&raw) {
        cors = cors.allowed_origin(&origin);
    }

    cors
}
