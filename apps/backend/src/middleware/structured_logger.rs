use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::{header, StatusCode};
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn, Level};

/// One `request_completed` line per request.
///
/// For NDJSON session streams the line marks when the stream started, not
/// when it ended; `streaming=true` says so.
pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

fn level_for(status: StatusCode) -> Level {
    if status.is_server_error() {
        Level::ERROR
    } else if status.is_client_error() {
        Level::WARN
    } else {
        Level::INFO
    }
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();

        let trace_id = req
            .extensions()
            .get::<String>()
            .cloned()
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, streaming) = match &result {
                Ok(res) => {
                    let ndjson = res
                        .headers()
                        .get(header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .is_some_and(|ct| ct.starts_with("application/x-ndjson"));
                    (res.status(), ndjson)
                }
                Err(err) => (err.as_response_error().status_code(), false),
            };

            let duration_ms = start.elapsed().as_millis() as u64;
            let status_code = status.as_u16();

            match level_for(status) {
                Level::ERROR => {
                    error!(http.method=%method, url.path=%path, http.status_code=status_code, duration_ms, streaming, trace_id=%trace_id, "request_completed")
                }
                Level::WARN => {
                    warn!(http.method=%method, url.path=%path, http.status_code=status_code, duration_ms, streaming, trace_id=%trace_id, "request_completed")
                }
                _ => {
                    info!(http.method=%method, url.path=%path, http.status_code=status_code, duration_ms, streaming, trace_id=%trace_id, "request_completed")
                }
            }

            result
        })
    }
}
