use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer, Registry};

/// Install the server subscriber.
///
/// `RUST_LOG` picks the filter. Output is one JSON object per line unless
/// `LOG_FORMAT=pretty`, which is easier to read while running sessions
/// locally.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,actix_web=info,reqwest=warn"));

    let pretty = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("pretty"));

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if pretty {
        fmt::layer().with_target(true).pretty().boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_ansi(false)
            .json()
            .boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(env_filter)
        .init();
}
