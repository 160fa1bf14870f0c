#![cfg(test)]

//! Test logging setup shared by every unit test in the crate.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a test-writer subscriber once.
///
/// Level comes from `TEST_LOG`, then `RUST_LOG`, then `"warn"`. Safe to call
/// from several tests; a subscriber installed elsewhere wins silently.
///
/// ```bash
/// TEST_LOG=arena_backend::services=debug cargo test -p arena-backend session
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
