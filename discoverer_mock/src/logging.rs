// vim: tw=80
use tracing_subscriber::{fmt, EnvFilter};

/// Send this crate's log events to the test output.
///
/// The filter comes from `RUST_LOG`, and defaults to warnings from the mock.
/// Safe to call from every test; only the first call installs a subscriber.
pub fn init_test_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("discoverer_mock=warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .without_time()
        .with_target(false)
        .try_init();
}
