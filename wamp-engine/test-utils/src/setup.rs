use std::{
    str::FromStr,
    sync::Once,
};

static INIT: Once = Once::new();

/// Environment variable for overriding the maximum log level in tests.
pub const LOG_LEVEL_ENV: &str = "WAMP_ENGINE_TEST_LOG";

fn max_level() -> tracing_core::Level {
    std::env::var(LOG_LEVEL_ENV)
        .ok()
        .and_then(|level| tracing_core::Level::from_str(&level).ok())
        .unwrap_or(tracing_core::Level::DEBUG)
}

/// Installs a global log subscriber for the test binary.
///
/// Log records emitted through the `log` facade are forwarded to the subscriber.
pub fn setup_test_environment() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(max_level())
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_test_writer()
            .try_init()
            .ok();
    });
}
