//! Logging setup for binaries and demos.
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! application's call. These helpers install a `tracing-subscriber` formatter
//! filtered by `RUST_LOG`, falling back to [`DEFAULT_FILTER`].

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info,hubchat_adapters=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a human-readable subscriber.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_tracing() -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Install a subscriber writing one JSON object per event.
///
/// Returns `false` if a global subscriber was already set.
pub fn init_json_tracing() -> bool {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(true)
        .try_init()
        .is_ok()
}
