//! Logging helper
//!
//! Used by binaries and tests to implement consistent logging

// Imports
use {
	std::env,
	tracing::level_filters::LevelFilter,
	tracing_subscriber::{EnvFilter, prelude::*},
};

/// Initializes logging.
///
/// The filter is read from `RUST_LOG`, defaulting to `info`, and
/// colors may be disabled through `RUST_LOG_COLOR`.
///
/// Calling this more than once is allowed, only the first call
/// installs the subscriber.
pub fn init() {
	// Check if we should use colors
	let log_use_color = env::var("RUST_LOG_COLOR").map_or(true, |value| self::parse_bool(&value));

	let filter = EnvFilter::builder()
		.with_default_directive(LevelFilter::INFO.into())
		.from_env_lossy();
	let layer = tracing_subscriber::fmt::layer()
		.with_ansi(log_use_color)
		.with_filter(filter);

	// Note: Tests may each call `init`, so we can't use `init` on the registry
	if let Err(err) = tracing_subscriber::registry().with(layer).try_init() {
		tracing::debug!(%err, "Logger was already initialized");
	}
}

/// Parses a boolean environment value
fn parse_bool(value: &str) -> bool {
	matches!(value.trim().to_uppercase().as_str(), "1" | "YES" | "TRUE")
}
