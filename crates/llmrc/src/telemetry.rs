//! Feeds `tracing` events from the mock runtime into the log files.

use llmrc_log::{LogLayer, Logger};
use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Filter used when `RUST_LOG` is unset or invalid.
pub const DEFAULT_FILTER: &str = "info";

/// A subscriber routing events accepted by `filter` through `logger`.
pub fn subscriber(logger: &Logger, filter: EnvFilter) -> impl Subscriber + Send + Sync {
    tracing_subscriber::registry().with(LogLayer::new(logger.clone()).with_filter(filter))
}

/// The filter from `RUST_LOG`, or [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs [`subscriber`] globally.
///
/// Returns `false` if a global subscriber was already installed.
pub fn install(logger: &Logger) -> bool {
    tracing::subscriber::set_global_default(subscriber(logger, env_filter())).is_ok()
}
