//! Process-wide logger.
//!
//! The free functions and the logging macros without an explicit `logger:`
//! argument go through a single [`Logger`] installed here. The first call to
//! [`start`], [`start_with`] or [`logger`] installs it; later calls reuse it.
//! It is never dropped, so hold [`guard`] across `main` (or call [`stop`])
//! to flush queued entries before exit.

use std::sync::OnceLock;

use crate::logger::{LogGuard, Logger, Options};

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Starts the global logger with default options. Idempotent.
pub fn start() -> &'static Logger {
    GLOBAL.get_or_init(|| Logger::start(Options::default()))
}

/// Starts the global logger with `options`.
///
/// If it is already running, `options` are ignored and the existing logger
/// is returned.
pub fn start_with(options: Options) -> &'static Logger {
    GLOBAL.get_or_init(|| Logger::start(options))
}

/// The global logger, started with default options on first use.
pub fn logger() -> &'static Logger {
    start()
}

/// The global logger, if it has been started.
pub fn try_logger() -> Option<&'static Logger> {
    GLOBAL.get()
}

/// Stops the global logger. Does nothing if it was never started.
pub fn stop() {
    if let Some(logger) = GLOBAL.get() {
        logger.stop();
    }
}

/// Returns a guard that stops the global logger when dropped.
#[must_use = "dropping the guard immediately stops the logger"]
pub fn guard() -> LogGuard {
    logger().guard()
}

/// Logs an info message on the global logger.
pub fn log_info(msg: impl Into<String>) {
    logger().info(msg);
}

/// Logs a warning on the global logger.
pub fn log_warn(msg: impl Into<String>) {
    logger().warn(msg);
}

/// Logs an error on the global logger.
pub fn log_error(msg: impl Into<String>) {
    logger().error(msg);
}

/// Logs a debug message on the global logger.
pub fn log_debug(msg: impl Into<String>) {
    logger().debug(msg);
}

/// Logs a fatal message on the global logger and exits with status 1.
pub fn log_fatal(msg: impl Into<String>) -> ! {
    logger().fatal(msg)
}
