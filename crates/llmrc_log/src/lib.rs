#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # llmrc_log
//!
//! Multi-writer logging that routes every entry to a per-severity file.
//!
//! - Five severities (`INFO`, `WARN`, `ERROR`, `DEBUG`, `FATAL`), each with
//!   its own `<SEVERITY>.log` under one output directory
//! - Any number of producer threads, one background consumer thread
//! - Synchronous writes for entries that must be durable before the call
//!   returns
//! - A scope guard that drains the queue exactly once on shutdown
//! - A `tracing` layer so instrumented code feeds the same files
//!
//! Logging never returns an error and never panics on I/O failure. A
//! `FATAL` entry terminates the process with status 1 after it is written.
//!
//! ## Example
//!
//! ```rust,no_run
//! use llmrc_log::{Delivery, Options};
//!
//! fn main() {
//!     let logger = llmrc_log::global::start_with(
//!         Options::default().with_delivery(Delivery::Batched),
//!     );
//!     let _guard = logger.guard();
//!
//!     llmrc_log::info!("Application started with {} threads", 4);
//!     llmrc_log::warn!("Memory usage is high: {} MB", 900);
//! }
//! ```
//!
//! ## Line layout
//!
//! ```text
//! [INFO] [2025-09-24 14:30:45] (main:12) - Application started with 4 threads
//! [INFO] [2025-09-24 14:30:45] - Application started with 4 threads
//! ```
//!
//! The call site is rendered only in verbose mode, which is on by default in
//! debug builds.

mod bridge;
mod consumer;
mod entry;
mod error;
pub mod global;
mod logger;
mod os_error;
mod paths;
mod queue;
mod severity;
mod time;
mod writer;

pub use bridge::LogLayer;
pub use consumer::{CONSUMER_THREAD_NAME, Consumer};
pub use entry::{CallSite, LogEntry};
#[doc(hidden)]
pub use entry::short_function_name;
pub use error::{ErrorHandler, LogError, ParseSeverityError, Result};
pub use global::{log_debug, log_error, log_fatal, log_info, log_warn};
pub use logger::{Delivery, LogGuard, Logger, Options};
pub use os_error::errno_name;
pub use paths::{DEFAULT_OUTPUT_DIR, PathResolver};
pub use queue::MessageQueue;
pub use severity::Severity;
pub use time::{Clock, DEFAULT_TIME_FORMAT, format_timestamp, system_clock};
pub use writer::SyncWriter;

/// Expands to the name of the enclosing function.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __f() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        $crate::short_function_name(__type_name_of(__f))
    }};
}

/// Expands to a [`CallSite`] for the macro's location.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new($crate::function_name!(), ::std::line!())
    };
}

/// Logs a formatted message at a severity, with the call site attached.
///
/// ```rust,no_run
/// use llmrc_log::{Logger, Options, Severity};
///
/// let logger = Logger::start(Options::default());
/// llmrc_log::log!(logger: logger, Severity::Info, "loaded {} rules", 12);
/// llmrc_log::log!(Severity::Warn, "using the global logger");
/// ```
#[macro_export]
macro_rules! log {
    (logger: $logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log($severity, Some($crate::call_site!()), ::std::format!($($arg)+))
    };
    ($severity:expr, $($arg:tt)+) => {
        $crate::log!(logger: $crate::global::logger(), $severity, $($arg)+)
    };
}

/// Logs a formatted info message.
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Info, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Info, $($arg)+)
    };
}

/// Logs a formatted warning.
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Warn, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Warn, $($arg)+)
    };
}

/// Logs a formatted error.
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Error, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Error, $($arg)+)
    };
}

/// Logs a formatted debug message.
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $($arg:tt)+) => {
        $crate::log!(logger: $logger, $crate::Severity::Debug, $($arg)+)
    };
    ($($arg:tt)+) => {
        $crate::log!($crate::Severity::Debug, $($arg)+)
    };
}

/// Logs a formatted fatal message and exits the process with status 1.
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $($arg:tt)+) => {
        $logger.fatal_at(Some($crate::call_site!()), ::std::format!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::fatal!(logger: $crate::global::logger(), $($arg)+)
    };
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        CallSite, DEFAULT_OUTPUT_DIR, DEFAULT_TIME_FORMAT, Delivery, ErrorHandler, LogEntry,
        LogError, LogGuard, LogLayer, Logger, Options, ParseSeverityError, Severity,
    };
}
