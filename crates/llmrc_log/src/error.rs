//! Error types for the logging core.
//!
//! None of these ever reach a caller of the logging functions. They are
//! produced by the internal fallible steps and handed to the logger's
//! [`ErrorHandler`] so an application can observe persistence failures.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Failures inside the logging core.
#[derive(Error, Debug)]
pub enum LogError {
    /// The output directory could not be created.
    #[error("Directory create failed: {} - {source}", path.display())]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A log file could not be opened for appending.
    #[error("open failed: {} - {source}", path.display())]
    Open {
        /// File that was being opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Writing or flushing a log file failed.
    #[error("write failed: {} - {source}", path.display())]
    Write {
        /// File that was being written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The consumer thread could not be spawned.
    #[error("consumer thread spawn failed: {0}")]
    Spawn(#[source] io::Error),

    /// The consumer thread panicked before it could be joined.
    #[error("consumer thread panicked")]
    ConsumerPanicked,
}

/// A specialized [`Result`] type for the logging core.
pub type Result<T> = std::result::Result<T, LogError>;

/// Error returned when parsing an invalid severity string.
///
/// Accepted strings (case-insensitive): `info`, `warn`, `warning`, `error`,
/// `debug`, `fatal`.
///
/// # Example
///
/// ```rust
/// use llmrc_log::Severity;
///
/// assert!("warn".parse::<Severity>().is_ok());
/// assert!("verbose".parse::<Severity>().is_err());
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid severity: {0:?}")]
pub struct ParseSeverityError(pub(crate) String);

/// Callback invoked when the logging core hits an I/O failure.
///
/// Logging never fails for its caller; this hook is how an application
/// learns that entries were skipped (disk full, permission denied, ...).
///
/// # Example
///
/// ```rust
/// use llmrc_log::Options;
///
/// let options = Options::default().with_error_handler(|err| {
///     eprintln!("log persistence failed: {err}");
/// });
/// ```
pub type ErrorHandler = Arc<dyn Fn(&LogError) + Send + Sync>;

/// Reports an error through `handler`, or to stderr when none is installed.
pub(crate) fn report(handler: Option<&ErrorHandler>, err: &LogError) {
    match handler {
        Some(handler) => handler(err),
        None => {
            use std::io::Write;
            let _ = writeln!(io::stderr(), "[LOGGER] {err}");
        }
    }
}
