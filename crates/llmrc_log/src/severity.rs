//! Severity levels and their file routing.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseSeverityError;

/// Classification of a log entry's importance.
///
/// Each severity owns exactly one output file, `<TAG>.log`, under the
/// logger's output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Routine operational messages.
    Info,
    /// Unusual conditions that do not stop the program.
    Warn,
    /// Failures that need attention. Echoed to stderr.
    Error,
    /// Verbose tracing of program flow.
    Debug,
    /// Unrecoverable failures. Logging one terminates the process.
    Fatal,
}

impl Severity {
    /// All severities, in the order their files are usually listed.
    pub const ALL: [Self; 5] = [
        Self::Info,
        Self::Warn,
        Self::Error,
        Self::Debug,
        Self::Fatal,
    ];

    /// Returns the upper-case tag used in rendered lines and file names.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::Debug => "DEBUG",
            Self::Fatal => "FATAL",
        }
    }

    /// Returns the file name this severity is persisted to.
    #[must_use]
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Info => "INFO.log",
            Self::Warn => "WARN.log",
            Self::Error => "ERROR.log",
            Self::Debug => "DEBUG.log",
            Self::Fatal => "FATAL.log",
        }
    }

    /// Whether entries of this severity must be on disk before `log` returns.
    ///
    /// Durable severities bypass the queue and are echoed to stderr.
    #[must_use]
    pub const fn is_durable(&self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            "debug" => Ok(Self::Debug),
            "fatal" => Ok(Self::Fatal),
            _ => Err(ParseSeverityError(s.to_string())),
        }
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::ERROR => Self::Error,
            tracing::Level::WARN => Self::Warn,
            tracing::Level::INFO => Self::Info,
            tracing::Level::DEBUG | tracing::Level::TRACE => Self::Debug,
        }
    }
}
