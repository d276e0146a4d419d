//! Log entries and their single-line rendering.

use std::fmt;

use crate::severity::Severity;

/// Where a log call was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    /// Name of the calling function.
    pub function: &'static str,
    /// Source line of the call.
    pub line: u32,
}

impl CallSite {
    /// Creates a call site.
    #[must_use]
    pub const fn new(function: &'static str, line: u32) -> Self {
        Self { function, line }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.function, self.line)
    }
}

/// An immutable log entry.
///
/// The line written to the console and to disk is rendered once, at
/// construction, and never changes afterwards:
///
/// ```text
/// [SEVERITY] [timestamp] (function:line) - body
/// [SEVERITY] [timestamp] - body
/// ```
///
/// The second layout is used when no call site is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    severity: Severity,
    timestamp: String,
    origin: Option<CallSite>,
    body: String,
    line: String,
}

impl LogEntry {
    /// Creates an entry and renders its line.
    #[must_use]
    pub fn new(
        severity: Severity,
        timestamp: impl Into<String>,
        origin: Option<CallSite>,
        body: impl Into<String>,
    ) -> Self {
        let timestamp = timestamp.into();
        let body = body.into();
        let line = render(severity, &timestamp, origin.as_ref(), &body);
        Self {
            severity,
            timestamp,
            origin,
            body,
            line,
        }
    }

    /// Severity of the entry.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Timestamp as rendered.
    #[must_use]
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Call site, when the entry was created in verbose mode.
    #[must_use]
    pub const fn origin(&self) -> Option<&CallSite> {
        self.origin.as_ref()
    }

    /// Message body, including any OS error suffix.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// The full rendered line, newline-terminated.
    #[must_use]
    pub fn rendered(&self) -> &str {
        &self.line
    }
}

fn render(severity: Severity, timestamp: &str, origin: Option<&CallSite>, body: &str) -> String {
    match origin {
        Some(site) => format!("[{severity}] [{timestamp}] ({site}) - {body}\n"),
        None => format!("[{severity}] [{timestamp}] - {body}\n"),
    }
}

/// Reduces a `type_name` path of a function item to the function's own name.
///
/// Used by [`function_name!`](crate::function_name); not meant to be called
/// directly.
#[doc(hidden)]
#[must_use]
pub fn short_function_name(path: &'static str) -> &'static str {
    let path = path.strip_suffix("::__f").unwrap_or(path);
    let mut path = path;
    while let Some(stripped) = path.strip_suffix("::{{closure}}") {
        path = stripped;
    }
    match path.rfind("::") {
        Some(pos) => &path[pos + 2..],
        None => path,
    }
}
