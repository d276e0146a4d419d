//! Local timestamps for log entries.

use chrono::{DateTime, Local};

/// Default timestamp layout, e.g. `2025-09-24 14:30:45`.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Clock used to stamp entries. Overridable for tests.
pub type Clock = fn() -> DateTime<Local>;

/// The system clock in the local time zone.
#[must_use]
pub fn system_clock() -> DateTime<Local> {
    Local::now()
}

/// Formats `time` with a strftime-style `format`.
#[must_use]
pub fn format_timestamp(time: &DateTime<Local>, format: &str) -> String {
    time.format(format).to_string()
}
