//! Routes `tracing` events into a [`Logger`].
//!
//! ```rust,no_run
//! use llmrc_log::{LogLayer, Logger, Options};
//! use tracing_subscriber::prelude::*;
//!
//! let logger = Logger::start(Options::default());
//! tracing_subscriber::registry()
//!     .with(LogLayer::new(logger.clone()))
//!     .init();
//!
//! tracing::warn!(retries = 3, "backend slow");
//! // WARN.log: [WARN] [...] - backend slow retries=3
//! ```

use std::fmt::{self, Write};

use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

use crate::entry::CallSite;
use crate::logger::Logger;
use crate::severity::Severity;

/// A `tracing_subscriber` layer writing every event through a [`Logger`].
///
/// TRACE and DEBUG events land in `DEBUG.log`. The event's module path and
/// line become the call site.
#[derive(Debug, Clone)]
pub struct LogLayer {
    logger: Logger,
}

impl LogLayer {
    /// Creates a layer over `logger`.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self { logger }
    }
}

impl<S> Layer<S> for LogLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let severity = Severity::from(metadata.level());
        let origin = CallSite::new(
            metadata.module_path().unwrap_or_else(|| metadata.target()),
            metadata.line().unwrap_or(0),
        );

        let mut visitor = BodyVisitor::default();
        event.record(&mut visitor);

        self.logger.log(severity, Some(origin), visitor.finish());
    }
}

/// Collects the `message` field first and other fields as `key=value`.
#[derive(Default)]
struct BodyVisitor {
    message: String,
    fields: String,
}

impl BodyVisitor {
    fn finish(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }

    fn push_field(&mut self, name: &str, value: fmt::Arguments<'_>) {
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _ = write!(self.fields, "{name}={value}");
    }
}

impl Visit for BodyVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.push_field(field.name(), format_args!("{value}"));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{value:?}");
        } else {
            self.push_field(field.name(), format_args!("{value:?}"));
        }
    }
}
