//! The severity router and the subsystem's lifecycle.

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use crate::consumer::Consumer;
use crate::entry::{CallSite, LogEntry};
use crate::error::ErrorHandler;
use crate::os_error;
use crate::paths::{DEFAULT_OUTPUT_DIR, PathResolver};
use crate::queue::MessageQueue;
use crate::severity::Severity;
use crate::time::{self, Clock, DEFAULT_TIME_FORMAT};
use crate::writer::SyncWriter;

/// How entries reach disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    /// Every entry is written before `log` returns.
    #[default]
    Synchronous,
    /// INFO, WARN and DEBUG go through the background queue; ERROR and
    /// FATAL are still written before `log` returns.
    Batched,
}

/// Logger options.
#[derive(Clone)]
pub struct Options {
    /// Directory holding the per-severity files.
    pub output_dir: PathBuf,
    /// Persistence policy.
    pub delivery: Delivery,
    /// Include the call site in rendered lines and append OS error details
    /// to ERROR and FATAL bodies.
    pub verbose: bool,
    /// Echo every line to stdout, and ERROR/FATAL lines to stderr as well.
    pub echo_console: bool,
    /// strftime-style timestamp format.
    pub time_format: String,
    /// Clock used for timestamps.
    pub clock: Clock,
    /// Receives persistence failures. Defaults to a stderr report.
    pub error_handler: Option<ErrorHandler>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            delivery: Delivery::default(),
            verbose: cfg!(debug_assertions),
            echo_console: true,
            time_format: DEFAULT_TIME_FORMAT.to_string(),
            clock: time::system_clock,
            error_handler: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("output_dir", &self.output_dir)
            .field("delivery", &self.delivery)
            .field("verbose", &self.verbose)
            .field("echo_console", &self.echo_console)
            .field("time_format", &self.time_format)
            .field("error_handler", &self.error_handler.is_some())
            .finish_non_exhaustive()
    }
}

impl Options {
    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Sets the delivery policy.
    #[must_use]
    pub fn with_delivery(mut self, delivery: Delivery) -> Self {
        self.delivery = delivery;
        self
    }

    /// Enables or disables verbose rendering.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Enables or disables console echo.
    #[must_use]
    pub fn echo_console(mut self, echo: bool) -> Self {
        self.echo_console = echo;
        self
    }

    /// Sets the timestamp format.
    #[must_use]
    pub fn with_time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    /// Replaces the clock.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Installs a handler for persistence failures.
    #[must_use]
    pub fn with_error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&crate::LogError) + Send + Sync + 'static,
    {
        self.error_handler = Some(Arc::new(handler));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shutdown {
    Running,
    Draining,
    Done,
}

struct Inner {
    delivery: Delivery,
    verbose: bool,
    echo_console: bool,
    time_format: String,
    clock: Clock,
    queue: Arc<MessageQueue>,
    writer: Arc<SyncWriter>,
    consumer: Mutex<Option<Consumer>>,
    consumer_thread: Option<ThreadId>,
    shutdown: Mutex<Shutdown>,
    shutdown_done: Condvar,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn shutdown(&self) {
        let on_consumer = self.consumer_thread == Some(thread::current().id());

        let state = lock(&self.shutdown);
        let current = *state;
        match current {
            Shutdown::Running => {
                let mut state = state;
                *state = Shutdown::Draining;
            }
            // The caller doing the drain may be joining this very thread.
            Shutdown::Draining if on_consumer => return,
            Shutdown::Draining => {
                let _done = self
                    .shutdown_done
                    .wait_while(state, |state| *state != Shutdown::Done)
                    .unwrap_or_else(PoisonError::into_inner);
                return;
            }
            Shutdown::Done => return,
        }

        self.queue.stop();

        let consumer = lock(&self.consumer).take();
        if let Some(consumer) = consumer {
            if on_consumer {
                // Reached from an error handler mid-batch. Joining would never
                // return, so write the rest of the batch here instead.
                self.writer.store_batch(consumer.take_in_flight());
            } else if let Err(err) = consumer.join() {
                self.writer.report(&err);
            }
        }

        // The queue rejects entries once stopped, so this is the last residue.
        let residue = self.queue.drain();
        self.writer.store_batch(residue);

        *lock(&self.shutdown) = Shutdown::Done;
        self.shutdown_done.notify_all();
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Handle to a running logging subsystem.
///
/// Cloning is cheap; all clones share one queue, one consumer thread and
/// one file lock. The subsystem shuts down on [`Logger::stop`], when a
/// [`LogGuard`] is dropped, or when the last handle is dropped.
///
/// Logging never fails for the caller. Failures to create the output
/// directory or to write a file are passed to the configured error handler
/// and the entry is skipped.
///
/// # Example
///
/// ```rust,no_run
/// use llmrc_log::{Delivery, Logger, Options};
///
/// let logger = Logger::start(Options::default().with_delivery(Delivery::Batched));
/// let _guard = logger.guard();
/// logger.info("Application started");
/// logger.warn(format!("Memory usage is high: {} MB", 900));
/// ```
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Inner>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("output_dir", &self.output_dir())
            .field("delivery", &self.inner.delivery)
            .field("verbose", &self.inner.verbose)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Logger {
    /// Starts the subsystem: creates the queue and spawns the consumer.
    ///
    /// If the consumer thread cannot be spawned the failure is reported and
    /// every entry is written synchronously instead.
    #[must_use]
    pub fn start(opts: Options) -> Self {
        let writer = Arc::new(SyncWriter::new(
            PathResolver::new(opts.output_dir),
            opts.error_handler,
        ));
        let queue = Arc::new(MessageQueue::new());

        let consumer = match Consumer::spawn(Arc::clone(&queue), Arc::clone(&writer)) {
            Ok(consumer) => Some(consumer),
            Err(err) => {
                writer.report(&err);
                queue.stop();
                None
            }
        };

        Self {
            inner: Arc::new(Inner {
                delivery: opts.delivery,
                verbose: opts.verbose,
                echo_console: opts.echo_console,
                time_format: opts.time_format,
                clock: opts.clock,
                queue,
                writer,
                consumer_thread: consumer.as_ref().map(Consumer::thread_id),
                consumer: Mutex::new(consumer),
                shutdown: Mutex::new(Shutdown::Running),
                shutdown_done: Condvar::new(),
            }),
        }
    }

    /// Logs `body` at `severity`.
    ///
    /// `origin` is rendered only in verbose mode.
    ///
    /// # Process exit
    ///
    /// A [`Severity::Fatal`] entry terminates the process with status 1
    /// once it has been written, whether or not the write succeeded.
    pub fn log(&self, severity: Severity, origin: Option<CallSite>, body: impl Into<String>) {
        self.emit(severity, origin, body.into());
        if severity == Severity::Fatal {
            self.terminate();
        }
    }

    /// Logs an info message.
    pub fn info(&self, body: impl Into<String>) {
        self.log(Severity::Info, None, body);
    }

    /// Logs a warning.
    pub fn warn(&self, body: impl Into<String>) {
        self.log(Severity::Warn, None, body);
    }

    /// Logs an error. Written before returning and echoed to stderr.
    pub fn error(&self, body: impl Into<String>) {
        self.log(Severity::Error, None, body);
    }

    /// Logs a debug message.
    pub fn debug(&self, body: impl Into<String>) {
        self.log(Severity::Debug, None, body);
    }

    /// Logs a fatal message and exits the process with status 1.
    ///
    /// Queued entries are drained before exiting. If another thread is
    /// already shutting the logger down, this waits for it to finish.
    ///
    /// Called from an error handler while the consumer thread is being
    /// joined by another shutdown, it cannot wait for that shutdown and
    /// exits without it: entries still queued at that point may be lost.
    pub fn fatal(&self, body: impl Into<String>) -> ! {
        self.fatal_at(None, body)
    }

    /// Like [`fatal`](Self::fatal), with a call site.
    pub fn fatal_at(&self, origin: Option<CallSite>, body: impl Into<String>) -> ! {
        self.emit(Severity::Fatal, origin, body.into());
        self.terminate()
    }

    /// Shuts the subsystem down: stops the queue, joins the consumer and
    /// writes anything still queued.
    ///
    /// Only the first call does anything. A call made while another thread
    /// is shutting down waits for it to finish, so every entry logged before
    /// `stop` is on disk when it returns. Later calls, and calls on other
    /// clones, return immediately. Entries logged afterwards are written
    /// synchronously.
    ///
    /// The join has no timeout: a consumer stuck in file I/O blocks this
    /// call until the I/O completes.
    pub fn stop(&self) {
        self.inner.shutdown();
    }

    /// Returns a guard that calls [`stop`](Self::stop) when dropped.
    #[must_use = "dropping the guard immediately stops the logger"]
    pub fn guard(&self) -> LogGuard {
        LogGuard {
            logger: Some(self.clone()),
        }
    }

    /// Whether the consumer still accepts queued entries.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.queue.is_running()
    }

    /// Number of entries waiting for the consumer.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    /// The directory holding the per-severity files.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        self.inner.writer.resolver().root()
    }

    /// The delivery policy.
    #[must_use]
    pub fn delivery(&self) -> Delivery {
        self.inner.delivery
    }

    fn emit(&self, severity: Severity, origin: Option<CallSite>, body: String) {
        // Read before anything else can overwrite it.
        let os_error = if self.inner.verbose && severity.is_durable() {
            os_error::errno_suffix(os_error::last_os_error_code())
        } else {
            None
        };

        let entry = self.make_entry(severity, origin, body, os_error);
        self.echo(&entry);

        if self.inner.delivery == Delivery::Batched && !severity.is_durable() {
            if let Err(entry) = self.inner.queue.enqueue(entry) {
                self.inner.writer.store(&entry);
            }
        } else {
            self.inner.writer.store(&entry);
        }
    }

    fn make_entry(
        &self,
        severity: Severity,
        origin: Option<CallSite>,
        mut body: String,
        os_error: Option<String>,
    ) -> LogEntry {
        if let Some(suffix) = os_error {
            body.push_str(&suffix);
        }
        let timestamp = time::format_timestamp(&(self.inner.clock)(), &self.inner.time_format);
        let origin = if self.inner.verbose { origin } else { None };
        LogEntry::new(severity, timestamp, origin, body)
    }

    fn echo(&self, entry: &LogEntry) {
        if !self.inner.echo_console {
            return;
        }
        let line = entry.rendered().as_bytes();
        let _ = io::stdout().lock().write_all(line);
        if entry.severity().is_durable() {
            let _ = io::stderr().lock().write_all(line);
        }
    }

    fn terminate(&self) -> ! {
        self.stop();
        let _ = io::stdout().flush();
        std::process::exit(1)
    }
}

/// Scope guard that stops a [`Logger`] exactly once.
///
/// Hold one for the duration of `main` so queued entries are written
/// before the process exits:
///
/// ```rust,no_run
/// use llmrc_log::{Logger, Options};
///
/// fn main() {
///     let logger = Logger::start(Options::default());
///     let _guard = logger.guard();
///     logger.info("working");
/// } // queued entries are flushed here
/// ```
#[derive(Debug)]
pub struct LogGuard {
    logger: Option<Logger>,
}

impl LogGuard {
    /// Stops the logger now instead of at scope exit.
    pub fn release(mut self) {
        self.release_inner();
    }

    /// The guarded logger.
    #[must_use]
    pub fn logger(&self) -> Option<&Logger> {
        self.logger.as_ref()
    }

    fn release_inner(&mut self) {
        if let Some(logger) = self.logger.take() {
            logger.stop();
        }
    }
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Local, TimeZone};
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{OnceLock, mpsc};
    use std::time::Duration;
    use tempfile::TempDir;

    fn fixed_clock() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 9, 24, 14, 30, 45).unwrap()
    }

    fn quiet(dir: &Path) -> Options {
        Options::default()
            .with_output_dir(dir)
            .echo_console(false)
            .verbose(false)
            .with_clock(fixed_clock)
    }

    fn read(dir: &Path, severity: Severity) -> String {
        fs::read_to_string(dir.join(severity.file_name())).unwrap_or_default()
    }

    #[test]
    fn test_options_default() {
        let opts = Options::default();
        assert_eq!(opts.output_dir, PathBuf::from("./output"));
        assert_eq!(opts.delivery, Delivery::Synchronous);
        assert_eq!(opts.time_format, DEFAULT_TIME_FORMAT);
        assert!(opts.echo_console);
        assert!(opts.error_handler.is_none());
    }

    #[test]
    fn test_synchronous_write_is_visible_on_return() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()));

        logger.info("hello");

        assert_eq!(
            read(tmp.path(), Severity::Info),
            "[INFO] [2025-09-24 14:30:45] - hello\n"
        );
        logger.stop();
    }

    #[test]
    fn test_verbose_renders_call_site() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()).verbose(true));

        logger.log(Severity::Warn, Some(CallSite::new("load", 7)), "slow");

        assert_eq!(
            read(tmp.path(), Severity::Warn),
            "[WARN] [2025-09-24 14:30:45] (load:7) - slow\n"
        );
        logger.stop();
    }

    #[test]
    fn test_call_site_dropped_when_not_verbose() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()));

        logger.log(Severity::Debug, Some(CallSite::new("load", 7)), "quiet");

        assert_eq!(
            read(tmp.path(), Severity::Debug),
            "[DEBUG] [2025-09-24 14:30:45] - quiet\n"
        );
        logger.stop();
    }

    #[test]
    fn test_batched_error_bypasses_queue() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()).with_delivery(Delivery::Batched));

        logger.error("disk on fire");

        // Durable severities are on disk before `error` returns.
        assert!(read(tmp.path(), Severity::Error).contains("disk on fire"));
        logger.stop();
    }

    #[test]
    fn test_log_after_stop_is_written_synchronously() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()).with_delivery(Delivery::Batched));
        logger.stop();
        assert!(!logger.is_running());

        logger.info("after stop");

        assert!(read(tmp.path(), Severity::Info).contains("after stop"));
        assert_eq!(logger.pending(), 0);
    }

    #[test]
    fn test_guard_release_stops_once() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()).with_delivery(Delivery::Batched));
        let guard = logger.guard();
        assert!(guard.logger().is_some());

        logger.info("queued");
        guard.release();

        assert!(!logger.is_running());
        assert_eq!(read(tmp.path(), Severity::Info).lines().count(), 1);
    }

    #[test]
    fn test_dropping_last_handle_flushes() {
        let tmp = TempDir::new().unwrap();
        {
            let logger = Logger::start(quiet(tmp.path()).with_delivery(Delivery::Batched));
            let clone = logger.clone();
            clone.info("from clone");
            logger.info("from original");
        }
        let info = read(tmp.path(), Severity::Info);
        assert_eq!(info.lines().count(), 2);
    }

    #[test]
    fn test_error_handler_receives_write_failures() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("ERROR.log")).unwrap();

        let failures = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&failures);
        let logger = Logger::start(quiet(tmp.path()).with_error_handler(move |_err| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));

        logger.error("cannot land");
        logger.info("still works");

        assert_eq!(failures.load(Ordering::Relaxed), 1);
        assert!(read(tmp.path(), Severity::Info).contains("still works"));
        logger.stop();
    }

    #[test]
    fn test_accessors() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()).with_delivery(Delivery::Batched));
        assert_eq!(logger.output_dir(), tmp.path());
        assert_eq!(logger.delivery(), Delivery::Batched);
        assert!(logger.is_running());
        logger.stop();
    }

    #[cfg(unix)]
    #[test]
    fn test_verbose_error_carries_errno() {
        let tmp = TempDir::new().unwrap();
        let logger = Logger::start(quiet(tmp.path()).verbose(true));

        let missing = tmp.path().join("missing");
        let err = fs::File::open(&missing).unwrap_err();
        assert_eq!(err.raw_os_error(), Some(libc::ENOENT));

        // Reproduce the errno left behind by the failed call.
        let entry = logger.make_entry(
            Severity::Error,
            None,
            "open failed".to_string(),
            os_error::errno_suffix(libc::ENOENT),
        );
        assert_eq!(
            entry.body(),
            format!("open failed | errno={} (ENOENT)", libc::ENOENT)
        );
        logger.stop();
    }

    #[test]
    fn test_stop_from_error_handler_on_consumer_thread() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("WARN.log")).unwrap();

        let slot: Arc<OnceLock<Logger>> = Arc::new(OnceLock::new());
        let handler_slot = Arc::clone(&slot);
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let go_rx = Mutex::new(go_rx);
        let (seen_tx, seen_rx) = mpsc::channel::<(bool, usize)>();
        let seen_tx = Mutex::new(seen_tx);
        let dir = tmp.path().to_path_buf();

        let logger = Logger::start(
            quiet(tmp.path())
                .with_delivery(Delivery::Batched)
                .with_error_handler(move |err| {
                    if !matches!(err, crate::LogError::Open { .. }) {
                        return;
                    }
                    let _ = lock(&go_rx).recv();
                    if let Some(logger) = handler_slot.get() {
                        logger.stop();
                    }
                    let on_consumer =
                        thread::current().name() == Some(crate::CONSUMER_THREAD_NAME);
                    let written = fs::read_to_string(dir.join("INFO.log"))
                        .unwrap_or_default()
                        .lines()
                        .count();
                    let _ = lock(&seen_tx).send((on_consumer, written));
                }),
        );
        let _ = slot.set(logger.clone());

        logger.info("before");
        logger.warn("unwritable");
        logger.info("after 1");
        logger.info("after 2");
        go_tx.send(()).unwrap();

        // The handler's stop returned, and had already written the rest.
        let (on_consumer, written) = seen_rx.recv_timeout(Duration::from_secs(10)).unwrap();
        assert!(on_consumer);
        assert_eq!(written, 3);

        logger.stop();
        assert!(!logger.is_running());
    }

    #[test]
    fn test_consumer_panic_is_reported_not_propagated() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("WARN.log")).unwrap();

        let panics = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&panics);
        let logger = Logger::start(
            quiet(tmp.path())
                .with_delivery(Delivery::Batched)
                .with_error_handler(move |err| match err {
                    crate::LogError::ConsumerPanicked => {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    other => panic!("cannot recover from {other}"),
                }),
        );

        logger.warn("unwritable");
        logger.stop();

        assert_eq!(panics.load(Ordering::Relaxed), 1);
        assert!(!logger.is_running());

        logger.info("after the panic");
        assert!(read(tmp.path(), Severity::Info).contains("after the panic"));
    }
}
