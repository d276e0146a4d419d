//! Command implementations.

use std::thread;
use std::time::Instant;

use llmrc_log::{Logger, Severity};
use thiserror::Error;

use crate::cli::Command;
use crate::mock;

/// Entries written per logging-throughput benchmark.
const LOG_BENCH_ENTRIES: usize = 10_000;

/// Iterations of the compute benchmark.
const COMPUTE_BENCH_ITERATIONS: u64 = 50_000_000;

/// Errors returned by commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// `bench` was given an empty mode.
    #[error("--bench requires a mode argument")]
    MissingBenchMode,

    /// `bench` was given a mode it does not know.
    #[error("unknown bench mode {0:?} (expected 'c' or 'l')")]
    UnknownBenchMode(char),

    /// `stress` was asked for zero threads.
    #[error("stress needs at least one thread")]
    NoThreads,
}

/// Runs `command` against `logger`.
///
/// # Errors
///
/// Returns a [`CommandError`] for invalid command arguments.
pub fn dispatch(command: &Command, logger: &Logger) -> Result<(), CommandError> {
    match command {
        Command::Run => {
            run(logger);
            Ok(())
        }
        Command::Bench { mode } => bench(logger, mode),
        Command::Llm { prompt } => {
            llm(logger, prompt);
            Ok(())
        }
        Command::Emit { level, message } => {
            emit(logger, *level, message);
            Ok(())
        }
        Command::Stress { threads, messages } => {
            let written = stress(logger, *threads, *messages)?;
            println!("stress: {written} entries from {threads} threads");
            Ok(())
        }
        Command::Platform => {
            println!("{}", platform_line());
            Ok(())
        }
    }
}

/// One start-to-finish session.
pub fn run(logger: &Logger) {
    llmrc_log::info!(logger: logger, "session started ({})", platform_line());
    let model = mock::load_model("models/default.gguf");
    llmrc_log::debug!(logger: logger, "model {} ready, context {}", model.name, model.context_len);
    llmrc_log::info!(logger: logger, "session finished");
}

/// Mock benchmarks. Only the first character of `mode` is significant.
///
/// # Errors
///
/// Fails for an empty or unknown mode.
pub fn bench(logger: &Logger, mode: &str) -> Result<(), CommandError> {
    let Some(mode) = mode.chars().next() else {
        llmrc_log::error!(logger: logger, "{}", CommandError::MissingBenchMode);
        return Err(CommandError::MissingBenchMode);
    };

    match mode {
        'c' => {
            let (checksum, elapsed) = mock::compute_workload(COMPUTE_BENCH_ITERATIONS);
            llmrc_log::info!(
                logger: logger,
                "compute bench: {COMPUTE_BENCH_ITERATIONS} iterations in {elapsed:?} \
                 (checksum {checksum:x})"
            );
        }
        'l' => {
            let start = Instant::now();
            for i in 0..LOG_BENCH_ENTRIES {
                llmrc_log::debug!(logger: logger, "bench entry {i}");
            }
            let elapsed = start.elapsed();
            llmrc_log::info!(
                logger: logger,
                "log bench: {LOG_BENCH_ENTRIES} entries in {elapsed:?} ({:?})",
                logger.delivery()
            );
        }
        other => {
            let err = CommandError::UnknownBenchMode(other);
            llmrc_log::error!(logger: logger, "{err}");
            return Err(err);
        }
    }
    Ok(())
}

/// Drives the mock model once.
pub fn llm(logger: &Logger, prompt: &str) {
    llmrc_log::info!(logger: logger, "llm: loading model");
    let model = mock::load_model("models/default.gguf");
    let completion = mock::generate(&model, prompt);
    println!("{completion}");
    llmrc_log::info!(logger: logger, "llm: completion of {} bytes", completion.len());
}

/// Logs a single message. A FATAL message exits the process with status 1.
pub fn emit(logger: &Logger, level: Severity, message: &str) {
    llmrc_log::log!(logger: logger, level, "{message}");
}

/// Logs `messages` INFO entries from each of `threads` threads.
///
/// Returns the total number of entries logged.
///
/// # Errors
///
/// Fails when `threads` is zero.
pub fn stress(logger: &Logger, threads: usize, messages: usize) -> Result<usize, CommandError> {
    if threads == 0 {
        return Err(CommandError::NoThreads);
    }

    thread::scope(|scope| {
        for thread_id in 0..threads {
            scope.spawn(move || {
                for seq in 0..messages {
                    llmrc_log::info!(logger: logger, "stress thread={thread_id} seq={seq}");
                }
            });
        }
    });

    llmrc_log::debug!(logger: logger, "stress done, {} still queued", logger.pending());
    Ok(threads * messages)
}

/// The host platform line printed at start-up.
#[must_use]
pub fn platform_line() -> &'static str {
    if cfg!(target_os = "macos") {
        "Running on macOS"
    } else if cfg!(target_os = "linux") {
        "Running on Linux"
    } else {
        "Running on an unknown OS"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use llmrc_log::Options;
    use std::fs;
    use tempfile::TempDir;

    fn logger_in(tmp: &TempDir) -> Logger {
        Logger::start(
            Options::default()
                .with_output_dir(tmp.path())
                .echo_console(false)
                .verbose(false),
        )
    }

    #[test]
    fn bench_rejects_unknown_mode() {
        let tmp = TempDir::new().unwrap();
        let logger = logger_in(&tmp);

        assert_eq!(bench(&logger, "z"), Err(CommandError::UnknownBenchMode('z')));
        assert_eq!(bench(&logger, ""), Err(CommandError::MissingBenchMode));
        logger.stop();

        let errors = fs::read_to_string(tmp.path().join("ERROR.log")).unwrap();
        assert_eq!(errors.lines().count(), 2);
    }

    #[test]
    fn log_bench_writes_debug_entries() {
        let tmp = TempDir::new().unwrap();
        let logger = logger_in(&tmp);

        bench(&logger, "log").unwrap();
        logger.stop();

        let debug = fs::read_to_string(tmp.path().join("DEBUG.log")).unwrap();
        assert_eq!(debug.lines().count(), LOG_BENCH_ENTRIES);
    }

    #[test]
    fn stress_counts_entries() {
        let tmp = TempDir::new().unwrap();
        let logger = logger_in(&tmp);

        assert_eq!(stress(&logger, 3, 10), Ok(30));
        assert_eq!(stress(&logger, 0, 10), Err(CommandError::NoThreads));
        logger.stop();

        let info = fs::read_to_string(tmp.path().join("INFO.log")).unwrap();
        assert_eq!(info.lines().count(), 30);
    }

    #[test]
    fn emit_routes_by_level() {
        let tmp = TempDir::new().unwrap();
        let logger = logger_in(&tmp);

        emit(&logger, Severity::Warn, "heads up");
        logger.stop();

        let warn = fs::read_to_string(tmp.path().join("WARN.log")).unwrap();
        assert!(warn.ends_with("- heads up\n"));
    }

    #[test]
    fn platform_line_names_the_os() {
        assert!(platform_line().starts_with("Running on "));
    }
}
