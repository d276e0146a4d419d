//! Command-line interface for `llmrc`.
//!
//! # Examples
//!
//! ```bash
//! # Default run cycle, logs under ./output
//! llmrc
//!
//! # Log one message at a chosen severity
//! llmrc --log-dir /tmp/logs emit --level warn "disk almost full"
//!
//! # Hammer the background queue from 8 threads
//! llmrc --batched stress --threads 8 --messages 1000
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use llmrc_log::{DEFAULT_OUTPUT_DIR, Delivery, Options, Severity};

/// LLM runner front end with per-severity file logging.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "llmrc",
    author,
    version,
    about = "LLM runner front end with per-severity file logging"
)]
pub struct Cli {
    /// Directory holding INFO.log, WARN.log, ERROR.log, DEBUG.log and FATAL.log
    #[arg(long, global = true, default_value = DEFAULT_OUTPUT_DIR, env = "LLMRC_LOG_DIR")]
    pub log_dir: PathBuf,

    /// Queue INFO/WARN/DEBUG entries for the background writer
    ///
    /// ERROR and FATAL entries are always written before the call returns.
    #[arg(long, global = true, env = "LLMRC_LOG_BATCHED")]
    pub batched: bool,

    /// Include the calling function and line in every entry
    ///
    /// Already on in debug builds; this flag cannot turn it off there.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Do not echo log lines to the console
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Command to run (defaults to `run`)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run one start-to-finish session
    Run,

    /// Run a mock benchmark
    Bench {
        /// Benchmark mode: `c` (compute) or `l` (logging throughput)
        mode: String,
    },

    /// Load the mock model and generate a completion
    Llm {
        /// Prompt to complete
        #[arg(long, short = 'p', default_value = "Hello")]
        prompt: String,
    },

    /// Log a single message
    Emit {
        /// Severity: info, warn, error, debug or fatal (fatal exits with 1)
        #[arg(long, short = 'l', default_value = "info")]
        level: Severity,

        /// Message body
        message: String,
    },

    /// Log from several threads at once
    Stress {
        /// Number of producer threads
        #[arg(long, short = 't', default_value = "4")]
        threads: usize,

        /// Messages per thread
        #[arg(long, short = 'm', default_value = "100")]
        messages: usize,
    },

    /// Print the host platform
    Platform,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// The command to run, `run` when none was given.
    #[must_use]
    pub fn effective_command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    /// Logger options derived from the flags.
    #[must_use]
    pub fn log_options(&self) -> Options {
        let delivery = if self.batched {
            Delivery::Batched
        } else {
            Delivery::Synchronous
        };
        let opts = Options::default()
            .with_output_dir(&self.log_dir)
            .with_delivery(delivery)
            .echo_console(!self.quiet);
        if self.verbose { opts.verbose(true) } else { opts }
    }
}
