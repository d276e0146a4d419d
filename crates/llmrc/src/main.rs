#![forbid(unsafe_code)]

//! # llmrc
//!
//! ```bash
//! cargo run -p llmrc -- --batched stress --threads 8
//! ```

use llmrc::cli::Cli;
use llmrc::{commands, telemetry};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let logger = llmrc_log::global::start_with(cli.log_options());
    let _guard = logger.guard();
    telemetry::install(logger);

    llmrc_log::info!(logger: logger, "{}", commands::platform_line());
    commands::dispatch(&cli.effective_command(), logger)?;

    Ok(())
}
