#![forbid(unsafe_code)]

//! # llmrc
//!
//! Command-line front end of an LLM runner, built on [`llmrc_log`].
//!
//! The model runtime itself is mocked; what is real is the logging: every
//! command writes through one [`llmrc_log::Logger`] into per-severity files
//! under `--log-dir`.
//!
//! ## Public Modules
//!
//! - [`cli`] - Argument parsing
//! - [`commands`] - Command implementations
//! - [`mock`] - Model runtime stand-ins
//! - [`telemetry`] - `tracing` to log file bridge

pub mod cli;
pub mod commands;
pub mod mock;
pub mod telemetry;
