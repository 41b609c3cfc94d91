// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::engine::QUIET_PERIOD;

/// Command-line arguments for `devloop`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "devloop",
    version,
    about = "Watch service sources and sync or rebuild on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project file (TOML). Default: `devloop.toml` in the
    /// current directory.
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Only watch these services (repeatable). Default: every service with
    /// watch rules.
    #[arg(long = "service", value_name = "NAME")]
    pub services: Vec<String>,

    /// How long the project must be quiet before a rebuild batch is released.
    #[arg(long, value_name = "MS", default_value_t = QUIET_PERIOD.as_millis() as u64)]
    pub quiet_period_ms: u64,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DEVLOOP_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and validate watch rules, print them, but don't watch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
