// src/logging.rs

//! Logging setup for `devloop` using `tracing` + `tracing-subscriber`.
//!
//! The filter is chosen as follows:
//! 1. `--log-level` applies that level to every target.
//! 2. Otherwise `DEVLOOP_LOG` is read as an `EnvFilter` directive list,
//!    e.g. `debug` or `devloop::engine=trace,notify=warn`.
//! 3. Otherwise [`DEFAULT_FILTER`].
//!
//! Logs go to STDERR; stdout only carries the sync/rebuild report.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "DEVLOOP_LOG";

/// `notify` is chatty at debug level; keep it quiet unless asked for.
pub const DEFAULT_FILTER: &str = "info,notify=warn";

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV_VAR).ok();
    let filter = build_filter(cli_level, env.as_deref());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!(e))
}

fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(level_directive(lvl));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives).unwrap_or_else(|err| {
            eprintln!("ignoring invalid {LOG_ENV_VAR}={directives:?}: {err}");
            EnvFilter::new(DEFAULT_FILTER)
        }),
        None => EnvFilter::new(DEFAULT_FILTER),
    }
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn same(a: EnvFilter, b: &str) -> bool {
        a.to_string() == EnvFilter::new(b).to_string()
    }

    #[test]
    fn cli_level_wins_over_env() {
        assert!(same(build_filter(Some(LogLevel::Trace), Some("error")), "trace"));
    }

    #[test]
    fn env_directives_are_used() {
        assert!(same(build_filter(None, Some(" devloop=debug ")), "devloop=debug"));
    }

    #[test]
    fn blank_or_invalid_env_falls_back_to_default() {
        assert!(same(build_filter(None, Some("  ")), DEFAULT_FILTER));
        assert!(same(build_filter(None, None), DEFAULT_FILTER));
        assert!(same(build_filter(None, Some("devloop=loudest")), DEFAULT_FILTER));
    }
}
