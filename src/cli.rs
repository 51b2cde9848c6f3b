// src/cli.rs

//! CLI argument parsing using `clap`.

use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::parse_duration;

/// Command-line arguments for `engine-supervisor`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "engine-supervisor",
    version,
    about = "Launch and control engine processes over a JSON line protocol on stdin/stdout.",
    long_about = None
)]
pub struct CliArgs {
    /// Optional config file (TOML) with a `[supervisor]` section.
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// How long `shutdown` waits for a voluntary exit before killing the
    /// child (e.g. `500ms`, `2s`). Overrides the config file.
    #[arg(long, value_name = "DURATION", value_parser = parse_duration)]
    pub grace_period: Option<Duration>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ENGINE_SUPERVISOR_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grace_period_flag_is_parsed_as_duration() {
        let args = CliArgs::try_parse_from(["engine-supervisor", "--grace-period", "250ms"]).unwrap();
        assert_eq!(args.grace_period, Some(Duration::from_millis(250)));
        assert!(args.config.is_none());
    }

    #[test]
    fn bad_grace_period_is_rejected() {
        assert!(CliArgs::try_parse_from(["engine-supervisor", "--grace-period", "soon"]).is_err());
    }
}
