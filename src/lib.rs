// src/lib.rs

pub mod cli;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod logging;
pub mod process;
pub mod protocol;
pub mod registry;
pub mod types;

use tokio::io::BufReader;
use tracing::{debug, warn};

use crate::cli::CliArgs;
use crate::config::{SupervisorSettings, load_and_validate};
use crate::dispatch::{Dispatcher, Runtime};
use crate::errors::Result;
use crate::process::ProcessLauncher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - settings (config file + CLI overrides)
/// - the dispatcher with the real process launcher
/// - stdin/stdout as the protocol stream
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let settings = resolve_settings(&args)?;
    debug!(?settings, "resolved supervisor settings");

    let dispatcher = Dispatcher::new(ProcessLauncher::new(), settings);
    let runtime = Runtime::new(dispatcher);

    // Ctrl-C → leave the loop and tear children down.
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    let input = BufReader::new(tokio::io::stdin());
    let output = tokio::io::stdout();

    runtime.run(input, output, shutdown).await
}

/// Settings from `--config` (or defaults), with CLI flags applied on top.
pub fn resolve_settings(args: &CliArgs) -> Result<SupervisorSettings> {
    let mut settings = match &args.config {
        Some(path) => load_and_validate(path)?,
        None => SupervisorSettings::default(),
    };

    if let Some(grace_period) = args.grace_period {
        settings = settings.with_grace_period(grace_period);
    }

    Ok(settings)
}
