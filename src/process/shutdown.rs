// src/process/shutdown.rs

//! Stopping children.
//!
//! Both paths end in the same place: the child is reaped (voluntarily within
//! the grace period, or after SIGKILL) and its channels are closed.
//!
//! - [`shutdown`] is the `shutdown` command: quit token, grace period, kill.
//!   The quit write itself is bounded by the grace period too.
//! - [`terminate`] is supervisor teardown: SIGTERM, grace period, kill.

use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::process::channel::{self, Framing};
use crate::process::{ProcessHandle, SupervisedProcess};
use crate::registry::Registry;
use crate::types::Termination;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown reference '{0}'")]
pub struct InvalidReference(pub String);

/// How a child ended up stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// It had already terminated before we asked.
    AlreadyExited(Termination),
    /// It exited on its own within the grace period.
    Exited(Termination),
    /// It was still running after the grace period and got SIGKILL.
    Killed(Termination),
    /// Killing or reaping failed at the OS level. The channels are closed
    /// anyway and `kill_on_drop` has the last word.
    Unreaped,
}

/// Run the full quit sequence for `reference` and drop it from the registry.
///
/// Always succeeds once the reference is found, whether or not the child
/// cooperates.
pub async fn shutdown<P: SupervisedProcess>(
    registry: &mut Registry<P>,
    reference: &str,
    framing: &Framing,
    grace: Duration,
) -> Result<ShutdownOutcome, InvalidReference> {
    let handle = registry
        .lookup_mut(reference)
        .ok_or_else(|| InvalidReference(reference.to_string()))?;

    // A child that stopped reading its stdin can leave the pipe full.
    match timeout(grace, channel::send_quit(handle, framing)).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(reference = %reference, error = %e, "quit token not delivered"),
        Err(_) => debug!(reference = %reference, "quit token write timed out"),
    }

    let outcome = reap_within(handle, grace).await;

    if let Some(mut handle) = registry.remove(reference) {
        handle.close();
    }

    info!(reference = %reference, ?outcome, "engine process shut down");
    Ok(outcome)
}

/// Stop a handle that is being torn down with the supervisor.
pub async fn terminate<P: SupervisedProcess>(
    mut handle: ProcessHandle<P>,
    grace: Duration,
) -> ShutdownOutcome {
    if handle.termination().is_none() {
        if let Err(e) = handle.process_mut().terminate() {
            debug!(reference = %handle.reference(), error = %e, "SIGTERM not delivered");
        }
    }

    let outcome = reap_within(&mut handle, grace).await;
    handle.close();

    info!(reference = %handle.reference(), ?outcome, "engine process terminated");
    outcome
}

async fn reap_within<P: SupervisedProcess>(
    handle: &mut ProcessHandle<P>,
    grace: Duration,
) -> ShutdownOutcome {
    if let Some(termination) = handle.termination() {
        return ShutdownOutcome::AlreadyExited(termination);
    }

    let waited = timeout(grace, handle.process_mut().wait()).await;
    match waited {
        Ok(Ok(termination)) => {
            handle.record_termination(termination);
            ShutdownOutcome::Exited(termination)
        }
        Ok(Err(e)) => {
            warn!(reference = %handle.reference(), error = %e, "waiting for engine process failed");
            force_kill(handle).await
        }
        Err(_) => {
            info!(
                reference = %handle.reference(),
                grace_ms = grace.as_millis() as u64,
                "grace period elapsed; killing engine process"
            );
            force_kill(handle).await
        }
    }
}

async fn force_kill<P: SupervisedProcess>(handle: &mut ProcessHandle<P>) -> ShutdownOutcome {
    match handle.process_mut().kill().await {
        Ok(termination) => {
            handle.record_termination(termination);
            ShutdownOutcome::Killed(termination)
        }
        Err(e) => {
            warn!(reference = %handle.reference(), error = %e, "failed to kill engine process");
            ShutdownOutcome::Unreaped
        }
    }
}
