// src/process/monitor.rs

use std::io;

use thiserror::Error;
use tracing::{debug, info};

use crate::process::{ProcessHandle, SupervisedProcess};
use crate::types::{Liveness, Termination};

#[derive(Debug, Error)]
#[error("failed to check process status: {0}")]
pub struct PollError(#[from] pub io::Error);

/// Non-blocking liveness check.
///
/// The first termination observed is cached on the handle, so repeated polls
/// after exit keep reporting the same classification instead of asking the
/// OS about a status it has already handed out.
pub fn poll<P: SupervisedProcess>(handle: &mut ProcessHandle<P>) -> Result<Liveness, PollError> {
    if let Some(termination) = handle.termination() {
        return Ok(Liveness::Terminated(termination));
    }

    match handle.process_mut().try_wait()? {
        None => {
            debug!(reference = %handle.reference(), "engine process still running");
            Ok(Liveness::Running)
        }
        Some(termination) => {
            log_termination(handle.reference(), handle.pid(), termination);
            handle.record_termination(termination);
            Ok(Liveness::Terminated(termination))
        }
    }
}

fn log_termination(reference: &str, pid: Option<u32>, termination: Termination) {
    match termination {
        Termination::Exited(exit_code) => {
            info!(reference = %reference, pid = ?pid, exit_code, "engine process exited");
        }
        Termination::Signaled(signal) => {
            info!(reference = %reference, pid = ?pid, signal, "engine process killed by signal");
        }
    }
}
