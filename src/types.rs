// src/types.rs

use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

/// Opaque identifier handed to the driver for one supervised child.
pub type Reference = String;

/// How a supervised child terminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Normal exit with the given status code.
    Exited(i32),
    /// Killed by the given signal number.
    Signaled(i32),
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Termination::Exited(code),
            (None, Some(signal)) => Termination::Signaled(signal),
            // Stopped/continued statuses are never reported by a reaping wait.
            (None, None) => Termination::Exited(-1),
        }
    }
}

/// Result of a non-blocking liveness check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Running,
    Terminated(Termination),
}
