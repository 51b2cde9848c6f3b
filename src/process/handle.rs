// src/process/handle.rs

use std::fmt;

use crate::process::SupervisedProcess;
use crate::types::{Reference, Termination};

/// The supervisor-owned bundle for one child: its reference, process id,
/// channels, and the first termination status observed for it.
///
/// The pid is recorded once at launch and never changes, even after the
/// child is reaped and the OS may recycle it.
pub struct ProcessHandle<P> {
    reference: Reference,
    pid: Option<u32>,
    sequence: u64,
    process: P,
    termination: Option<Termination>,
    closed: bool,
}

impl<P: SupervisedProcess> ProcessHandle<P> {
    pub fn new(reference: Reference, sequence: u64, process: P) -> Self {
        let pid = process.id();
        Self {
            reference,
            pid,
            sequence,
            process,
            termination: None,
            closed: false,
        }
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Creation order within the registry.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Termination recorded by an earlier poll or shutdown, if any.
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    pub fn record_termination(&mut self, termination: Termination) {
        // The first observation wins; the OS status is consumed by then.
        self.termination.get_or_insert(termination);
    }

    pub fn process_mut(&mut self) -> &mut P {
        &mut self.process
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Close all three channels. Later calls are no-ops.
    pub fn close(&mut self) {
        if !self.closed {
            self.process.close_channels();
            self.closed = true;
        }
    }
}

impl<P> fmt::Debug for ProcessHandle<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessHandle")
            .field("reference", &self.reference)
            .field("pid", &self.pid)
            .field("sequence", &self.sequence)
            .field("termination", &self.termination)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}
