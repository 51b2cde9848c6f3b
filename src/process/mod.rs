// src/process/mod.rs

//! Child process layer.
//!
//! Everything that touches an OS process or its pipes lives here; the
//! dispatcher only sees the [`SupervisedProcess`] trait and the
//! [`ProcessHandle`] wrapping it.
//!
//! - [`launcher`] allocates the three pipes and spawns the engine.
//! - [`handle`] is the supervisor-owned bundle for one child.
//! - [`monitor`] answers "has it exited yet?" without blocking.
//! - [`channel`] frames messages and writes them to the child's stdin.
//! - [`output`] drains the child's stdout/stderr into the log.
//! - [`shutdown`] runs quit → grace period → kill → reap.

use std::future::Future;
use std::io;
use std::pin::Pin;

use crate::types::Termination;

pub mod channel;
pub mod handle;
pub mod launcher;
pub mod monitor;
pub mod output;
pub mod shutdown;

pub use handle::ProcessHandle;
pub use launcher::{
    EXEC_FAILURE_STATUS, EngineProcess, LaunchError, LaunchRequest, Launcher, ProcessLauncher,
};

/// Boxed future returned by the async parts of [`SupervisedProcess`].
pub type ProcessFuture<'a, T> = Pin<Box<dyn Future<Output = io::Result<T>> + Send + 'a>>;

/// Operations the supervisor needs from one running child.
///
/// [`EngineProcess`] is the production implementation; tests provide fakes
/// that never spawn anything.
pub trait SupervisedProcess: Send {
    /// OS process id, or `None` once the child has been reaped.
    fn id(&self) -> Option<u32>;

    /// Non-blocking check for termination. Reaps the child if it has exited.
    fn try_wait(&mut self) -> io::Result<Option<Termination>>;

    /// Write raw bytes to the child's input channel.
    fn write_input<'a>(&'a mut self, bytes: &'a [u8]) -> ProcessFuture<'a, ()>;

    /// Wait until the child terminates and reap it.
    fn wait(&mut self) -> ProcessFuture<'_, Termination>;

    /// Ask the child to terminate (SIGTERM).
    fn terminate(&mut self) -> io::Result<()>;

    /// Forcibly kill the child (SIGKILL) and reap it.
    fn kill(&mut self) -> ProcessFuture<'_, Termination>;

    /// Close the parent-side ends of all three channels.
    fn close_channels(&mut self);
}
