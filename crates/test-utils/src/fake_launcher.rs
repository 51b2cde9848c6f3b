use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use engine_supervisor::config::model::DEFAULT_QUIT_TOKEN;
use engine_supervisor::process::{
    LaunchError, LaunchRequest, Launcher, ProcessFuture, SupervisedProcess,
};
use engine_supervisor::types::Termination;

pub const SIGKILL: i32 = 9;
pub const SIGTERM: i32 = 15;

/// Which launch step a [`FakeLauncher`] should fail at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeLaunchFailure {
    Pipe,
    Fork,
}

/// Observable state of one fake child.
#[derive(Debug, Clone)]
pub struct FakeState {
    pub pid: u32,
    pub exit: Option<Termination>,
    pub written: Vec<String>,
    pub terminate_requests: usize,
    pub killed: bool,
    pub channels_closed: usize,
    pub poll_fails: bool,
    exits_on_quit: bool,
    exits_on_sigterm: bool,
    quit_token: String,
}

/// Test-side view of a fake child, shared with the `FakeProcess` the
/// dispatcher owns.
#[derive(Debug, Clone)]
pub struct FakeControl {
    state: Arc<Mutex<FakeState>>,
}

impl FakeControl {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn snapshot(&self) -> FakeState {
        self.lock().clone()
    }

    /// Simulate the child exiting on its own.
    pub fn exit_with(&self, code: i32) {
        self.lock().exit = Some(Termination::Exited(code));
    }

    /// Simulate the child dying from a signal.
    pub fn kill_with_signal(&self, signal: i32) {
        self.lock().exit = Some(Termination::Signaled(signal));
    }

    /// Make every subsequent liveness check fail at the OS level.
    pub fn fail_polls(&self) {
        self.lock().poll_fails = true;
    }

    pub fn written(&self) -> Vec<String> {
        self.lock().written.clone()
    }
}

/// A child that never exists as an OS process.
pub struct FakeProcess {
    control: FakeControl,
}

impl SupervisedProcess for FakeProcess {
    fn id(&self) -> Option<u32> {
        Some(self.control.lock().pid)
    }

    fn try_wait(&mut self) -> io::Result<Option<Termination>> {
        let state = self.control.lock();
        if state.poll_fails {
            return Err(io::Error::other("fake waitpid failure"));
        }
        Ok(state.exit)
    }

    fn write_input<'a>(&'a mut self, bytes: &'a [u8]) -> ProcessFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.control.lock();
            if state.exit.is_some() || state.channels_closed > 0 {
                return Err(io::Error::from(io::ErrorKind::BrokenPipe));
            }

            let line = String::from_utf8_lossy(bytes).trim_end().to_string();
            if line == state.quit_token && state.exits_on_quit {
                state.exit = Some(Termination::Exited(0));
            }
            state.written.push(line);
            Ok(())
        })
    }

    fn wait(&mut self) -> ProcessFuture<'_, Termination> {
        Box::pin(async move {
            loop {
                let exit = self.control.lock().exit;
                if let Some(exit) = exit {
                    return Ok(exit);
                }
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
    }

    fn terminate(&mut self) -> io::Result<()> {
        let mut state = self.control.lock();
        state.terminate_requests += 1;
        if state.exits_on_sigterm && state.exit.is_none() {
            state.exit = Some(Termination::Signaled(SIGTERM));
        }
        Ok(())
    }

    fn kill(&mut self) -> ProcessFuture<'_, Termination> {
        Box::pin(async move {
            let mut state = self.control.lock();
            state.killed = true;
            Ok(*state.exit.get_or_insert(Termination::Signaled(SIGKILL)))
        })
    }

    fn close_channels(&mut self) {
        self.control.lock().channels_closed += 1;
    }
}

#[derive(Debug)]
struct LauncherState {
    exits_on_quit: bool,
    exits_on_sigterm: bool,
    quit_token: String,
    failures: VecDeque<FakeLaunchFailure>,
    launched: Vec<(LaunchRequest, FakeControl)>,
    next_pid: u32,
}

/// A launcher that:
/// - records every launch request
/// - hands out [`FakeProcess`]es whose behaviour tests drive through
///   [`FakeControl`]
/// - can be told to fail the next launches.
///
/// Clones share state, so a test can keep one clone as a probe after the
/// other has been moved into a dispatcher.
#[derive(Debug, Clone)]
pub struct FakeLauncher {
    inner: Arc<Mutex<LauncherState>>,
}

impl FakeLauncher {
    /// Children exit with 0 on the quit token and with SIGTERM on terminate.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(LauncherState {
                exits_on_quit: true,
                exits_on_sigterm: true,
                quit_token: DEFAULT_QUIT_TOKEN.to_string(),
                failures: VecDeque::new(),
                launched: Vec::new(),
                next_pid: 1000,
            })),
        }
    }

    /// Children ignore both the quit token and SIGTERM; only a kill stops
    /// them.
    pub fn stubborn() -> Self {
        let launcher = Self::new();
        {
            let mut inner = launcher.lock();
            inner.exits_on_quit = false;
            inner.exits_on_sigterm = false;
        }
        launcher
    }

    fn lock(&self) -> MutexGuard<'_, LauncherState> {
        self.inner.lock().unwrap()
    }

    pub fn fail_next(&self, failure: FakeLaunchFailure) {
        self.lock().failures.push_back(failure);
    }

    pub fn launch_count(&self) -> usize {
        self.lock().launched.len()
    }

    pub fn request(&self, index: usize) -> LaunchRequest {
        self.lock().launched[index].0.clone()
    }

    pub fn control(&self, index: usize) -> FakeControl {
        self.lock().launched[index].1.clone()
    }
}

impl Default for FakeLauncher {
    fn default() -> Self {
        Self::new()
    }
}

impl Launcher for FakeLauncher {
    type Process = FakeProcess;

    fn launch(&mut self, request: &LaunchRequest) -> Result<FakeProcess, LaunchError> {
        let mut inner = self.lock();

        if let Some(failure) = inner.failures.pop_front() {
            return Err(match failure {
                FakeLaunchFailure::Pipe => {
                    LaunchError::PipeCreationFailed(io::Error::other("fake EMFILE"))
                }
                FakeLaunchFailure::Fork => LaunchError::ForkFailed {
                    program: request.program.clone(),
                    source: io::Error::other("fake EAGAIN"),
                },
            });
        }

        inner.next_pid += 1;
        let control = FakeControl {
            state: Arc::new(Mutex::new(FakeState {
                pid: inner.next_pid,
                exit: None,
                written: Vec::new(),
                terminate_requests: 0,
                killed: false,
                channels_closed: 0,
                poll_fails: false,
                exits_on_quit: inner.exits_on_quit,
                exits_on_sigterm: inner.exits_on_sigterm,
                quit_token: inner.quit_token.clone(),
            })),
        };
        inner.launched.push((request.clone(), control.clone()));

        Ok(FakeProcess { control })
    }
}
