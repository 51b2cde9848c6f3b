// src/process/launcher.rs

//! Spawning engine processes.
//!
//! The three pipes are allocated up front with `O_CLOEXEC`, so a child only
//! ever inherits its own ends (dup'ed onto fds 0/1/2 by the spawn), never the
//! parent-side ends of its siblings.

use std::io;
use std::os::fd::OwnedFd;
use std::process::Stdio;

use nix::errno::Errno;
use nix::fcntl::OFlag;
use nix::sys::signal::{self, Signal};
use nix::unistd::{Pid, pipe2};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::net::unix::pipe;
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::process::{ProcessFuture, SupervisedProcess, output};
use crate::types::Termination;

/// What to execute for a `create` command.
///
/// `args` is passed verbatim: `args[0]` becomes the child's `argv[0]` and the
/// rest its arguments. `program` is what actually gets resolved and executed,
/// which is `args[0]` unless an explicit path overrides it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchRequest {
    /// Build a request from the protocol fields. Returns `None` when there is
    /// nothing to execute (no `lib_path` and an empty `args`).
    pub fn new(args: Vec<String>, lib_path: Option<String>) -> Option<Self> {
        let program = match lib_path {
            Some(path) if !path.is_empty() => path,
            _ => args.first()?.clone(),
        };
        Some(Self { program, args })
    }

    pub fn argv0(&self) -> &str {
        self.args.first().map(String::as_str).unwrap_or(&self.program)
    }

    pub fn arguments(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("failed to allocate child pipes: {0}")]
    PipeCreationFailed(#[source] io::Error),

    #[error("failed to spawn '{program}': {source}")]
    ForkFailed {
        program: String,
        #[source]
        source: io::Error,
    },
}

/// Exit status reported for a child whose program image could not be loaded.
pub const EXEC_FAILURE_STATUS: i32 = 127;

/// Creates child processes for the dispatcher.
///
/// Launching never touches the registry; the caller inserts the result.
pub trait Launcher: Send {
    type Process: SupervisedProcess;

    fn launch(&mut self, request: &LaunchRequest) -> Result<Self::Process, LaunchError>;
}

/// Production launcher backed by `tokio::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl Launcher for ProcessLauncher {
    type Process = EngineProcess;

    fn launch(&mut self, request: &LaunchRequest) -> Result<EngineProcess, LaunchError> {
        let input = PipePair::new().map_err(LaunchError::PipeCreationFailed)?;
        let output = PipePair::new().map_err(LaunchError::PipeCreationFailed)?;
        let error = PipePair::new().map_err(LaunchError::PipeCreationFailed)?;

        let input_tx =
            pipe::Sender::from_owned_fd(input.write).map_err(LaunchError::PipeCreationFailed)?;
        let output_rx =
            pipe::Receiver::from_owned_fd(output.read).map_err(LaunchError::PipeCreationFailed)?;
        let error_rx =
            pipe::Receiver::from_owned_fd(error.read).map_err(LaunchError::PipeCreationFailed)?;

        let child = match spawn_child(request, input.read, output.write, error.write) {
            Ok(child) => child,
            Err(source) if is_exec_failure(&source) => {
                warn!(
                    program = %request.program,
                    error = %source,
                    status = EXEC_FAILURE_STATUS,
                    "engine image could not be executed"
                );
                return Ok(EngineProcess::exited(EXEC_FAILURE_STATUS));
            }
            Err(source) => {
                return Err(LaunchError::ForkFailed {
                    program: request.program.clone(),
                    source,
                });
            }
        };

        let pid = child.id();
        info!(program = %request.program, pid = ?pid, "engine process launched");

        Ok(EngineProcess {
            child: Some(child),
            exec_failure: None,
            input: Some(input_tx),
            output: Some(output::spawn_drain(pid, "stdout", output_rx)),
            error: Some(output::spawn_drain(pid, "stderr", error_rx)),
        })
    }
}

/// Errors the spawn primitive reports after the fork, when the child failed
/// to replace its image. Anything else is a failure to create the process.
fn is_exec_failure(err: &io::Error) -> bool {
    let Some(code) = err.raw_os_error() else {
        return false;
    };
    matches!(
        Errno::from_raw(code),
        Errno::ENOENT
            | Errno::EACCES
            | Errno::ENOEXEC
            | Errno::ENOTDIR
            | Errno::ELOOP
            | Errno::ENAMETOOLONG
            | Errno::ETXTBSY
    )
}

struct PipePair {
    read: OwnedFd,
    write: OwnedFd,
}

impl PipePair {
    fn new() -> io::Result<Self> {
        let (read, write) = pipe2(OFlag::O_CLOEXEC)?;
        Ok(Self { read, write })
    }
}

/// Spawn the child with the given fds as its standard streams.
///
/// The `Command` keeps the child-side fds alive until it is dropped, which
/// happens when this function returns.
fn spawn_child(
    request: &LaunchRequest,
    stdin: OwnedFd,
    stdout: OwnedFd,
    stderr: OwnedFd,
) -> io::Result<Child> {
    let mut command = Command::new(&request.program);
    command
        .arg0(request.argv0())
        .args(request.arguments())
        .stdin(Stdio::from(stdin))
        .stdout(Stdio::from(stdout))
        .stderr(Stdio::from(stderr))
        .kill_on_drop(true);

    command.spawn()
}

/// A running engine child and the parent-side ends of its three pipes.
///
/// stdout and stderr are owned by their drain tasks; aborting those tasks
/// closes the read ends. A child that never got its image loaded has no
/// `Child` and no channels, only the status it would have exited with.
pub struct EngineProcess {
    child: Option<Child>,
    exec_failure: Option<Termination>,
    input: Option<pipe::Sender>,
    output: Option<JoinHandle<()>>,
    error: Option<JoinHandle<()>>,
}

impl EngineProcess {
    fn exited(code: i32) -> Self {
        Self {
            child: None,
            exec_failure: Some(Termination::Exited(code)),
            input: None,
            output: None,
            error: None,
        }
    }

    fn child_mut(&mut self) -> Result<&mut Child, Termination> {
        let fallback = self
            .exec_failure
            .unwrap_or(Termination::Exited(EXEC_FAILURE_STATUS));
        self.child.as_mut().ok_or(fallback)
    }
}

impl SupervisedProcess for EngineProcess {
    fn id(&self) -> Option<u32> {
        self.child.as_ref().and_then(Child::id)
    }

    fn try_wait(&mut self) -> io::Result<Option<Termination>> {
        match self.child_mut() {
            Ok(child) => Ok(child.try_wait()?.map(Termination::from)),
            Err(termination) => Ok(Some(termination)),
        }
    }

    fn write_input<'a>(&'a mut self, bytes: &'a [u8]) -> ProcessFuture<'a, ()> {
        Box::pin(async move {
            let input = self
                .input
                .as_mut()
                .ok_or_else(|| io::Error::from(io::ErrorKind::BrokenPipe))?;
            input.write_all(bytes).await?;
            input.flush().await
        })
    }

    fn wait(&mut self) -> ProcessFuture<'_, Termination> {
        Box::pin(async move {
            match self.child_mut() {
                Ok(child) => Ok(child.wait().await?.into()),
                Err(termination) => Ok(termination),
            }
        })
    }

    fn terminate(&mut self) -> io::Result<()> {
        // Already reaped; the pid may belong to someone else by now.
        let Some(pid) = self.id() else {
            return Ok(());
        };
        let pid = i32::try_from(pid)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        signal::kill(Pid::from_raw(pid), Signal::SIGTERM)?;
        Ok(())
    }

    fn kill(&mut self) -> ProcessFuture<'_, Termination> {
        Box::pin(async move {
            let child = match self.child_mut() {
                Ok(child) => child,
                Err(termination) => return Ok(termination),
            };
            if let Some(status) = child.try_wait()? {
                return Ok(status.into());
            }
            child.kill().await?;
            let status = child.wait().await?;
            debug!(?status, "engine process killed");
            Ok(status.into())
        })
    }

    fn close_channels(&mut self) {
        self.input.take();
        for drain in [self.output.take(), self.error.take()].into_iter().flatten() {
            drain.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn program_defaults_to_first_argument() {
        let req = LaunchRequest::new(strings(&["/bin/sleep", "5"]), None).unwrap();
        assert_eq!(req.program, "/bin/sleep");
        assert_eq!(req.argv0(), "/bin/sleep");
        assert_eq!(req.arguments(), &["5".to_string()]);
    }

    #[test]
    fn lib_path_overrides_program_but_keeps_args() {
        let req = LaunchRequest::new(
            strings(&["godot", "--headless"]),
            Some("/opt/godot/bin/godot".to_string()),
        )
        .unwrap();
        assert_eq!(req.program, "/opt/godot/bin/godot");
        assert_eq!(req.argv0(), "godot");
        assert_eq!(req.arguments(), &["--headless".to_string()]);
    }

    #[test]
    fn empty_lib_path_is_ignored() {
        let req = LaunchRequest::new(strings(&["engine"]), Some(String::new())).unwrap();
        assert_eq!(req.program, "engine");
    }

    #[test]
    fn nothing_to_execute_yields_none() {
        assert!(LaunchRequest::new(Vec::new(), None).is_none());
    }

    #[test]
    fn missing_binary_counts_as_exec_failure() {
        assert!(is_exec_failure(&io::Error::from_raw_os_error(Errno::ENOENT as i32)));
        assert!(is_exec_failure(&io::Error::from_raw_os_error(Errno::ENOEXEC as i32)));
        assert!(!is_exec_failure(&io::Error::from_raw_os_error(Errno::EAGAIN as i32)));
        assert!(!is_exec_failure(&io::Error::from(io::ErrorKind::Other)));
    }

    #[tokio::test]
    async fn unexecutable_image_reports_exit_status() {
        let req = LaunchRequest::new(strings(&["/nonexistent/engine-binary"]), None).unwrap();
        let mut process = ProcessLauncher::new().launch(&req).unwrap();

        assert_eq!(process.id(), None);
        assert_eq!(
            process.try_wait().unwrap(),
            Some(Termination::Exited(EXEC_FAILURE_STATUS))
        );
        assert!(process.write_input(b"MSG:hi\n").await.is_err());
        assert_eq!(
            process.kill().await.unwrap(),
            Termination::Exited(EXEC_FAILURE_STATUS)
        );
    }

    #[test]
    fn lib_path_without_args_uses_path_as_argv0() {
        let req = LaunchRequest::new(Vec::new(), Some("/bin/true".to_string())).unwrap();
        assert_eq!(req.argv0(), "/bin/true");
        assert!(req.arguments().is_empty());
    }
}
