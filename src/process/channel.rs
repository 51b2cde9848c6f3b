// src/process/channel.rs

//! Message channel to a child's standard input.
//!
//! Every write is exactly one line. Application messages carry a fixed
//! prefix so the engine can tell them apart from control tokens such as the
//! quit request.

use std::io;

use thiserror::Error;
use tracing::debug;

use crate::config::model::{DEFAULT_MESSAGE_PREFIX, DEFAULT_QUIT_TOKEN};
use crate::process::{ProcessHandle, SupervisedProcess};

#[derive(Debug, Error)]
#[error("failed to write to engine input: {0}")]
pub struct WriteError(#[from] pub io::Error);

/// Line framing for the input channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framing {
    message_prefix: String,
    quit_token: String,
}

impl Framing {
    pub fn new(message_prefix: &str, quit_token: &str) -> Self {
        Self {
            message_prefix: message_prefix.to_string(),
            quit_token: quit_token.to_string(),
        }
    }

    /// `<prefix><payload>\n`, with backslashes and line breaks in the payload
    /// escaped so the frame stays on one line.
    pub fn message(&self, payload: &str) -> Vec<u8> {
        let mut line = String::with_capacity(self.message_prefix.len() + payload.len() + 1);
        line.push_str(&self.message_prefix);
        for c in payload.chars() {
            match c {
                '\\' => line.push_str("\\\\"),
                '\n' => line.push_str("\\n"),
                '\r' => line.push_str("\\r"),
                c => line.push(c),
            }
        }
        line.push('\n');
        line.into_bytes()
    }

    pub fn quit(&self) -> Vec<u8> {
        format!("{}\n", self.quit_token).into_bytes()
    }
}

impl Default for Framing {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE_PREFIX, DEFAULT_QUIT_TOKEN)
    }
}

/// Deliver one application message.
///
/// A failure here usually means the child already exited and closed its
/// read end; callers report it as undeliverable, not as a supervisor fault.
pub async fn send<P: SupervisedProcess>(
    handle: &mut ProcessHandle<P>,
    framing: &Framing,
    payload: &str,
) -> Result<(), WriteError> {
    let frame = framing.message(payload);
    write_frame(handle, &frame).await
}

/// Ask the engine to quit on its own.
pub async fn send_quit<P: SupervisedProcess>(
    handle: &mut ProcessHandle<P>,
    framing: &Framing,
) -> Result<(), WriteError> {
    let frame = framing.quit();
    write_frame(handle, &frame).await
}

async fn write_frame<P: SupervisedProcess>(
    handle: &mut ProcessHandle<P>,
    frame: &[u8],
) -> Result<(), WriteError> {
    if handle.is_closed() {
        return Err(WriteError(io::Error::from(io::ErrorKind::BrokenPipe)));
    }
    handle.process_mut().write_input(frame).await?;
    debug!(reference = %handle.reference(), bytes = frame.len(), "wrote frame to engine input");
    Ok(())
}
