// src/dispatch/runtime.rs

use std::fmt;
use std::future::Future;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::errors::Result;
use crate::process::Launcher;
use crate::protocol::{ErrorCode, Response};

use super::core::Dispatcher;

/// Line-oriented IO shell around a [`Dispatcher`].
///
/// Reads requests from `input`, writes one response line per request to
/// `output`, and keeps going until the input reaches EOF or the `shutdown`
/// future resolves. Remaining children are torn down before returning,
/// whichever way the loop ended.
pub struct Runtime<L: Launcher> {
    dispatcher: Dispatcher<L>,
}

impl<L: Launcher> fmt::Debug for Runtime<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("live_handles", &self.dispatcher.registry().len())
            .finish_non_exhaustive()
    }
}

impl<L: Launcher> Runtime<L> {
    pub fn new(dispatcher: Dispatcher<L>) -> Self {
        Self { dispatcher }
    }

    /// Main dispatch loop.
    pub async fn run<R, W, S>(mut self, mut input: R, mut output: W, shutdown: S) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
        S: Future<Output = ()>,
    {
        info!("engine supervisor started");
        tokio::pin!(shutdown);

        // Kept across iterations: `read_until` may be interrupted by the
        // shutdown branch with part of a line already buffered.
        let mut buf = Vec::new();

        let result = loop {
            let read = tokio::select! {
                read = input.read_until(b'\n', &mut buf) => read,
                () = &mut shutdown => {
                    info!("shutdown requested; leaving dispatch loop");
                    break Ok(());
                }
            };

            match read {
                Ok(0) => {
                    info!("input closed; leaving dispatch loop");
                    break Ok(());
                }
                Ok(_) => {}
                Err(e) => break Err(e.into()),
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) => self.dispatcher.handle_line(line).await,
                Err(_) => Some(Response::failure(ErrorCode::ParseError)),
            };
            buf.clear();

            if let Some(response) = response {
                if let Err(e) = write_response(&mut output, &response).await {
                    break Err(e);
                }
            }
        };

        self.dispatcher.teardown().await;
        info!("engine supervisor exiting");
        result
    }
}

async fn write_response<W: AsyncWrite + Unpin>(output: &mut W, response: &Response) -> Result<()> {
    let mut line = response.encode()?;
    debug!(%line, "sending response");
    line.push('\n');
    output.write_all(line.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}
