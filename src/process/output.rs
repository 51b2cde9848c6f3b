// src/process/output.rs

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Consume one of the child's output channels so its pipe buffer never
/// fills; every line is logged at debug.
///
/// The task ends at EOF. Aborting it drops the reader, which closes the
/// parent-side end of the pipe.
pub fn spawn_drain<R>(pid: Option<u32>, stream: &'static str, reader: R) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let line = String::from_utf8_lossy(&buf);
                    debug!(pid = ?pid, stream, "{}", line.trim_end_matches(['\n', '\r']));
                }
                Err(e) => {
                    warn!(pid = ?pid, stream, error = %e, "failed to read child channel");
                    break;
                }
            }
        }

        debug!(pid = ?pid, stream, "child channel closed");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn drain_finishes_at_eof() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let drain = spawn_drain(Some(42), "stdout", reader);

        writer.write_all(b"hello\nnot utf8 \xff\n").await.unwrap();
        drop(writer);

        tokio::time::timeout(std::time::Duration::from_secs(1), drain)
            .await
            .expect("drain did not finish after EOF")
            .unwrap();
    }
}
