// src/exec/stream.rs

//! Draining of child output pipes.

use std::fmt;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tracing::{debug, warn};

use crate::exec::callbacks::OutputHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamKind::Stdout => f.write_str("stdout"),
            StreamKind::Stderr => f.write_str("stderr"),
        }
    }
}

/// Read `reader` to end-of-stream, handing each line (newline included) to
/// `on_chunk` and returning everything that was read.
///
/// Invalid UTF-8 is replaced rather than aborting the drain. A read error
/// ends the drain early; whatever was collected up to that point is kept.
pub async fn drain<R>(reader: Option<R>, kind: StreamKind, on_chunk: Option<&OutputHandler>) -> String
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return String::new();
    };

    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut collected = String::new();

    loop {
        line.clear();
        match reader.read_until(b'\n', &mut line).await {
            Ok(0) => break,
            Ok(_) => {
                let chunk = String::from_utf8_lossy(&line);
                debug!(stream = %kind, "{}", chunk.trim_end());
                if let Some(cb) = on_chunk {
                    cb(&chunk);
                }
                collected.push_str(&chunk);
            }
            Err(e) => {
                warn!(stream = %kind, error = %e, "read error while draining child output");
                break;
            }
        }
    }

    debug!(stream = %kind, bytes = collected.len(), "stream drained");
    collected
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn recorder() -> (OutputHandler, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let handler: OutputHandler = Box::new(move |chunk| sink.lock().unwrap().push(chunk.to_string()));
        (handler, seen)
    }

    #[tokio::test]
    async fn chunks_are_lines_with_newlines() {
        let (handler, seen) = recorder();
        let input: &[u8] = b"out1\nout2\npartial";

        let all = drain(Some(input), StreamKind::Stdout, Some(&handler)).await;

        assert_eq!(all, "out1\nout2\npartial");
        assert_eq!(*seen.lock().unwrap(), vec!["out1\n", "out2\n", "partial"]);
    }

    #[tokio::test]
    async fn missing_pipe_yields_nothing() {
        let (handler, seen) = recorder();
        let all = drain::<&[u8]>(None, StreamKind::Stderr, Some(&handler)).await;

        assert!(all.is_empty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_utf8_is_replaced() {
        let input: &[u8] = b"ok\n\xff\xfe\n";
        let all = drain(Some(input), StreamKind::Stdout, None).await;
        assert_eq!(all, "ok\n\u{fffd}\u{fffd}\n");
    }
}
