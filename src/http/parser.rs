use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tokio::time::{Instant, timeout_at};

use crate::error::{Phase, ServeError};
use crate::http::request::{GET, Request};

/// Upper bound on the bytes read for one request's header block. Reading
/// stops at the bound as if the peer had closed the stream.
pub const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Result of the read phase. The request is always usable (possibly with an
/// empty path); `error` records why reading stopped early, if it did.
#[derive(Debug)]
pub struct ReadOutcome {
    pub request: Request,
    pub error: Option<ServeError>,
}

/// Extracts method and target from a `GET` request line.
///
/// Returns `None` for any line whose first token is not `GET` or that has
/// no second token.
pub fn parse_request_line(line: &str) -> Option<Request> {
    let mut parts = line.split_whitespace();

    let method = parts.next()?;
    if method != GET {
        return None;
    }
    let path = parts.next()?;

    Some(Request::new(method, path))
}

/// Reads one header block from `reader`.
///
/// Consumes lines until a blank line or the end of the stream. The first
/// `GET` line supplies the target; every other line is discarded. Never
/// fails: a read error or an elapsed deadline ends the block early and is
/// reported through [`ReadOutcome::error`].
pub async fn read_request<R>(reader: &mut R, deadline: Option<Duration>) -> ReadOutcome
where
    R: AsyncBufRead + Unpin,
{
    let started = Instant::now();
    let mut limited = reader.take(MAX_HEADER_BYTES as u64);
    let mut request: Option<Request> = None;
    let mut line = Vec::with_capacity(256);

    let error = loop {
        line.clear();

        let read = limited.read_until(b'\n', &mut line);
        let n = match deadline {
            Some(limit) => match timeout_at(started + limit, read).await {
                Ok(res) => res,
                Err(_) => {
                    break Some(ServeError::Timeout {
                        phase: Phase::Read,
                        secs: limit.as_secs(),
                    });
                }
            },
            None => read.await,
        };

        let n = match n {
            Ok(n) => n,
            Err(e) => break Some(ServeError::Io(e)),
        };

        if n == 0 {
            // Peer closed the stream, or the header cap was hit.
            break None;
        }

        if limited.limit() == 0 && !line.ends_with(b"\n") {
            // Cut off by the header cap; what was read is not a whole line.
            tracing::debug!(limit = MAX_HEADER_BYTES, "header block too large");
            break None;
        }

        let text = String::from_utf8_lossy(&line);
        let text = text.trim_end_matches(['\r', '\n']);

        tracing::trace!(line = %text, "request line");

        if text.is_empty() {
            break None;
        }

        if request.is_none() {
            request = parse_request_line(text);
        }
    };

    if let Some(e) = &error {
        tracing::debug!(error = %e, "request read stopped early");
    }

    ReadOutcome {
        request: request.unwrap_or_else(Request::empty),
        error,
    }
}
