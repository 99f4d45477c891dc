//! Error types for the per-connection handler.
//!
//! Application edges (config loading, the listener, `main`) use `anyhow`;
//! everything that can go wrong while serving a single connection is a
//! [`ServeError`] so the handler can decide how to finish the exchange.

use std::io;

use thiserror::Error;

/// Phase of the request handler an error happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Read,
    Deliver,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Read => f.write_str("read"),
            Phase::Deliver => f.write_str("deliver"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    /// Socket or filesystem failure before anything was committed.
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    /// The peer or the disk did not make progress within the deadline.
    #[error("{phase} deadline of {secs}s elapsed")]
    Timeout { phase: Phase, secs: u64 },

    /// The body failed after the status line and headers were flushed.
    /// The status can no longer change; the response is truncated.
    #[error("body interrupted after header was sent: {0}")]
    HeaderCommitted(#[source] io::Error),
}

impl ServeError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ServeError::Timeout { .. })
    }
}

pub type ServeResult<T> = Result<T, ServeError>;
