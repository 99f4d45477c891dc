use std::io;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, Utc};
use tokio::io::{AsyncRead, AsyncWrite, BufReader, ReadHalf, WriteHalf};
use tokio::time::timeout;

use crate::config::Config;
use crate::error::{Phase, ServeError, ServeResult};
use crate::http::parser::read_request;
use crate::http::request::Request;
use crate::http::resource::{Resolution, Resolver};
use crate::http::response::{Response, StatusCode};
use crate::http::template::{TemplateContext, http_date, long_date};
use crate::http::writer::ResponseWriter;

/// Read-only state shared by every connection.
#[derive(Debug, Clone)]
pub struct Site {
    pub resolver: Resolver,
    pub server_name: String,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl Site {
    pub fn from_config(cfg: &Config) -> io::Result<Self> {
        Ok(Self {
            resolver: Resolver::new(&cfg.static_files)?,
            server_name: cfg.static_files.server_name.clone(),
            read_timeout: cfg.server.read_timeout(),
            write_timeout: cfg.server.write_timeout(),
        })
    }
}

/// How a connection ended. The stream is closed either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A full response was written.
    Completed,
    /// Reading or delivering failed part way.
    Aborted,
}

pub enum ConnectionState {
    Reading,
    Delivering { request: Request, read_failed: bool },
    Closing(Outcome),
    Closed(Outcome),
}

/// Serves exactly one request on one stream, then closes it.
pub struct Connection<S> {
    reader: BufReader<ReadHalf<S>>,
    writer: ResponseWriter<WriteHalf<S>>,
    site: Arc<Site>,
    state: ConnectionState,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, site: Arc<Site>) -> Self {
        let (read_half, write_half) = tokio::io::split(stream);
        Self {
            reader: BufReader::new(read_half),
            writer: ResponseWriter::new(write_half),
            site,
            state: ConnectionState::Reading,
        }
    }

    /// Runs read, deliver and close in order. Never returns early: every
    /// path goes through `Closing`.
    pub async fn run(mut self) -> Outcome {
        loop {
            let state = std::mem::replace(&mut self.state, ConnectionState::Closed(Outcome::Aborted));

            self.state = match state {
                ConnectionState::Reading => {
                    let read = read_request(&mut self.reader, Some(self.site.read_timeout)).await;

                    if let Some(e) = &read.error {
                        tracing::warn!(error = %e, "failed to read request");
                    }

                    ConnectionState::Delivering {
                        request: read.request,
                        read_failed: read.error.is_some(),
                    }
                }

                ConnectionState::Delivering { request, read_failed } => {
                    let delivered = match timeout(self.site.write_timeout, self.deliver(&request)).await {
                        Ok(res) => res,
                        Err(_) => Err(ServeError::Timeout {
                            phase: Phase::Deliver,
                            secs: self.site.write_timeout.as_secs(),
                        }),
                    };

                    match delivered {
                        Ok(status) => {
                            tracing::info!(
                                method = %request.method,
                                path = %request.path,
                                status = status.as_u16(),
                                bytes = self.writer.written(),
                                "request served"
                            );
                            if read_failed {
                                ConnectionState::Closing(Outcome::Aborted)
                            } else {
                                ConnectionState::Closing(Outcome::Completed)
                            }
                        }
                        Err(e) => {
                            tracing::warn!(path = %request.path, error = %e, "failed to deliver response");
                            ConnectionState::Closing(Outcome::Aborted)
                        }
                    }
                }

                ConnectionState::Closing(outcome) => {
                    // Shutdown flushes whatever body is still buffered, so a
                    // peer that stopped reading can stall it.
                    match timeout(self.site.write_timeout, self.writer.shutdown()).await {
                        Ok(Ok(())) => ConnectionState::Closed(outcome),
                        Ok(Err(e)) => {
                            tracing::debug!(error = %e, "error while closing connection");
                            ConnectionState::Closed(outcome)
                        }
                        Err(_) => {
                            tracing::warn!(
                                secs = self.site.write_timeout.as_secs(),
                                "peer stopped reading, dropping connection"
                            );
                            ConnectionState::Closed(Outcome::Aborted)
                        }
                    }
                }

                ConnectionState::Closed(outcome) => {
                    return outcome;
                }
            };
        }
    }

    /// Resolves the request once and writes the matching response.
    async fn deliver(&mut self, request: &Request) -> ServeResult<StatusCode> {
        let now = Utc::now();
        let date = http_date(&now);
        let template = TemplateContext::new(long_date(&now.with_timezone(&Local)), &self.site.server_name);
        let server = self.site.server_name.as_str();

        let path = request.resource_path();
        let response = match self.site.resolver.resolve(path).await? {
            Resolution::Found(resource) => {
                tracing::debug!(
                    path,
                    kind = ?resource.kind,
                    file = %resource.location.display(),
                    "resolved resource"
                );
                Response::ok(resource, server, &date)
            }
            Resolution::NotFound => {
                tracing::info!(path, "resource not found");
                Response::not_found(server, &date)
            }
            Resolution::Unsupported => {
                tracing::info!(path, "unsupported resource type");
                Response::not_found(server, &date)
            }
        };

        let status = response.status();
        self.writer.send(response, &template).await?;
        Ok(status)
    }
}
