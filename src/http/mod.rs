//! HTTP protocol implementation.
//!
//! A deliberately small HTTP/1.1 subset: one `GET` per connection, request
//! headers ignored, `Connection: close` on every response.
//!
//! # Architecture
//!
//! - **`connection`**: the per-connection handler driving the state machine below
//! - **`parser`**: reads the header block and extracts the request target
//! - **`request`**: the parsed request
//! - **`resource`**: classifies targets and opens files under the document root
//! - **`template`**: `<cs371date>` / `<cs371server>` substitution
//! - **`response`**: status codes, ordered header block, body sources
//! - **`writer`**: serializes the head and streams the body
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Header block, under the read deadline
//!        └──────┬──────┘
//!               │ Request (path may be empty)
//!               ▼
//!        ┌──────────────────┐
//!        │   Delivering     │ ← Resolve once, write head + body
//!        └──────┬───────────┘
//!               │ Completed / Aborted
//!               ▼
//!        ┌──────────────────┐
//!        │    Closing       │ ← Flush and shut down, always
//!        └──────┬───────────┘
//!               ▼
//!             Closed
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use simple_web_server::config::Config;
//! use simple_web_server::http::connection::{Connection, Site};
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let site = Arc::new(Site::from_config(&Config::default())?);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let site = site.clone();
//!         tokio::spawn(async move {
//!             Connection::new(socket, site).run().await;
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod resource;
pub mod response;
pub mod template;
pub mod writer;
