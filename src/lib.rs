//! Simple static web server.
//!
//! Serves html pages and images from a document root, one request per
//! connection, with serve-time template substitution in html.

pub mod config;
pub mod error;
pub mod http;
pub mod server;
