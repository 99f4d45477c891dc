#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use simple_web_server::config::StaticConfig;
use simple_web_server::http::connection::{Connection, Outcome, Site};
use simple_web_server::http::resource::Resolver;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

pub const SERVER_NAME: &str = "Test static server";

/// A small PNG-like payload with bytes that are not valid UTF-8 and
/// embedded line breaks.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR\xff\xfe<cs371date>";
pub const ICON_BYTES: &[u8] = b"\x00\x00\x01\x00\x01\x00\x10\x10\n\r\x00";

pub fn write_file(root: &Path, relative: &str, contents: &[u8]) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, contents).unwrap();
}

/// Document root with a welcome page, an icon, one html page and one image.
pub fn document_root() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    write_file(
        root,
        "welcome/welcome.html",
        b"<html><body>\n<p>Served by <cs371server></p>\n<p>at <cs371date></p>\n</body></html>\n",
    );
    write_file(root, "images/favicon.ico", ICON_BYTES);
    write_file(root, "index.html", b"<html><cs371date></html>");
    write_file(root, "img/logo.png", PNG_BYTES);

    dir
}

pub fn site_for(root: &Path) -> Arc<Site> {
    site_with_timeouts(root, Duration::from_secs(5), Duration::from_secs(5))
}

pub fn site_with_timeouts(root: &Path, read: Duration, write: Duration) -> Arc<Site> {
    let config = StaticConfig {
        document_root: root.to_path_buf(),
        server_name: SERVER_NAME.to_string(),
        ..StaticConfig::default()
    };

    Arc::new(Site {
        resolver: Resolver::new(&config).unwrap(),
        server_name: SERVER_NAME.to_string(),
        read_timeout: read,
        write_timeout: write,
    })
}

/// A response split at the end of its header block.
#[derive(Debug)]
pub struct RawResponse {
    pub head: String,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn parse(bytes: &[u8]) -> Self {
        let end = bytes
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .expect("response has a header block");

        Self {
            head: String::from_utf8(bytes[..end].to_vec()).unwrap(),
            body: bytes[end + 4..].to_vec(),
        }
    }

    pub fn status_line(&self) -> &str {
        self.head.lines().next().unwrap()
    }

    /// Header lines after the status line, in wire order.
    pub fn header_lines(&self) -> Vec<&str> {
        self.head.lines().skip(1).collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.header_lines().into_iter().find_map(|line| {
            let (k, v) = line.split_once(": ")?;
            k.eq_ignore_ascii_case(name).then_some(v)
        })
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Runs one connection over an in-memory stream, sending `request` and
/// reading until the server closes its side.
pub async fn exchange(site: Arc<Site>, request: &[u8]) -> (RawResponse, Outcome) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let handler = tokio::spawn(Connection::new(server, site).run());

    client.write_all(request).await.unwrap();

    let mut received = Vec::new();
    client.read_to_end(&mut received).await.unwrap();
    let outcome = handler.await.unwrap();

    (RawResponse::parse(&received), outcome)
}
