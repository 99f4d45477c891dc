use bytes::Bytes;
use tokio::fs::File;

use crate::http::resource::{BodyMode, Resource};

/// Body sent with every 404.
pub const NOT_FOUND_BODY: &[u8] =
    b"<html><head></head><body>\n<h3>404<br />Not found</h3>\n</body></html>\n";

/// Status codes this server emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 404 Not Found
    NotFound,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use simple_web_server::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotFound.as_u16(), 404);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::NotFound => 404,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// Status line and header fields of a response.
///
/// Fields keep insertion order; the order they are added is the order they
/// go on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: StatusCode,
    pub headers: Vec<(String, String)>,
}

impl ResponseHead {
    /// The header block every response carries: `Date`, `Server`,
    /// `Connection: close`, `Content-Type`, in that order.
    pub fn standard(status: StatusCode, content_type: &str, server: &str, date: &str) -> Self {
        ResponseBuilder::new(status)
            .header("Date", date)
            .header("Server", server)
            .header("Connection", "close")
            .header("Content-Type", content_type)
            .build()
    }

    /// Looks up a header value, ignoring ASCII case in the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Builder for [`ResponseHead`].
///
/// # Example
///
/// ```
/// # use simple_web_server::http::response::{ResponseBuilder, StatusCode};
/// let head = ResponseBuilder::new(StatusCode::Ok)
///     .header("Server", "demo")
///     .header("Content-Type", "text/html")
///     .build();
/// assert_eq!(head.headers[0].0, "Server");
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
        }
    }

    /// Appends a header, or replaces the value in place if one with the
    /// same name was already added.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();

        match self
            .headers
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(slot) => slot.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Builds the head. A missing `Content-Type` is filled in as
    /// `text/html`, so every response carries one.
    pub fn build(self) -> ResponseHead {
        let needs_type = !self
            .headers
            .iter()
            .any(|(k, _)| k.eq_ignore_ascii_case("Content-Type"));

        let builder = if needs_type {
            self.header("Content-Type", "text/html")
        } else {
            self
        };

        ResponseHead {
            status: builder.status,
            headers: builder.headers,
        }
    }
}

/// Where the body bytes come from.
#[derive(Debug)]
pub enum Body {
    /// Read line by line with template substitution.
    Text(File),
    /// Copied verbatim.
    Binary(File),
    /// Fixed in-memory bytes.
    Fixed(Bytes),
}

/// A complete response ready for the writer.
#[derive(Debug)]
pub struct Response {
    pub head: ResponseHead,
    pub body: Body,
}

impl Response {
    /// `200 OK` for a resolved resource.
    pub fn ok(resource: Resource, server: &str, date: &str) -> Self {
        let head = ResponseHead::standard(StatusCode::Ok, resource.content_type, server, date);
        let body = match resource.mode {
            BodyMode::Text => Body::Text(resource.file),
            BodyMode::Binary => Body::Binary(resource.file),
        };
        Self { head, body }
    }

    /// `404 Not Found` with the fixed html fragment.
    pub fn not_found(server: &str, date: &str) -> Self {
        Self {
            head: ResponseHead::standard(StatusCode::NotFound, "text/html", server, date),
            body: Body::Fixed(Bytes::from_static(NOT_FOUND_BODY)),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.head.status
    }
}
