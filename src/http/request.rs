/// The method token this server acts on. Lines starting with any other
/// token are read and discarded.
pub const GET: &str = "GET";

/// What survives of an incoming request once the header block has been read.
///
/// Only the request line matters: headers are consumed and dropped. `path`
/// is empty when no usable `GET` line arrived before the blank line, the end
/// of the stream, or a read failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// Method token of the request line, kept for logging only.
    pub method: String,
    /// Target exactly as sent (e.g. `/index.html`).
    pub path: String,
}

impl Request {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }

    /// A request for which nothing usable was read.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// The target with any `?query` or `#fragment` suffix removed.
    pub fn resource_path(&self) -> &str {
        let end = self
            .path
            .find(['?', '#'])
            .unwrap_or(self.path.len());
        &self.path[..end]
    }
}
