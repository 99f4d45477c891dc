//! Serve-time substitution of template tokens in text resources.
//!
//! Two literal tokens are recognized anywhere in a line:
//!
//! - `<cs371date>` becomes the current local time, e.g.
//!   `October 18, 2026 3:04:05 PM`;
//! - `<cs371server>` becomes the server identification string.
//!
//! Every occurrence is replaced. Matching is byte-level, so lines that are
//! not valid UTF-8 pass through untouched apart from the tokens.

use std::borrow::Cow;

use chrono::{DateTime, Local, Utc};
use memchr::memmem;

pub const DATE_TOKEN: &[u8] = b"<cs371date>";
pub const SERVER_TOKEN: &[u8] = b"<cs371server>";

/// Long local date-time used for `<cs371date>`.
pub const LONG_DATE_FORMAT: &str = "%B %-d, %Y %-I:%M:%S %p";

/// IMF-fixdate, used for the `Date` header.
pub const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

pub fn long_date(now: &DateTime<Local>) -> String {
    now.format(LONG_DATE_FORMAT).to_string()
}

pub fn http_date(now: &DateTime<Utc>) -> String {
    now.format(HTTP_DATE_FORMAT).to_string()
}

/// Replacement values for one response.
///
/// Captured once so every token in a response carries the same time.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    date: String,
    server: String,
}

impl TemplateContext {
    pub fn new(date: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            server: server.into(),
        }
    }

    pub fn now(server: impl Into<String>) -> Self {
        Self::new(long_date(&Local::now()), server)
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    /// Returns `line` with every token replaced. Borrows when the line
    /// holds no token.
    pub fn substitute<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        let mut out = Cow::Borrowed(line);

        if let Some(replaced) = replace_all(&out, DATE_TOKEN, self.date.as_bytes()) {
            out = Cow::Owned(replaced);
        }
        if let Some(replaced) = replace_all(&out, SERVER_TOKEN, self.server.as_bytes()) {
            out = Cow::Owned(replaced);
        }

        out
    }
}

/// `None` when `needle` does not occur in `haystack`.
fn replace_all(haystack: &[u8], needle: &[u8], replacement: &[u8]) -> Option<Vec<u8>> {
    let mut hits = memmem::find_iter(haystack, needle).peekable();
    hits.peek()?;

    let mut out = Vec::with_capacity(haystack.len() + replacement.len());
    let mut last = 0;
    for start in hits {
        out.extend_from_slice(&haystack[last..start]);
        out.extend_from_slice(replacement);
        last = start + needle.len();
    }
    out.extend_from_slice(&haystack[last..]);

    Some(out)
}
