use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::error::{ServeError, ServeResult};
use crate::http::response::{Body, Response, ResponseHead};
use crate::http::template::TemplateContext;

const HTTP_VERSION: &str = "HTTP/1.1";
const COPY_CHUNK: usize = 8 * 1024;

/// Serializes the status line, header fields, and the blank line that ends
/// the header block.
pub fn serialize_head(head: &ResponseHead) -> Vec<u8> {
    let mut buf = Vec::with_capacity(256);

    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        head.status.as_u16(),
        head.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &head.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}

/// Writes one response onto the write side of a connection.
///
/// The header block is flushed before any body byte is read, so a failure
/// while reading the body cannot change the status; it surfaces as
/// [`ServeError::HeaderCommitted`] and the response is left truncated.
/// Bodies are streamed in chunks (binary) or lines (text) and never held in
/// memory whole.
pub struct ResponseWriter<W> {
    out: BufWriter<W>,
    written: u64,
}

impl<W: AsyncWrite + Unpin> ResponseWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            out: BufWriter::new(inner),
            written: 0,
        }
    }

    /// Body bytes written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Writes the head, then the body in the mode the body calls for.
    pub async fn send(&mut self, response: Response, template: &TemplateContext) -> ServeResult<()> {
        self.write_head(&response.head).await?;

        match response.body {
            Body::Text(file) => self.write_text(file, template).await,
            Body::Binary(file) => self.write_binary(file).await,
            Body::Fixed(bytes) => {
                self.out.write_all(&bytes).await?;
                self.written += bytes.len() as u64;
                Ok(())
            }
        }
    }

    pub async fn write_head(&mut self, head: &ResponseHead) -> ServeResult<()> {
        self.out.write_all(&serialize_head(head)).await?;
        self.out.flush().await?;
        Ok(())
    }

    /// Copies `file` line by line, substituting template tokens. Line
    /// terminators (`\n`, `\r\n`) are dropped and not written back.
    async fn write_text(&mut self, file: File, template: &TemplateContext) -> ServeResult<()> {
        let mut lines = BufReader::new(file);
        let mut line = Vec::with_capacity(512);

        loop {
            line.clear();
            let n = lines
                .read_until(b'\n', &mut line)
                .await
                .map_err(ServeError::HeaderCommitted)?;
            if n == 0 {
                return Ok(());
            }

            let content = strip_terminator(&line);
            let rendered = template.substitute(content);
            self.out.write_all(&rendered).await?;
            self.written += rendered.len() as u64;
        }
    }

    async fn write_binary(&mut self, mut file: File) -> ServeResult<()> {
        let mut chunk = vec![0u8; COPY_CHUNK];

        loop {
            let n = file
                .read(&mut chunk)
                .await
                .map_err(ServeError::HeaderCommitted)?;
            if n == 0 {
                return Ok(());
            }

            self.out.write_all(&chunk[..n]).await?;
            self.written += n as u64;
        }
    }

    /// Flushes buffered bytes and shuts down the write side.
    pub async fn shutdown(&mut self) -> std::io::Result<()> {
        self.out.shutdown().await
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

fn strip_terminator(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
