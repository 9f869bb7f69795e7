use std::io::Write;

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::{Body, Response, reason_phrase};

const HTTP_VERSION: &str = "HTTP/1.1";

/// Serializes everything that precedes the body.
///
/// The status line is followed by an empty line, then the headers, then a
/// second empty line. Clients of this server rely on that layout.
pub fn encode_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::with_capacity(64 + resp.headers.len() * 32);

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status,
        reason_phrase(resp.status).unwrap_or_default()
    );
    buf.extend_from_slice(status_line.as_bytes());
    buf.extend_from_slice(b"\r\n");

    // Headers
    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Writes one response and releases its body.
///
/// The body is drained chunk by chunk in order; nothing is appended after
/// the last chunk. The body's release hook runs once the last chunk is out,
/// or on drop if a write fails first.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: Body,
}

impl ResponseWriter {
    pub fn new(response: Response) -> Self {
        Self {
            head: encode_head(&response),
            body: response.body,
        }
    }

    /// Returns the number of bytes written.
    pub fn write_to<W: Write>(self, stream: &mut W) -> std::io::Result<usize> {
        let Self { head, mut body } = self;

        stream.write_all(&head)?;
        let mut written = head.len();

        for chunk in body.by_ref() {
            stream.write_all(&chunk)?;
            written += chunk.len();
        }
        stream.flush()?;

        body.close();
        Ok(written)
    }

    /// Async twin of [`write_to`](Self::write_to) for non-blocking sockets.
    pub async fn write_to_stream<W>(self, stream: &mut W) -> std::io::Result<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let Self { head, mut body } = self;

        stream.write_all(&head).await?;
        let mut written = head.len();

        for chunk in body.by_ref() {
            stream.write_all(&chunk).await?;
            written += chunk.len();
        }
        stream.flush().await?;

        body.close();
        Ok(written)
    }
}
