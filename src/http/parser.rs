use bytes::{Buf, BytesMut};
use httparse::Status;
use thiserror::Error;
use tracing::trace;

use crate::http::request::ParsedRequest;

const MAX_HEADERS: usize = 64;
/// Largest request line plus header block accepted, in bytes.
pub const MAX_HEAD_SIZE: usize = 80 * 1024;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("too many headers, at most {max} are accepted")]
    TooManyHeaders { max: usize },

    #[error("request head exceeds {max} bytes")]
    HeadTooLarge { max: usize },

    #[error("malformed request: {source}")]
    Malformed {
        #[source]
        source: httparse::Error,
    },
}

impl From<httparse::Error> for ParseError {
    fn from(source: httparse::Error) -> Self {
        match source {
            httparse::Error::TooManyHeaders => ParseError::TooManyHeaders { max: MAX_HEADERS },
            _ => ParseError::Malformed { source },
        }
    }
}

/// Incremental request-line and header parser.
///
/// Bytes are fed in arrival order; the parser keeps whatever has not been
/// consumed yet between calls. Body bytes are left in the buffer untouched.
#[derive(Debug, Default)]
pub struct RequestParser {
    buffer: BytesMut,
}

impl RequestParser {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(4096),
        }
    }

    /// Appends `data` and tries to complete a request.
    ///
    /// Returns `Ok(Some(_))` exactly once per request, when the header block
    /// is terminated. The bytes of that request are dropped, so a further
    /// feed starts on the next request.
    pub fn feed(&mut self, data: &[u8]) -> Result<Option<ParsedRequest>, ParseError> {
        self.buffer.extend_from_slice(data);

        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut req = httparse::Request::new(&mut headers);

        match req.parse(&self.buffer)? {
            Status::Complete(consumed) => {
                let request = ParsedRequest {
                    method: req.method.unwrap_or_default().to_string(),
                    target: req.path.unwrap_or_default().to_string(),
                    version: req.version.unwrap_or(1),
                    headers: req
                        .headers
                        .iter()
                        .map(|h| {
                            (
                                h.name.to_string(),
                                String::from_utf8_lossy(h.value).into_owned(),
                            )
                        })
                        .collect(),
                };
                trace!(consumed, "request head complete");
                self.buffer.advance(consumed);
                Ok(Some(request))
            }
            Status::Partial if self.buffer.len() > MAX_HEAD_SIZE => {
                Err(ParseError::HeadTooLarge { max: MAX_HEAD_SIZE })
            }
            Status::Partial => Ok(None),
        }
    }

    /// Number of bytes received but not yet part of a completed request.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}
