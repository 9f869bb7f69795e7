use std::fmt;

use bytes::Bytes;

/// Reason phrases known to the server. Codes missing here render with an
/// empty reason.
static REASONS: &[(u16, &str)] = &[(200, "OK"), (404, "Not found")];

/// Looks up the reason phrase for `status`.
///
/// # Example
///
/// ```
/// # use tube::http::response::reason_phrase;
/// assert_eq!(reason_phrase(200), Some("OK"));
/// assert_eq!(reason_phrase(404), Some("Not found"));
/// assert_eq!(reason_phrase(500), None);
/// ```
pub fn reason_phrase(status: u16) -> Option<&'static str> {
    REASONS
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, reason)| *reason)
}

type Chunks = Box<dyn Iterator<Item = Bytes> + Send>;
type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Response body: a finite sequence of byte chunks with an optional
/// release hook.
///
/// The hook runs exactly once, either from [`Body::close`] or when the body
/// is dropped without being closed.
pub struct Body {
    chunks: Chunks,
    on_close: Option<ReleaseHook>,
}

impl Body {
    pub fn empty() -> Self {
        Self::from_chunks(Vec::<Bytes>::new())
    }

    pub fn from_chunks<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        I::IntoIter: Send + 'static,
        B: Into<Bytes> + 'static,
    {
        Self {
            chunks: Box::new(chunks.into_iter().map(Into::<Bytes>::into)),
            on_close: None,
        }
    }

    /// Registers the release operation run once the body has been written.
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub fn has_release(&self) -> bool {
        self.on_close.is_some()
    }

    /// Runs the release hook, if any. Remaining chunks are discarded.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(hook) = self.on_close.take() {
            hook();
        }
    }
}

impl Iterator for Body {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.chunks.next()
    }
}

impl Drop for Body {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("has_release", &self.has_release())
            .finish_non_exhaustive()
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Body::from_chunks([Bytes::from_static(s.as_bytes())])
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::from_chunks([Bytes::from(s)])
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body::from_chunks([Bytes::from(v)])
    }
}

/// Result of one application call: status, ordered headers and body.
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl Response {
    /// Creates a response exactly as given; no headers are added.
    pub fn new(status: u16, headers: Vec<(String, String)>, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a simple 200 OK plain-text response.
    pub fn ok(body: impl Into<String>) -> Self {
        let body: String = body.into();
        ResponseBuilder::new(200)
            .header("Content-Type", "text/plain")
            .body(body)
            .build()
    }

    /// Creates a 404 Not found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(404)
            .header("Content-Type", "text/plain")
            .body("Not found\n")
            .build()
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }
}

/// Builder for constructing responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(200)
///     .header("Content-Type", "application/json")
///     .body("{}")
///     .build();
/// ```
pub struct ResponseBuilder {
    status: u16,
    headers: Vec<(String, String)>,
    chunks: Vec<Bytes>,
    on_close: Option<ReleaseHook>,
}

impl ResponseBuilder {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            chunks: Vec::new(),
            on_close: None,
        }
    }

    /// Adds a header, replacing an earlier one with the same name.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(&key))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((key, value)),
        }
        self
    }

    /// Replaces the body with a single chunk.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.chunks = vec![body.into()];
        self
    }

    /// Appends a body chunk.
    pub fn chunk(mut self, chunk: impl Into<Bytes>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_close = Some(Box::new(hook));
        self
    }

    /// Builds the final Response.
    ///
    /// Adds `Content-Length` from the body size unless already present.
    pub fn build(mut self) -> Response {
        if !self
            .headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        {
            let length: usize = self.chunks.iter().map(Bytes::len).sum();
            self.headers
                .push(("Content-Length".to_string(), length.to_string()));
        }

        let mut body = Body::from_chunks(self.chunks);
        body.on_close = self.on_close;

        Response {
            status: self.status,
            headers: self.headers,
            body,
        }
    }
}
