/// Represents a request line plus header block parsed from a client.
///
/// Built by [`RequestParser`](crate::http::parser::RequestParser) once the
/// header block is complete. The body is never read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// The HTTP method exactly as sent (e.g. "GET")
    pub method: String,
    /// The request target (e.g. "/search?q=rust")
    pub target: String,
    /// Minor HTTP version (0 for HTTP/1.0, 1 for HTTP/1.1)
    pub version: u8,
    /// Request headers in arrival order, names as received.
    ///
    /// Values are decoded lossily: bytes that are not valid UTF-8 (obs-text)
    /// become U+FFFD.
    pub headers: Vec<(String, String)>,
}

/// Builder for constructing ParsedRequest objects.
pub struct RequestBuilder {
    method: Option<String>,
    target: Option<String>,
    version: u8,
    headers: Vec<(String, String)>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self {
            method: None,
            target: None,
            version: 1,
            headers: Vec::new(),
        }
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn version(mut self, version: u8) -> Self {
        self.version = version;
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<ParsedRequest, &'static str> {
        Ok(ParsedRequest {
            method: self.method.ok_or("method missing")?,
            target: self.target.ok_or("target missing")?,
            version: self.version,
            headers: self.headers,
        })
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ParsedRequest {
    /// Retrieves a header value by name, ignoring ASCII case.
    ///
    /// When a header was sent more than once the last occurrence is returned.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    /// Returns the request line as it would appear on the wire, without CRLF.
    pub fn request_line(&self) -> String {
        format!("{} {} HTTP/1.{}", self.method, self.target, self.version)
    }
}
