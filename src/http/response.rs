use crate::http::date;

/// Represents a complete HTTP response ready to be serialized.
///
/// Headers are kept as ordered pairs so identical requests serialize to
/// identical bytes, apart from the `Date` value. Two flags adjust the
/// frame shape: `include_body` is cleared for HEAD requests and 304
/// responses, and `close_headers` is cleared for CGI output where the
/// script completes the header block itself.
#[derive(Debug)]
pub struct Response {
    /// Version token echoed from the request, e.g. "HTTP/1.0".
    pub version: String,
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub include_body: bool,
    pub close_headers: bool,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new("HTTP/1.0", 200, "OK")
///     .standard_headers("Steward")
///     .header("Content-Type", "text/html")
///     .body(page.into_bytes())
///     .build();
/// ```
pub struct ResponseBuilder {
    version: String,
    status: u16,
    reason: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
    include_body: bool,
    close_headers: bool,
}

impl ResponseBuilder {
    pub fn new(version: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Vec::new(),
            include_body: true,
            close_headers: true,
        }
    }

    /// Appends the headers every response carries: `Server`,
    /// `Connection: close` and the current `Date`.
    pub fn standard_headers(self, server_name: &str) -> Self {
        self.header("Server", server_name)
            .header("Connection", "close")
            .header("Date", date::format_http_date(std::time::SystemTime::now()))
    }

    /// Appends a header. Order of calls is the order on the wire.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    /// Suppresses the body write while keeping all headers, for HEAD
    /// requests and 304 responses.
    pub fn without_body(mut self) -> Self {
        self.include_body = false;
        self
    }

    /// Leaves the header block unterminated; the body is expected to
    /// carry the remaining headers and the blank line.
    pub fn open_headers(mut self) -> Self {
        self.close_headers = false;
        self
    }

    pub fn build(self) -> Response {
        Response {
            version: self.version,
            status: self.status,
            reason: self.reason,
            headers: self.headers,
            body: self.body,
            include_body: self.include_body,
            close_headers: self.close_headers,
        }
    }
}

impl Response {
    pub fn builder(version: impl Into<String>, status: u16, reason: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder::new(version, status, reason)
    }

    /// Looks up a header value by name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}
