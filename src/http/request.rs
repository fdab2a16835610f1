use std::collections::HashSet;
use std::fmt;

/// HTTP request methods.
///
/// Only the three methods the server implements are representable. An
/// unrecognized method token never produces a `Request`; the parser stops
/// with an error that maps to 501 Not Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET - Retrieve a resource
    Get,
    /// HEAD - Like GET but without the response body
    Head,
    /// POST - Submit data; the body is handed to CGI scripts
    Post,
}

impl Method {
    /// Parses an HTTP method token, case-insensitively.
    ///
    /// # Example
    ///
    /// ```
    /// # use steward::http::request::Method;
    /// assert_eq!(Method::from_token("GET"), Some(Method::Get));
    /// assert_eq!(Method::from_token("get"), Some(Method::Get));
    /// assert_eq!(Method::from_token("DELETE"), None);
    /// ```
    pub fn from_token(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("GET") {
            Some(Method::Get)
        } else if s.eq_ignore_ascii_case("HEAD") {
            Some(Method::Head)
        } else if s.eq_ignore_ascii_case("POST") {
            Some(Method::Post)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
        }
    }

    /// Whether a response to this method carries a body. HEAD runs the
    /// full pipeline but the body write is skipped.
    pub fn wants_body(&self) -> bool {
        !matches!(self, Method::Head)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a parsed HTTP request from a client.
///
/// Immutable once built. The recognized headers get their own fields; the
/// conditional slots are `None` unless the header appeared in this exact
/// request. Everything unrecognized is dropped at parse time, except
/// media-type tokens which land in `accepts`.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    /// Request path with the query string already split off, forward
    /// slashes, as sent by the client.
    pub path: String,
    /// Query component, the part after the last `?`. Empty when absent.
    pub query: String,
    /// HTTP version token, e.g. "HTTP/1.0".
    pub version: String,
    /// Effective host: the Host header, or the authority of an
    /// absolute-form request target, which takes precedence.
    pub host: Option<String>,
    pub from: Option<String>,
    pub user_agent: Option<String>,
    pub connection: Option<String>,
    pub if_modified_since: Option<String>,
    pub if_unmodified_since: Option<String>,
    /// Media types the client announced it accepts.
    pub accepts: HashSet<String>,
    /// Request body, kept only for POST.
    pub body: Option<Vec<u8>>,
}

/// Builder for constructing Request objects.
pub struct RequestBuilder {
    method: Method,
    path: String,
    query: String,
    version: String,
    host: Option<String>,
    from: Option<String>,
    user_agent: Option<String>,
    connection: Option<String>,
    if_modified_since: Option<String>,
    if_unmodified_since: Option<String>,
    accepts: HashSet<String>,
    body: Option<Vec<u8>>,
}

impl RequestBuilder {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: String::new(),
            version: "HTTP/1.0".to_string(),
            host: None,
            from: None,
            user_agent: None,
            connection: None,
            if_modified_since: None,
            if_unmodified_since: None,
            accepts: HashSet::new(),
            body: None,
        }
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn from_addr(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn connection(mut self, connection: impl Into<String>) -> Self {
        self.connection = Some(connection.into());
        self
    }

    pub fn if_modified_since(mut self, date: impl Into<String>) -> Self {
        self.if_modified_since = Some(date.into());
        self
    }

    pub fn if_unmodified_since(mut self, date: impl Into<String>) -> Self {
        self.if_unmodified_since = Some(date.into());
        self
    }

    pub fn accept(mut self, media_type: impl Into<String>) -> Self {
        self.accepts.insert(media_type.into());
        self
    }

    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Request {
        Request {
            method: self.method,
            path: self.path,
            query: self.query,
            version: self.version,
            host: self.host,
            from: self.from,
            user_agent: self.user_agent,
            connection: self.connection,
            if_modified_since: self.if_modified_since,
            if_unmodified_since: self.if_unmodified_since,
            accepts: self.accepts,
            body: self.body,
        }
    }
}

impl Request {
    pub fn builder(method: Method, path: impl Into<String>) -> RequestBuilder {
        RequestBuilder::new(method, path)
    }

    /// Whether the client announced it accepts the given media type.
    pub fn accepts(&self, media_type: &str) -> bool {
        self.accepts.contains(media_type)
    }
}
