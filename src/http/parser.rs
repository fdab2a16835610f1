//! Wire parsing of raw request bytes.
//!
//! The header section is scanned as a whitespace token stream against the
//! small set of headers the server acts on; everything else is skipped.
//! Incomplete input is a distinct error so the connection handler knows to
//! keep reading rather than fail.

use crate::http::request::{Method, Request};

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    /// More bytes are needed before a verdict is possible.
    Incomplete,
    /// Method token is not GET, HEAD or POST. Maps to 501.
    UnsupportedMethod,
    /// HTTP/1.1 request without a Host header. Maps to 400.
    MissingHost,
    /// Anything else that cannot be made sense of. Maps to 501.
    Malformed,
}

pub fn parse_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    // Look for the header/body separator first
    let (head_end, sep_len) = find_head_end(buf).ok_or(ParseError::Incomplete)?;

    let head = std::str::from_utf8(&buf[..head_end]).map_err(|_| ParseError::Malformed)?;

    let (request_line, header_section) = match head.split_once('\n') {
        Some((line, rest)) => (line.trim_end_matches('\r'), rest),
        None => (head, ""),
    };

    // Request line: the method is validated before anything else is
    // looked at. An unsupported method stops the parse cold.
    let mut line_tokens = request_line.split_whitespace();
    let method_token = line_tokens.next().ok_or(ParseError::Malformed)?;
    let method = Method::from_token(method_token).ok_or(ParseError::UnsupportedMethod)?;
    let target = line_tokens.next().ok_or(ParseError::Malformed)?.to_string();
    let version = line_tokens.next().ok_or(ParseError::Malformed)?.to_string();

    let mut host: Option<String> = None;
    let mut from: Option<String> = None;
    let mut user_agent: Option<String> = None;
    let mut connection: Option<String> = None;
    let mut if_modified_since: Option<String> = None;
    let mut if_unmodified_since: Option<String> = None;
    let mut accepts = std::collections::HashSet::new();
    let mut content_length: Option<usize> = None;

    let mut tokens = header_section.split_whitespace().peekable();
    while let Some(tok) = tokens.next() {
        if tok.eq_ignore_ascii_case("Host:") {
            host = tokens.next().map(str::to_string);
        } else if tok.eq_ignore_ascii_case("From:") {
            from = tokens.next().map(str::to_string);
        } else if tok.eq_ignore_ascii_case("User-Agent:") {
            // Multi-token value: runs until the next token that looks
            // like a header name.
            let mut agent = String::new();
            while let Some(&next) = tokens.peek() {
                if next.contains(':') {
                    break;
                }
                if !agent.is_empty() {
                    agent.push(' ');
                }
                agent.push_str(next);
                tokens.next();
            }
            if !agent.is_empty() {
                user_agent = Some(agent);
            }
        } else if tok.eq_ignore_ascii_case("Connection:") {
            connection = tokens.next().map(str::to_string);
        } else if tok.eq_ignore_ascii_case("If-Modified-Since:") {
            if_modified_since = collect_date_tokens(&mut tokens);
        } else if tok.eq_ignore_ascii_case("If-Unmodified-Since:") {
            if_unmodified_since = collect_date_tokens(&mut tokens);
        } else if tok.eq_ignore_ascii_case("Content-Length:") {
            content_length = tokens.next().and_then(|v| v.parse().ok());
        } else if !tok.contains(':') && tok.contains('/') {
            // A bare token with a slash is a media type from an Accept
            // list. A trailing list comma is stripped.
            let media = tok.strip_suffix(',').unwrap_or(tok);
            accepts.insert(media.to_string());
        }
    }

    if version.eq_ignore_ascii_case("HTTP/1.1") && host.is_none() {
        return Err(ParseError::MissingHost);
    }

    // Absolute-form target: the authority overrides the Host header and
    // the path continues after it. Clients of any HTTP version may send
    // these, so they are always accepted.
    let target = if target.starts_with("http://") {
        let parsed = url::Url::parse(&target).map_err(|_| ParseError::Malformed)?;
        let authority = match (parsed.host_str(), parsed.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => return Err(ParseError::Malformed),
        };
        host = Some(authority);

        let after_scheme = &target["http://".len()..];
        match after_scheme.find('/') {
            Some(idx) => after_scheme[idx..].to_string(),
            None => "/".to_string(),
        }
    } else {
        target
    };

    // Query component: everything after the last '?'
    let (path, query) = match target.rfind('?') {
        Some(idx) => (target[..idx].to_string(), target[idx + 1..].to_string()),
        None => (target, String::new()),
    };

    // Body framing. Only POST keeps its body; a declared Content-Length
    // extends the wait until all of it has arrived.
    let body_start = head_end + sep_len;
    let available = buf.len() - body_start;

    let body = if method == Method::Post {
        match content_length {
            Some(declared) => {
                if available < declared {
                    return Err(ParseError::Incomplete);
                }
                Some(buf[body_start..body_start + declared].to_vec())
            }
            None => Some(buf[body_start..].to_vec()),
        }
    } else {
        None
    };

    let consumed = body_start + body.as_ref().map_or(0, |b| b.len());

    let request = Request {
        method,
        path,
        query,
        version,
        host,
        from,
        user_agent,
        connection,
        if_modified_since,
        if_unmodified_since,
        accepts,
        body,
    };

    Ok((request, consumed))
}

/// Finds the end of the header section. Returns the offset of the blank
/// line and the separator length, accepting both CRLF and bare LF forms.
fn find_head_end(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");

    match (crlf, lf) {
        (Some(c), Some(l)) if l + 1 < c => Some((l, 2)),
        (Some(c), _) => Some((c, 4)),
        (None, Some(l)) => Some((l, 2)),
        (None, None) => None,
    }
}

/// Collects the value of an If-Modified-Since / If-Unmodified-Since
/// header. The three date formats tokenize to different widths, told
/// apart by the shape of the first token: `Sun,` means the long form with
/// five more tokens, a longer word like `Sunday,` means the dashed form
/// with three more, and a bare weekday means asctime with four more.
fn collect_date_tokens<'a, I>(tokens: &mut I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let first = tokens.next()?;

    let extra = if first.as_bytes().get(3) == Some(&b',') {
        5
    } else if first.len() > 3 {
        3
    } else {
        4
    };

    let mut value = first.to_string();
    for _ in 0..extra {
        let tok = tokens.next()?;
        value.push(' ');
        value.push_str(tok);
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_get() {
        let req = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";

        let (parsed, consumed) = parse_request(req).unwrap();

        assert_eq!(parsed.path, "/");
        assert_eq!(parsed.host.as_deref(), Some("example.com"));
        assert_eq!(consumed, req.len());
    }

    #[test]
    fn head_end_handles_both_separators() {
        assert_eq!(find_head_end(b"GET / HTTP/1.0\n\nrest"), Some((14, 2)));
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n\r\n"), Some((14, 4)));
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n"), None);
    }
}
