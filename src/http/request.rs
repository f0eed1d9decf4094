//! HTTP/1.1 request decoding.
//!
//! The decoder works on exactly the bytes captured by one socket read. There is no
//! `Content-Length` framing: whatever follows the first blank line is the body.

use std::str;

use bytes::Bytes;
use thiserror::Error;

use super::{CRLF, HEADER_TERMINATOR, Headers, Method};

/// Errors that can occur while decoding a request buffer.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request buffer is empty")]
    EmptyRequest,

    #[error("request line must contain a method and a path")]
    MalformedRequestLine,

    #[error("header line is missing the \": \" separator: {line:?}")]
    InvalidHeader { line: String },

    #[error("request head is not valid UTF-8: {0}")]
    Utf8(#[from] str::Utf8Error),
}

/// A decoded HTTP request.
///
/// Created once per connection by [`Request::decode`] and never mutated afterwards.
/// The path is kept exactly as received: no dot-segment resolution and no query
/// stripping.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use courier::http::{Method, Request};
///
/// let raw = Bytes::from_static(b"POST /files/a.txt HTTP/1.1\r\nUser-Agent: curl/7.6\r\n\r\nHello");
/// let request = Request::decode(raw).unwrap();
///
/// assert_eq!(request.method(), &Method::Post);
/// assert_eq!(request.path(), "/files/a.txt");
/// assert_eq!(request.headers().get("User-Agent"), Some("curl/7.6"));
/// assert_eq!(&request.body()[..], b"Hello");
/// ```
#[derive(Debug)]
pub struct Request {
    method: Method,
    path: String,
    headers: Headers,
    body: Bytes,
}

impl Request {
    /// Decodes a raw request buffer.
    ///
    /// The head (request line and headers) must be UTF-8; the body is kept as raw
    /// bytes sliced out of `buf` without copying. When the buffer holds no blank
    /// line separator, every line after the request line is read as a header and
    /// the body is empty.
    ///
    /// # Errors
    ///
    /// - [`RequestError::EmptyRequest`]: `buf` has no bytes at all.
    /// - [`RequestError::MalformedRequestLine`]: fewer than two tokens on the first line.
    /// - [`RequestError::InvalidHeader`]: a non-empty header line without `": "`.
    /// - [`RequestError::Utf8`]: the head is not valid UTF-8.
    pub fn decode(buf: Bytes) -> Result<Self, RequestError> {
        if buf.is_empty() {
            return Err(RequestError::EmptyRequest);
        }

        let (head_end, body) = match find_subslice(&buf, HEADER_TERMINATOR) {
            Some(pos) => (pos, buf.slice(pos + HEADER_TERMINATOR.len()..)),
            None => (buf.len(), Bytes::new()),
        };
        let head = str::from_utf8(&buf[..head_end])?;

        let mut lines = head.split(CRLF);
        let mut tokens = lines.next().unwrap_or_default().split_whitespace();
        let (Some(method), Some(path)) = (tokens.next(), tokens.next()) else {
            return Err(RequestError::MalformedRequestLine);
        };
        // The protocol version token, if any, is ignored.

        let mut headers = Headers::new();
        for line in lines {
            if line.is_empty() {
                break;
            }
            let (name, value) = line
                .split_once(": ")
                .ok_or_else(|| RequestError::InvalidHeader {
                    line: line.to_owned(),
                })?;
            headers.insert(name, value);
        }

        let method = match method.parse::<Method>() {
            Ok(m) => m,
            Err(never) => match never {},
        };

        Ok(Self {
            method,
            path: path.to_owned(),
            headers,
            body,
        })
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request path exactly as received.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the request body bytes (empty when absent).
    pub fn body(&self) -> &Bytes {
        &self.body
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
