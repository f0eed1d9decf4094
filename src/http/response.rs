//! HTTP/1.1 response value and encoder.
//!
//! Handlers build a [`Response`] with a status, optional headers, and a body. The
//! framing headers are added by [`Response::into_bytes`], never by handlers.

use bytes::{BufMut, BytesMut};

use super::{CRLF, Headers, StatusCode};

/// `Content-Type` applied when a handler did not set one.
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// An HTTP/1.1 response, ready to be serialized and sent.
///
/// # Examples
///
/// ```
/// use courier::http::{Response, StatusCode};
///
/// let response = Response::new(StatusCode::Ok).body("abc");
///
/// let bytes = response.into_bytes();
/// let text = std::str::from_utf8(&bytes).unwrap();
/// assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
/// assert!(text.contains("Content-Type: text/plain\r\n"));
/// assert!(text.contains("Content-Length: 3\r\n"));
/// assert!(text.ends_with("\r\n\r\nabc"));
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    /// Creates a new response with the given status, no headers, and an empty body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    /// Sets a response header, replacing an existing entry with the same name.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the response body from a string.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into().into_bytes();
        self
    }

    /// Sets the response body from raw bytes.
    #[must_use]
    pub fn body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the status code of this response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers set so far (framing headers are not included).
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the body bytes.
    pub fn body_ref(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the response into the exact bytes written to the peer.
    ///
    /// Guarantees exactly one `Content-Type` (defaulting to `text/plain`) and exactly
    /// one `Content-Length` equal to the body length. Any caller-set `Content-Length`
    /// is discarded. No chunking and no trailing separator after the body.
    pub fn into_bytes(mut self) -> BytesMut {
        // The last Content-Type set wins, whatever its case.
        let (type_name, type_value) = self
            .headers
            .last_ignore_case("Content-Type")
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .unwrap_or_else(|| ("Content-Type".to_owned(), DEFAULT_CONTENT_TYPE.to_owned()));
        self.headers.remove_ignore_case("Content-Type");
        self.headers.insert(type_name, type_value);

        self.headers.remove_ignore_case("Content-Length");
        self.headers
            .insert("Content-Length", self.body.len().to_string());

        let estimated_size = 64 + self.headers.len() * 48 + self.body.len();
        let mut buf = BytesMut::with_capacity(estimated_size);

        // Status line
        buf.put(format!("HTTP/1.1 {}{CRLF}", self.status).as_bytes());

        // Headers
        buf.put(self.headers.to_string().as_bytes());

        // Header/body separator
        buf.put(CRLF.as_bytes());

        buf.put(self.body.as_slice());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string(bytes: BytesMut) -> String {
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn count_header(text: &str, name: &str) -> usize {
        let prefix = format!("{}:", name.to_ascii_lowercase());
        text.split("\r\n\r\n")
            .next()
            .unwrap()
            .split("\r\n")
            .filter(|line| line.to_ascii_lowercase().starts_with(&prefix))
            .count()
    }

    #[test]
    fn empty_ok_response() {
        let s = to_string(Response::new(StatusCode::Ok).into_bytes());
        assert!(s.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(s.contains("Content-Type: text/plain\r\n"));
        assert!(s.contains("Content-Length: 0\r\n"));
        assert!(s.ends_with("\r\n\r\n"));
    }

    #[test]
    fn body_length_is_byte_length() {
        let s = to_string(Response::new(StatusCode::Ok).body("héllo").into_bytes());
        assert!(s.contains("Content-Length: 6\r\n"));
        assert!(s.ends_with("\r\n\r\nhéllo"));
    }

    #[test]
    fn caller_content_type_is_kept() {
        let r = Response::new(StatusCode::Ok)
            .header("Content-Type", "application/octet-stream")
            .body_bytes(vec![1, 2, 3]);
        let bytes = r.into_bytes();
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("Content-Type: application/octet-stream\r\n"));
        assert!(!text.contains("text/plain"));
        assert_eq!(count_header(&text, "Content-Type"), 1);
        assert!(bytes.ends_with(&[1, 2, 3]));
    }

    #[test]
    fn caller_content_length_is_overwritten() {
        let r = Response::new(StatusCode::Ok)
            .header("content-length", "999")
            .body("ab");
        let s = to_string(r.into_bytes());
        assert_eq!(count_header(&s, "Content-Length"), 1);
        assert!(s.contains("Content-Length: 2\r\n"));
        assert!(!s.contains("999"));
    }

    #[test]
    fn lowercase_content_type_counts_as_set() {
        let r = Response::new(StatusCode::Ok).header("content-type", "text/html");
        let s = to_string(r.into_bytes());
        assert_eq!(count_header(&s, "Content-Type"), 1);
        assert!(s.contains("content-type: text/html\r\n"));
    }

    #[test]
    fn differently_cased_content_types_collapse_to_last() {
        let r = Response::new(StatusCode::Ok)
            .header("content-type", "text/html")
            .header("Content-Type", "application/json")
            .body("x");
        let s = to_string(r.into_bytes());
        assert_eq!(count_header(&s, "Content-Type"), 1);
        assert!(s.contains("Content-Type: application/json\r\n"));
        assert!(!s.contains("text/html"));
        assert!(s.ends_with("\r\n\r\nx"));
    }

    #[test]
    fn status_lines() {
        let created = to_string(Response::new(StatusCode::Created).into_bytes());
        assert!(created.starts_with("HTTP/1.1 201 Created\r\n"));
        let missing = to_string(Response::new(StatusCode::NotFound).into_bytes());
        assert!(missing.starts_with("HTTP/1.1 404 Not Found\r\n"));
    }
}
