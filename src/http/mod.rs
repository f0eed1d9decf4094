//! HTTP/1.1 protocol types and the wire codec.
//!
//! This module provides the primitives the server speaks:
//! [`Method`], [`StatusCode`], [`Headers`], [`Request`] (decode side), and
//! [`Response`] (encode side).

use std::fmt;

pub mod headers;
pub mod request;
pub mod response;

pub use headers::Headers;
pub use request::{Request, RequestError};
pub use response::Response;

/// Line separator used by HTTP/1.1 framing.
pub const CRLF: &str = "\r\n";

/// Separator between the header block and the body.
pub const HEADER_TERMINATOR: &[u8] = b"\r\n\r\n";

/// An HTTP response status code.
///
/// Only the codes this server can emit are represented. The [`Display`](fmt::Display)
/// form is the status-line text, e.g. `200 OK`.
///
/// # Examples
///
/// ```
/// use courier::http::StatusCode;
///
/// let status = StatusCode::Created;
/// assert_eq!(status.as_u16(), 201);
/// assert_eq!(status.to_string(), "201 Created");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum StatusCode {
    // 2xx Success
    Ok = 200,
    Created = 201,

    // 4xx Client Error
    BadRequest = 400,
    NotFound = 404,

    // 5xx Server Error
    InternalServerError = 500,
}

impl StatusCode {
    /// Returns the numeric status code as a `u16`.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the canonical reason phrase for this status code.
    pub fn canonical_reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Created => "Created",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.canonical_reason())
    }
}

/// An HTTP request method.
///
/// Any token is accepted syntactically. Tokens other than the standard methods are
/// captured in [`Method::Custom`]; they decode fine but never match a route.
///
/// # Examples
///
/// ```
/// use courier::http::Method;
///
/// let method: Method = "POST".parse().unwrap();
/// assert_eq!(method, Method::Post);
///
/// let odd: Method = "BREW".parse().unwrap();
/// assert_eq!(odd.as_str(), "BREW");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    /// A non-standard extension method, kept verbatim (case-sensitive).
    Custom(String),
}

impl Method {
    /// Returns the method as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Custom(s) => s.as_str(),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Method {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "OPTIONS" => Self::Options,
            "PATCH" => Self::Patch,
            other => Self::Custom(other.to_owned()),
        })
    }
}
