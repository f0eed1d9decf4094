//! Route handlers.
//!
//! Every handler turns its input into a [`Response`]; failures are recovered here
//! and never propagate to the connection task.

use tracing::{debug, error};

use crate::http::{Request, Response, StatusCode};
use crate::store::FileStore;

/// Path prefix stripped by [`echo`].
pub const ECHO_PREFIX: &str = "/echo/";

/// Path prefix stripped by [`read_file`] and [`write_file`].
pub const FILES_PREFIX: &str = "/files/";

/// `Content-Type` of a successful file read.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Echoes the path after `/echo/` back as the body.
///
/// A path without the exact `/echo/` prefix (e.g. `/echo` or `/echo-x`) is
/// echoed whole.
pub fn echo(path: &str) -> Response {
    let content = path.strip_prefix(ECHO_PREFIX).unwrap_or(path);
    Response::new(StatusCode::Ok).body(content)
}

/// Reflects the `User-Agent` header (exact case), or an empty body if absent.
pub fn user_agent(request: &Request) -> Response {
    let agent = request.headers().get("User-Agent").unwrap_or_default();
    Response::new(StatusCode::Ok).body(agent)
}

/// Serves the named file as `application/octet-stream`.
///
/// Every read failure collapses to `404 Not Found`.
pub async fn read_file<S: FileStore>(store: &S, path: &str) -> Response {
    let name = file_name(path);
    match store.read(name).await {
        Ok(contents) => Response::new(StatusCode::Ok)
            .header("Content-Type", OCTET_STREAM)
            .body_bytes(contents),
        Err(e) => {
            debug!(file = name, error = %e, "file read failed");
            Response::new(StatusCode::NotFound)
        }
    }
}

/// Stores the request body under the named file.
///
/// Every write failure collapses to `500 Internal Server Error`.
pub async fn write_file<S: FileStore>(store: &S, request: &Request) -> Response {
    let name = file_name(request.path());
    match store.write(name, request.body()).await {
        Ok(()) => Response::new(StatusCode::Created),
        Err(e) => {
            error!(file = name, error = %e, "file write failed");
            Response::new(StatusCode::InternalServerError)
        }
    }
}

fn file_name(path: &str) -> &str {
    path.strip_prefix(FILES_PREFIX).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::store::MemoryStore;

    fn request(raw: &'static [u8]) -> Request {
        Request::decode(Bytes::from_static(raw)).unwrap()
    }

    #[test]
    fn echo_strips_prefix() {
        let res = echo("/echo/abc");
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.body_ref(), b"abc");
    }

    #[test]
    fn echo_keeps_nested_segments() {
        assert_eq!(echo("/echo/a/b%20c").body_ref(), b"a/b%20c");
    }

    #[test]
    fn echo_without_slash_returns_path() {
        assert_eq!(echo("/echo").body_ref(), b"/echo");
        assert_eq!(echo("/echo-x").body_ref(), b"/echo-x");
    }

    #[test]
    fn user_agent_reflected() {
        let res = user_agent(&request(
            b"GET /user-agent HTTP/1.1\r\nUser-Agent: curl/7.6\r\n\r\n",
        ));
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.body_ref(), b"curl/7.6");
    }

    #[test]
    fn user_agent_lookup_is_exact_case() {
        let res = user_agent(&request(
            b"GET /user-agent HTTP/1.1\r\nuser-agent: curl/7.6\r\n\r\n",
        ));
        assert_eq!(res.status(), StatusCode::Ok);
        assert!(res.body_ref().is_empty());
    }

    #[tokio::test]
    async fn read_file_found() {
        let store = MemoryStore::new();
        store.write("test.txt", b"Hello").await.unwrap();

        let res = read_file(&store, "/files/test.txt").await;
        assert_eq!(res.status(), StatusCode::Ok);
        assert_eq!(res.headers().get("Content-Type"), Some(OCTET_STREAM));
        assert_eq!(res.body_ref(), b"Hello");
    }

    #[tokio::test]
    async fn read_file_missing_is_404() {
        let res = read_file(&MemoryStore::new(), "/files/missing.txt").await;
        assert_eq!(res.status(), StatusCode::NotFound);
        assert!(res.body_ref().is_empty());
        assert!(res.headers().is_empty());
    }

    #[tokio::test]
    async fn write_file_stores_body() {
        let store = MemoryStore::new();
        let res = write_file(
            &store,
            &request(b"POST /files/test.txt HTTP/1.1\r\n\r\nHello"),
        )
        .await;
        assert_eq!(res.status(), StatusCode::Created);
        assert!(res.body_ref().is_empty());
        assert_eq!(store.read("test.txt").await.unwrap(), b"Hello");
    }

    #[tokio::test]
    async fn write_file_failure_is_500() {
        let root = std::env::temp_dir().join(format!("courier-missing-{}", std::process::id()));
        let store = crate::store::DirStore::new(root.join("nested"));
        let res = write_file(&store, &request(b"POST /files/a.txt HTTP/1.1\r\n\r\nx")).await;
        assert_eq!(res.status(), StatusCode::InternalServerError);
        assert!(res.body_ref().is_empty());
    }
}
