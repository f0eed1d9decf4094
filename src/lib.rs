//! # courier
//!
//! A minimal HTTP/1.1 server. Every connection carries exactly one request:
//! the server reads once, decodes, routes to a fixed handler, writes the
//! response, and closes.
//!
//! Routes:
//!
//! - `GET /echo/<text>`: responds with `<text>`.
//! - `GET /user-agent`: responds with the request's `User-Agent` header.
//! - `GET /files/<name>`: serves a file from the store.
//! - `POST /files/<name>`: stores the request body as a file.
//! - `/`: empty `200 OK`; anything else is `404 Not Found`.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier::{Router, Server, store::DirStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = Server::bind("0.0.0.0:4221").await?;
//!     server.run(Router::new(DirStore::new("/tmp"))).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod http;
pub mod router;
pub mod server;
pub mod store;

// ── Convenience re-exports ────────────────────────────────────────────────────
pub use config::{Config, ConfigError, ServerConfig};
pub use http::{Headers, Method, Request, RequestError, Response, StatusCode};
pub use router::{Route, Router};
pub use server::{Server, ServerError};
pub use store::{DirStore, FileStore, MemoryStore};
