//! Async TCP server using Tokio.
//!
//! Accepts TCP connections and spawns one task per connection. Each task performs
//! exactly one exchange: a single socket read, decode, dispatch, encode, write, and
//! close. There is no keep-alive and no read loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::http::{Request, Response, StatusCode};
use crate::router::Router;
use crate::store::FileStore;

/// Errors produced by the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no request received within {0:?}")]
    ReadTimeout(Duration),
}

/// Size of the single read buffer per connection.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Pause after a failed `accept` before the listener tries again.
pub const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

// Per-connection settings copied into every spawned task.
#[derive(Debug, Clone, Copy)]
struct ConnectionSettings {
    read_buffer_size: usize,
    read_timeout: Option<Duration>,
}

/// The courier HTTP server.
///
/// # Examples
///
/// ```rust,no_run
/// use courier::router::Router;
/// use courier::server::Server;
/// use courier::store::DirStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let server = Server::bind("0.0.0.0:4221").await?;
///     server.run(Router::new(DirStore::new("/tmp"))).await?;
///     Ok(())
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    local_addr: SocketAddr,
    settings: ConnectionSettings,
}

impl Server {
    /// Binds the server to the given TCP address with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound
    /// (e.g. port already in use, insufficient permissions).
    pub async fn bind(addr: impl AsRef<str>) -> Result<Self, ServerError> {
        let addr = addr.as_ref();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.to_owned(),
                source: e,
            })?;
        let local_addr = listener.local_addr()?;
        Ok(Self {
            listener,
            local_addr,
            settings: ConnectionSettings {
                read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
                read_timeout: None,
            },
        })
    }

    /// Binds to `config.addr` and applies its connection settings.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        Ok(Self::bind(&config.addr)
            .await?
            .read_buffer_size(config.read_buffer_size)
            .read_timeout(config.read_timeout))
    }

    /// Sets the size of the single read performed per connection.
    ///
    /// A request larger than this is truncated to its first `size` bytes.
    #[must_use]
    pub fn read_buffer_size(mut self, size: usize) -> Self {
        self.settings.read_buffer_size = size.max(1);
        self
    }

    /// Sets a deadline for the request read. `None` (the default) waits forever.
    #[must_use]
    pub fn read_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.read_timeout = timeout;
        self
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Accepts connections forever, dispatching each request through `router`.
    ///
    /// # Errors
    ///
    /// Accept failures are logged and skipped, so in practice this only returns
    /// when the process ends.
    pub async fn run<S: FileStore>(self, router: Router<S>) -> Result<(), ServerError> {
        self.run_until(router, std::future::pending()).await
    }

    /// Accepts connections until `shutdown` resolves.
    ///
    /// Connections already accepted keep running in their own tasks until they
    /// finish their exchange.
    pub async fn run_until<S, F>(self, router: Router<S>, shutdown: F) -> Result<(), ServerError>
    where
        S: FileStore,
        F: Future<Output = ()>,
    {
        let router = Arc::new(router);
        info!(address = %self.local_addr, "courier listening");

        tokio::pin!(shutdown);
        loop {
            let (stream, peer_addr) = tokio::select! {
                () = &mut shutdown => {
                    info!(address = %self.local_addr, "shutting down listener");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        accept_failed(&e).await;
                        continue;
                    }
                },
            };

            debug!(peer = %peer_addr, "connection accepted");
            let router = Arc::clone(&router);
            let settings = self.settings;

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, peer_addr, router, settings).await {
                    warn!(peer = %peer_addr, error = %e, "connection closed with error");
                }
            });
        }

        Ok(())
    }
}

/// Handles the single request/response exchange of one connection.
///
/// The stream is dropped (closed) on every exit path, including read and decode
/// failures.
async fn handle_connection<S: FileStore>(
    mut stream: TcpStream,
    peer_addr: SocketAddr,
    router: Arc<Router<S>>,
    settings: ConnectionSettings,
) -> Result<(), ServerError> {
    let mut buf = BytesMut::zeroed(settings.read_buffer_size);

    let bytes_read = match settings.read_timeout {
        Some(limit) => tokio::time::timeout(limit, stream.read(&mut buf[..]))
            .await
            .map_err(|_| ServerError::ReadTimeout(limit))??,
        None => stream.read(&mut buf[..]).await?,
    };

    if bytes_read == 0 {
        debug!(peer = %peer_addr, "connection closed by peer before sending a request");
        return Ok(());
    }
    buf.truncate(bytes_read);
    debug!(peer = %peer_addr, bytes = bytes_read, "request read");

    let response = match Request::decode(buf.freeze()) {
        Ok(request) => router.dispatch(&request).await,
        Err(e) => {
            warn!(peer = %peer_addr, error = %e, "malformed request, sending 400");
            Response::new(StatusCode::BadRequest)
        }
    };

    let status = response.status();
    let encoded = response.into_bytes();
    stream.write_all(&encoded).await?;
    stream.flush().await?;

    if let Err(e) = stream.shutdown().await {
        debug!(peer = %peer_addr, error = %e, "shutdown after write failed");
    }
    debug!(
        peer = %peer_addr,
        status = %status,
        bytes = encoded.len(),
        "response written, closing connection"
    );

    Ok(())
}

// Persistent accept errors (e.g. EMFILE) would otherwise spin the loop.
async fn accept_failed(e: &std::io::Error) {
    error!(error = %e, backoff = ?ACCEPT_BACKOFF, "failed to accept connection");
    tokio::time::sleep(ACCEPT_BACKOFF).await;
}

#[cfg(test)]
mod tests {
    use std::io;

    use tokio::time::Instant;

    use super::*;

    #[tokio::test]
    async fn accept_failure_backs_off() {
        let err = io::Error::other("too many open files");
        let started = Instant::now();
        accept_failed(&err).await;
        assert!(started.elapsed() >= ACCEPT_BACKOFF);
    }
}
