//! courier: a minimal HTTP/1.1 file and echo server.

use courier::{Config, DirStore, Router, Server};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        address = %config.server.addr,
        directory = %config.directory.display(),
        read_buffer_size = config.server.read_buffer_size,
        read_timeout = ?config.server.read_timeout,
        "starting courier"
    );

    let server = Server::from_config(&config.server).await?;
    let router = Router::new(DirStore::new(config.directory));

    server
        .run_until(router, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
