use tracing::info;
use tracing_subscriber::EnvFilter;

use blogroll_server::{run_server, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,blogroll_server=debug,blogroll_store=debug")
        }))
        .init();

    info!("Starting Blogroll API server v{}", env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Open the database and start listening
    // -----------------------------------------------------------------------
    let server = run_server(config).await?;
    info!(addr = %server.local_addr(), "Your app is running");

    // -----------------------------------------------------------------------
    // 4. Run until Ctrl+C, then release the database and the socket
    // -----------------------------------------------------------------------
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
    } else {
        info!("Received Ctrl+C, shutting down");
    }

    server.close().await
}
