//! `parley serve` handler.

use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::server;

use super::ServeArgs;

/// Handle `parley serve`: run the relay until Ctrl-C.
pub async fn handle_serve(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = RelayConfig::from_env()?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    tracing::debug!(?config, "Resolved configuration");

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        signal.cancel();
    });

    server::start_server(&config, shutdown).await?;
    Ok(())
}
