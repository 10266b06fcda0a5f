//! Guildgate server entry point.

use guildgate_server::app;
use guildgate_server::auth::{AppState, IdentityClient};
use guildgate_server::config::ServerConfig;
use guildgate_platform::PlatformClient;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guildgate_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let timeout = Duration::from_secs(config.platform_timeout_seconds);
    let identity = IdentityClient::new(&config.oauth, timeout)?;
    let platform = PlatformClient::new(config.bot_token.as_str(), timeout)?;

    let state = Arc::new(AppState::new(&config, identity, platform));

    // Periodic purge backs up the lazy expiry in the session store.
    let sessions = state.sessions.clone();
    let cleanup_interval = Duration::from_secs(config.session.cleanup_interval_seconds);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(cleanup_interval);
        loop {
            ticker.tick().await;
            let purged = sessions.purge_expired().await;
            if purged > 0 {
                tracing::debug!(purged, "expired sessions purged");
            }
        }
    });

    let app = app::router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "guildgate server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
