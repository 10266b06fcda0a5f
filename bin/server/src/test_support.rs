//! Shared fixtures for server tests: application state over a temporary
//! storage directory, pre-inserted sessions, and a local identity
//! provider stub.

use crate::auth::session::{Session, generate_session_id};
use crate::auth::{AppState, IdentityClient};
use crate::config::{OAuthConfig, ServerConfig, SessionConfig};
use axum::Router;
use guildgate_core::UserId;
use guildgate_platform::PlatformClient;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Administrator identity used across server tests.
pub(crate) const ADMIN_ID: &str = "999000999";

pub(crate) fn test_config(dir: &Path) -> ServerConfig {
    ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        storage_dir: dir.display().to_string(),
        bot_token: "bot-token".to_string(),
        admin_user_id: ADMIN_ID.to_string(),
        home_guild_id: "serverA".to_string(),
        platform_timeout_seconds: 2,
        oauth: OAuthConfig {
            client_id: "app-id".to_string(),
            client_secret: "app-secret".to_string(),
            redirect_url: "http://localhost:3000/auth/discord/callback".to_string(),
        },
        session: SessionConfig {
            duration_minutes: 60,
            cleanup_interval_seconds: 300,
            secure_cookies: false,
        },
    }
}

fn build_state(dir: &Path, platform_base: &str, provider_base: Option<&str>) -> Arc<AppState> {
    let config = test_config(dir);
    let mut identity =
        IdentityClient::new(&config.oauth, Duration::from_secs(2)).expect("identity client");
    if let Some(base) = provider_base {
        identity = identity.with_endpoints(
            format!("{base}/authorize"),
            format!("{base}/token"),
            format!("{base}/users/@me"),
        );
    }
    let platform = PlatformClient::new(config.bot_token.as_str(), Duration::from_secs(2))
        .expect("platform client")
        .with_base_url(platform_base);
    Arc::new(AppState::new(&config, identity, platform))
}

/// State with unroutable provider and platform endpoints: any outbound
/// call fails fast with a transport error.
pub(crate) fn test_state(dir: &Path) -> Arc<AppState> {
    build_state(dir, "http://127.0.0.1:9", None)
}

/// State whose platform client targets a local mock server.
pub(crate) fn test_state_with_platform(dir: &Path, platform_base: &str) -> Arc<AppState> {
    build_state(dir, platform_base, None)
}

/// State whose identity client targets a local provider stub.
pub(crate) fn test_state_with_provider(dir: &Path, provider_base: &str) -> Arc<AppState> {
    build_state(dir, "http://127.0.0.1:9", Some(provider_base))
}

/// State with both a mock platform and a mock provider.
pub(crate) fn test_state_with(
    dir: &Path,
    platform_base: &str,
    provider_base: &str,
) -> Arc<AppState> {
    build_state(dir, platform_base, Some(provider_base))
}

async fn session_for(state: &AppState, user_id: &str, admin: bool) -> String {
    let session = Session::new(
        generate_session_id(),
        UserId::new(user_id),
        "tester",
        admin,
        chrono::Duration::hours(1),
    );
    let id = session.id().to_string();
    state.sessions.insert(session).await;
    id
}

/// Inserts an administrator session and returns its cookie value.
pub(crate) async fn admin_session(state: &AppState) -> String {
    session_for(state, ADMIN_ID, true).await
}

/// Inserts an ordinary verified-user session and returns its cookie value.
pub(crate) async fn user_session(state: &AppState) -> String {
    session_for(state, "100", false).await
}

pub(crate) async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

/// Provider stub answering the token exchange and the profile read with
/// fixed payloads.
pub(crate) async fn provider_mock(access_token: &str, user_id: &str, username: &str) -> String {
    let token = serde_json::json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 3600,
        "refresh_token": "refresh",
        "scope": "identify",
    });
    let profile = serde_json::json!({
        "id": user_id,
        "username": username,
        "avatar": null,
    });

    let app = Router::new()
        .route(
            "/token",
            axum::routing::post(move || {
                let token = token.clone();
                async move { axum::Json(token) }
            }),
        )
        .route(
            "/users/@me",
            axum::routing::get(move || {
                let profile = profile.clone();
                async move { axum::Json(profile) }
            }),
        );

    spawn_server(app).await
}
