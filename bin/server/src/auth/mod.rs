//! Authentication module for the guildgate server.
//!
//! This module provides:
//! - The OAuth2 verification flow against the platform's identity provider
//! - In-memory session management
//! - Authentication extractors for Axum routes
//!
//! # Authorization model
//!
//! There is exactly one privileged principal: the administrator identity
//! from [`crate::config::ServerConfig`]. The callback compares the
//! authenticated profile against it after the exchange; the administrator
//! is routed to the dashboard and is never persisted as a verified user.
//! Everyone else who completes the flow becomes a registry entry.

pub mod middleware;
pub mod oauth;
pub mod routes;
pub mod session;

pub use middleware::{RequireAdmin, RequireAuth};
pub use oauth::IdentityClient;
pub use routes::{callback, login, logout};
pub use session::SessionStore;

use crate::config::{ServerConfig, SessionConfig};
use guildgate_core::{GuildId, UserId};
use guildgate_platform::PlatformClient;
use guildgate_store::{DocumentStore, EmbedPresentation, GuildConfig, UserRegistry};
use std::path::Path;
use std::sync::Arc;

/// Session cookie name.
pub(crate) const SESSION_COOKIE: &str = "session";

/// Auth state cookie name (CSRF protection during the OAuth flow).
pub(crate) const AUTH_STATE_COOKIE: &str = "auth_state";

/// Shared application state.
pub struct AppState {
    /// Durable registry of verified identities.
    pub registry: Arc<UserRegistry>,
    /// Guild configuration document.
    pub guild_config: DocumentStore<GuildConfig>,
    /// Embed presentation document.
    pub embed: DocumentStore<EmbedPresentation>,
    /// Guild platform API client.
    pub platform: Arc<PlatformClient>,
    /// Identity provider client.
    pub identity: IdentityClient,
    /// In-memory session store.
    pub sessions: SessionStore,
    /// The administrator's platform user ID.
    pub admin_user_id: UserId,
    /// Guild targeted by the auto-role grant.
    pub home_guild_id: GuildId,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates the application state from configuration and built clients.
    #[must_use]
    pub fn new(config: &ServerConfig, identity: IdentityClient, platform: PlatformClient) -> Self {
        let dir = Path::new(&config.storage_dir);
        Self {
            registry: Arc::new(UserRegistry::new(dir.join("users.json"))),
            guild_config: DocumentStore::new(dir.join("guild_config.json")),
            embed: DocumentStore::new(dir.join("embed.json")),
            platform: Arc::new(platform),
            identity,
            sessions: SessionStore::new(),
            admin_user_id: UserId::new(config.admin_user_id.clone()),
            home_guild_id: GuildId::new(config.home_guild_id.clone()),
            session_config: config.session.clone(),
        }
    }
}
