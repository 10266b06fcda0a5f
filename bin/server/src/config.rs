//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. The
//! administrator identity is configuration, never a literal in control
//! logic.

use serde::Deserialize;

/// Server configuration loaded from the environment.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Directory holding the flat storage documents.
    #[serde(default = "default_storage_dir")]
    pub storage_dir: String,

    /// The service's privileged bot credential.
    pub bot_token: String,

    /// Platform user ID authorized for all administrative routes.
    pub admin_user_id: String,

    /// Guild the verification flow serves; the auto-role grant targets it.
    pub home_guild_id: String,

    /// Timeout applied to every outbound platform API call, in seconds.
    #[serde(default = "default_platform_timeout_seconds")]
    pub platform_timeout_seconds: u64,

    /// OAuth application credentials for the identity provider.
    pub oauth: OAuthConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,
}

/// OAuth2 application credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// OAuth application (client) ID.
    pub client_id: String,
    /// OAuth application secret.
    pub client_secret: String,
    /// Redirect URL registered with the provider; must point at
    /// `/auth/discord/callback` on this server's public address.
    pub redirect_url: String,
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Session duration in minutes.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_storage_dir() -> String {
    "storage".to_string()
}

fn default_platform_timeout_seconds() -> u64 {
    10
}

fn default_session_duration_minutes() -> i64 {
    60 * 24
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_minutes: default_session_duration_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
