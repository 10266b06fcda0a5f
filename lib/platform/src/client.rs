//! HTTP client for the guild platform API.

use crate::error::ProvisionError;
use chrono::{Duration as ChronoDuration, Utc};
use guildgate_core::{GuildId, RoleId, UserId};
use reqwest::StatusCode;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use std::time::Duration;

/// Default platform API base URL.
const DEFAULT_BASE_URL: &str = "https://discord.com/api/v10";

/// A guild member as returned by the member-read endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    /// Role IDs currently assigned to the member.
    #[serde(default)]
    pub roles: Vec<RoleId>,
}

impl GuildMember {
    /// Returns true if the member already holds `role`.
    #[must_use]
    pub fn has_role(&self, role: &RoleId) -> bool {
        self.roles.contains(role)
    }
}

/// Client for the platform's guild-management REST API.
///
/// All calls are authorized by the service's bot credential; the
/// add-member call additionally carries the member's delegated token in
/// the request body as proof of their prior join consent.
pub struct PlatformClient {
    http: reqwest::Client,
    base_url: String,
    bot_token: String,
}

impl PlatformClient {
    /// Creates a client using the bot credential and a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(bot_token: impl Into<String>, timeout: Duration) -> Result<Self, ProvisionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProvisionError::UpstreamRejected {
                status: None,
                reason: format!("HTTP client error: {e}"),
            })?;

        Ok(Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
            bot_token: bot_token.into(),
        })
    }

    /// Overrides the API base URL. Used by tests against a local server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn member_url(&self, guild_id: &GuildId, user_id: &UserId) -> String {
        format!("{}/guilds/{guild_id}/members/{user_id}", self.base_url)
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.bot_token)
    }

    /// Adds a verified user to a guild using their delegated access token.
    ///
    /// The endpoint has idempotent upsert semantics: the platform answers
    /// 201 when the member was added and 204 when already present; both
    /// are success.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] describing the platform's rejection.
    pub async fn add_guild_member(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        access_token: &str,
    ) -> Result<(), ProvisionError> {
        let response = self
            .http
            .put(self.member_url(guild_id, user_id))
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({ "access_token": access_token }))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::CREATED | StatusCode::NO_CONTENT => Ok(()),
            status => Err(classify("add member", guild_id, status, body_of(response).await)),
        }
    }

    /// Grants a role to a guild member.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] describing the platform's rejection.
    pub async fn add_member_role(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        role_id: &RoleId,
    ) -> Result<(), ProvisionError> {
        let url = format!("{}/roles/{role_id}", self.member_url(guild_id, user_id));
        let response = self
            .http
            .put(url)
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(classify("grant role", guild_id, status, body_of(response).await)),
        }
    }

    /// Reads a guild member.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::GuildUnavailable`] when the guild or the
    /// member cannot be resolved.
    pub async fn get_guild_member(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
    ) -> Result<GuildMember, ProvisionError> {
        let response = self
            .http
            .get(self.member_url(guild_id, user_id))
            .header("Authorization", self.authorization())
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => {
                response
                    .json()
                    .await
                    .map_err(|e| ProvisionError::UpstreamRejected {
                        status: Some(StatusCode::OK.as_u16()),
                        reason: format!("unparseable member payload: {e}"),
                    })
            }
            status => Err(classify("read member", guild_id, status, body_of(response).await)),
        }
    }

    /// Bans a user from a guild.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] describing the platform's rejection.
    pub async fn ban(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        reason: &str,
    ) -> Result<(), ProvisionError> {
        let url = format!("{}/guilds/{guild_id}/bans/{user_id}", self.base_url);
        let mut request = self
            .http
            .put(url)
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({}));
        if let Some(value) = audit_reason(reason) {
            request = request.header("X-Audit-Log-Reason", value);
        }

        let response = request.send().await.map_err(transport_error)?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(classify("ban", guild_id, status, body_of(response).await)),
        }
    }

    /// Removes a user from a guild.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] describing the platform's rejection.
    pub async fn kick(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        reason: &str,
    ) -> Result<(), ProvisionError> {
        let mut request = self
            .http
            .delete(self.member_url(guild_id, user_id))
            .header("Authorization", self.authorization());
        if let Some(value) = audit_reason(reason) {
            request = request.header("X-Audit-Log-Reason", value);
        }

        let response = request.send().await.map_err(transport_error)?;
        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            status => Err(classify("kick", guild_id, status, body_of(response).await)),
        }
    }

    /// Times a member out for the given number of minutes.
    ///
    /// # Errors
    ///
    /// Returns a [`ProvisionError`] describing the platform's rejection.
    pub async fn timeout(
        &self,
        guild_id: &GuildId,
        user_id: &UserId,
        duration_minutes: i64,
    ) -> Result<(), ProvisionError> {
        let response = self
            .http
            .patch(self.member_url(guild_id, user_id))
            .header("Authorization", self.authorization())
            .json(&serde_json::json!({
                "communication_disabled_until": timeout_until(duration_minutes),
            }))
            .send()
            .await
            .map_err(transport_error)?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(classify("timeout", guild_id, status, body_of(response).await)),
        }
    }
}

/// Maps a platform rejection status to the provisioning error taxonomy.
fn classify(action: &str, guild_id: &GuildId, status: StatusCode, body: String) -> ProvisionError {
    match status {
        StatusCode::UNAUTHORIZED => ProvisionError::TokenExpired,
        StatusCode::FORBIDDEN => ProvisionError::Forbidden {
            action: action.to_string(),
        },
        StatusCode::NOT_FOUND => ProvisionError::GuildUnavailable {
            guild_id: guild_id.clone(),
        },
        status => ProvisionError::UpstreamRejected {
            status: Some(status.as_u16()),
            reason: body,
        },
    }
}

fn transport_error(e: reqwest::Error) -> ProvisionError {
    let reason = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    ProvisionError::UpstreamRejected {
        status: None,
        reason,
    }
}

async fn body_of(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}

/// Audit-log reasons must be valid header values; anything else is dropped.
fn audit_reason(reason: &str) -> Option<HeaderValue> {
    if reason.is_empty() {
        return None;
    }
    HeaderValue::from_str(reason).ok()
}

/// RFC 3339 timestamp `duration_minutes` from now, for member timeouts.
fn timeout_until(duration_minutes: i64) -> String {
    (Utc::now() + ChronoDuration::minutes(duration_minutes)).to_rfc3339()
}
