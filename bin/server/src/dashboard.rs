//! Administrative dashboard routes.
//!
//! Every handler here requires the administrator session via
//! [`RequireAdmin`]; rejection happens in the extractor before any state
//! is touched. The dashboard views serialize registry summaries without
//! the stored tokens, saves replace whole configuration documents, and
//! the moderation endpoints relay to the platform API.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::auth::{AppState, RequireAdmin};
use crate::provision::Provisioner;
use guildgate_core::{GuildId, UserId};
use guildgate_platform::ProvisionError;
use guildgate_store::{EmbedPresentation, GuildConfig, VerifiedUser};

/// A registry entry as shown on the dashboard.
///
/// Tokens never leave the server; the summary only reports whether one is
/// stored.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub avatar: Option<String>,
    pub verified: bool,
    pub verified_at: DateTime<Utc>,
    pub has_token: bool,
}

impl From<VerifiedUser> for UserSummary {
    fn from(user: VerifiedUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            avatar: user.avatar,
            verified: user.verified,
            verified_at: user.verified_at,
            has_token: user.tokens.is_present(),
        }
    }
}

/// GET `/dashboard`: the verified-user registry.
pub async fn view_registry(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Json<Vec<UserSummary>> {
    let users = state.registry.list().await;
    Json(users.into_iter().map(UserSummary::from).collect())
}

/// GET `/dashboard/user/delete/{id}`: removes a user from the registry.
///
/// Deleting an absent ID is not an error; either way the registry no
/// longer contains the record.
pub async fn delete_user(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    let user_id = UserId::new(id);
    match state.registry.delete(&user_id).await {
        Ok(()) => {
            tracing::info!(user = %user_id, "user removed from registry");
            Redirect::to("/dashboard").into_response()
        }
        Err(e) => {
            tracing::error!(user = %user_id, error = %e, "failed to delete user");
            Redirect::to("/dashboard?error=save_failed").into_response()
        }
    }
}

/// Body of the pull request.
#[derive(Debug, Deserialize)]
pub struct PullRequest {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "serverId")]
    pub server_id: GuildId,
}

/// POST `/dashboard/user/pull`: adds a verified user to a guild using
/// their stored token.
pub async fn pull_user(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PullRequest>,
) -> Redirect {
    let provisioner = Provisioner::new(
        Arc::clone(&state.registry),
        Arc::clone(&state.platform),
    );

    match provisioner.pull(&request.server_id, &request.user_id).await {
        Ok(()) => Redirect::to("/dashboard?success=user_pulled"),
        Err(e) => {
            tracing::warn!(
                user = %request.user_id,
                guild = %request.server_id,
                error = %e,
                "pull failed",
            );
            Redirect::to(&format!("/dashboard?error={}", error_code(&e)))
        }
    }
}

/// Stable error codes surfaced in dashboard redirect URLs.
fn error_code(error: &ProvisionError) -> &'static str {
    match error {
        ProvisionError::TokenMissing { .. } => "token_missing",
        ProvisionError::TokenExpired => "token_expired",
        ProvisionError::Forbidden { .. } => "forbidden",
        ProvisionError::GuildUnavailable { .. } => "guild_unavailable",
        ProvisionError::UpstreamRejected { .. } => "upstream_rejected",
    }
}

/// Combined settings view: both configuration documents.
#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub config: GuildConfig,
    pub embed: EmbedPresentation,
}

/// GET `/dashboard/configuracoes`: current guild and embed settings.
pub async fn view_settings(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> Json<Settings> {
    Json(Settings {
        config: state.guild_config.load().await,
        embed: state.embed.load().await,
    })
}

/// POST `/dashboard/configuracoes/save`: replaces both settings documents.
///
/// The save is a full replacement, so omitted fields fall back to their
/// deserialization defaults rather than surviving from the previous save.
pub async fn save_settings(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(settings): Json<Settings>,
) -> Redirect {
    let saved = state.guild_config.save(&settings.config).await;
    let saved = match saved {
        Ok(()) => state.embed.save(&settings.embed).await,
        Err(e) => Err(e),
    };

    match saved {
        Ok(()) => Redirect::to("/dashboard/configuracoes?success=saved"),
        Err(e) => {
            tracing::error!(error = %e, "failed to save settings");
            Redirect::to("/dashboard/configuracoes?error=save_failed")
        }
    }
}

/// Body of the ban and kick endpoints.
#[derive(Debug, Deserialize)]
pub struct ModerationRequest {
    #[serde(rename = "serverId")]
    pub server_id: GuildId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(default)]
    pub reason: String,
}

/// Body of the mute endpoint.
#[derive(Debug, Deserialize)]
pub struct MuteRequest {
    #[serde(rename = "serverId")]
    pub server_id: GuildId,
    #[serde(rename = "userId")]
    pub user_id: UserId,
    /// Timeout duration in minutes.
    pub duration: i64,
}

/// POST `/dashboard/api/ban`.
pub async fn ban(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .platform
        .ban(&request.server_id, &request.user_id, &request.reason)
        .await?;
    tracing::info!(user = %request.user_id, guild = %request.server_id, "user banned");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST `/dashboard/api/kick`.
pub async fn kick(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .platform
        .kick(&request.server_id, &request.user_id, &request.reason)
        .await?;
    tracing::info!(user = %request.user_id, guild = %request.server_id, "user kicked");
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST `/dashboard/api/mute`.
pub async fn mute(
    RequireAdmin(_): RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(request): Json<MuteRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .platform
        .timeout(&request.server_id, &request.user_id, request.duration)
        .await?;
    tracing::info!(
        user = %request.user_id,
        guild = %request.server_id,
        minutes = request.duration,
        "user muted",
    );
    Ok(Json(serde_json::json!({ "success": true })))
}

/// Platform failures surfaced by the moderation API as JSON errors.
#[derive(Debug)]
pub struct ApiError(ProvisionError);

impl From<ProvisionError> for ApiError {
    fn from(error: ProvisionError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ProvisionError::TokenExpired => StatusCode::UNAUTHORIZED,
            ProvisionError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ProvisionError::TokenMissing { .. } | ProvisionError::GuildUnavailable { .. } => {
                StatusCode::NOT_FOUND
            }
            ProvisionError::UpstreamRejected { .. } => StatusCode::BAD_GATEWAY,
        };
        tracing::warn!(error = %self.0, "moderation request failed");
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        assert_eq!(
            error_code(&ProvisionError::TokenMissing {
                user_id: UserId::new("1"),
            }),
            "token_missing"
        );
        assert_eq!(error_code(&ProvisionError::TokenExpired), "token_expired");
        assert_eq!(
            error_code(&ProvisionError::GuildUnavailable {
                guild_id: GuildId::new("g"),
            }),
            "guild_unavailable"
        );
    }

    #[test]
    fn summary_reports_token_presence_without_the_token() {
        let user = VerifiedUser::new(
            UserId::new("100"),
            "alice",
            None,
            guildgate_store::DelegatedTokens::new("tok1", None),
        );
        let summary = UserSummary::from(user);
        assert!(summary.has_token);

        let json = serde_json::to_string(&summary).expect("serialize");
        assert!(!json.contains("tok1"));
        assert!(json.contains("hasToken"));
    }

    #[test]
    fn pull_request_uses_document_field_names() {
        let request: PullRequest =
            serde_json::from_str(r#"{"userId": "100", "serverId": "serverA"}"#).expect("parse");
        assert_eq!(request.user_id, UserId::new("100"));
        assert_eq!(request.server_id, GuildId::new("serverA"));
    }
}
