//! Authentication routes for the verification flow: login, callback,
//! and logout.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration as ChronoDuration;
use serde::Deserialize;
use std::sync::Arc;
use time::Duration as TimeDuration;

use super::{
    AUTH_STATE_COOKIE, AppState, SESSION_COOKIE,
    oauth::{AuthError, AuthState, PlatformProfile},
    session::{Session, SessionId, generate_session_id},
};
use crate::autorole;
use guildgate_store::{DelegatedTokens, StorageError, VerifiedUser};

/// Query parameters for the OAuth callback.
///
/// The provider sends either `code` + `state`, or `error` when the user
/// declined the authorization.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Initiates the verification flow by redirecting to the identity provider.
pub async fn login(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    let (auth_url, auth_state) = state.identity.authorization_url();

    // Stash the auth state in a secure cookie for validation on callback
    let auth_state_json = serde_json::to_string(&auth_state).expect("serialize auth state");

    let cookie = Cookie::build((AUTH_STATE_COOKIE, auth_state_json))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    (jar.add(cookie), Redirect::to(&auth_url))
}

/// Handles the provider redirect after the user authorizes (or declines).
///
/// On success the delegated identity is persisted to the registry and the
/// auto-role grant is spawned as a detached task; the response confirms
/// verification without waiting on the grant. The administrator identity
/// is routed to the dashboard instead of being persisted.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> Result<Response, AuthFlowError> {
    if let Some(error) = query.error {
        return Err(AuthFlowError::Exchange(AuthError::Denied { reason: error }));
    }
    let code = query.code.ok_or(AuthFlowError::MissingAuthState)?;
    let returned_state = query.state.ok_or(AuthFlowError::MissingAuthState)?;

    // Retrieve and validate auth state from the cookie
    let auth_state_cookie = jar
        .get(AUTH_STATE_COOKIE)
        .ok_or(AuthFlowError::MissingAuthState)?;
    let auth_state: AuthState = serde_json::from_str(auth_state_cookie.value())
        .map_err(|_| AuthFlowError::InvalidAuthState)?;

    if returned_state != auth_state.csrf_token {
        return Err(AuthFlowError::CsrfMismatch);
    }

    // Exchange the authorization code for the delegated tokens
    let exchange = state
        .identity
        .exchange_code(&code, &auth_state.pkce_verifier)
        .await
        .map_err(AuthFlowError::Exchange)?;

    let profile = state
        .identity
        .fetch_profile(&exchange.access_token)
        .await
        .map_err(AuthFlowError::Exchange)?;

    let admin = profile.id == state.admin_user_id;

    // Session for the caller, admin or not
    let duration = state.session_config.duration_minutes;
    let session = Session::new(
        generate_session_id(),
        profile.id.clone(),
        profile.username.clone(),
        admin,
        ChronoDuration::minutes(duration),
    );
    let session_cookie = Cookie::build((SESSION_COOKIE, session.id().as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(duration));
    state.sessions.insert(session).await;

    // Remove the auth state cookie
    let remove_auth_state = Cookie::build((AUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    let jar = jar.add(session_cookie).add(remove_auth_state);

    if admin {
        // The administrator is routed to the administrative surface and is
        // never persisted as a verified user.
        return Ok((jar, Redirect::to("/dashboard")).into_response());
    }

    let tokens = DelegatedTokens::new(exchange.access_token, exchange.refresh_token);
    let user = complete_verification(&state, profile, tokens)
        .await
        .map_err(AuthFlowError::Persist)?;

    Ok((
        jar,
        axum::Json(serde_json::json!({
            "verified": true,
            "userId": user.id,
            "username": user.username,
        })),
    )
        .into_response())
}

/// Persists the verified identity and spawns the auto-role grant.
///
/// Verification success is defined strictly by identity confirmation plus
/// persistence; the grant's outcome never influences the result.
pub(crate) async fn complete_verification(
    state: &AppState,
    profile: PlatformProfile,
    tokens: DelegatedTokens,
) -> Result<VerifiedUser, StorageError> {
    let user = VerifiedUser::new(profile.id, profile.username, profile.avatar, tokens);
    state.registry.upsert(user.clone()).await?;
    tracing::info!(user = %user.id, "identity verified and persisted");

    let guild_config = state.guild_config.load().await;
    autorole::grant_on_verify(
        Arc::clone(&state.platform),
        state.home_guild_id.clone(),
        user.id.clone(),
        user.username.clone(),
        guild_config,
    );

    Ok(user)
}

/// Logs out by dropping the session and clearing its cookie.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let session_id = SessionId::new(session_cookie.value().to_string());
        state.sessions.remove(&session_id).await;
    }

    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(remove_session), Redirect::to("/"))
}

/// Failures of the verification flow.
///
/// Exchange failures abort the flow with no partial persistence; only a
/// completed exchange followed by a successful upsert verifies a user.
#[derive(Debug)]
pub enum AuthFlowError {
    MissingAuthState,
    InvalidAuthState,
    CsrfMismatch,
    Exchange(AuthError),
    Persist(StorageError),
}

impl IntoResponse for AuthFlowError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingAuthState => (StatusCode::BAD_REQUEST, "Missing auth state").into_response(),
            Self::InvalidAuthState => (StatusCode::BAD_REQUEST, "Invalid auth state").into_response(),
            Self::CsrfMismatch => (StatusCode::BAD_REQUEST, "CSRF token mismatch").into_response(),
            Self::Exchange(AuthError::Denied { reason }) => {
                tracing::info!(reason = %reason, "authorization denied");
                Redirect::to("/?error=unauthorized").into_response()
            }
            Self::Exchange(e) => {
                tracing::error!(error = %e, "identity exchange failed");
                (StatusCode::BAD_GATEWAY, "Authentication failed").into_response()
            }
            Self::Persist(e) => {
                tracing::error!(error = %e, "failed to persist verified user");
                Redirect::to("/?error=save_failed").into_response()
            }
        }
    }
}
