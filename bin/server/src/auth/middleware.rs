//! Authentication extractors for Axum routes.
//!
//! Every administrative route compares the authenticated principal
//! against the configured administrator identity via [`RequireAdmin`];
//! a mismatch redirects with an error and causes no state change.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use std::sync::Arc;

use super::{AppState, SESSION_COOKIE, session::Session, session::SessionId};

/// Extractor for requiring an authenticated principal.
///
/// Without a live session, the caller is redirected to the home page.
pub struct RequireAuth(pub Session);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let session_cookie = jar
            .get(SESSION_COOKIE)
            .ok_or(AuthRejection::NotAuthenticated)?;

        let session_id = SessionId::new(session_cookie.value().to_string());

        // Expired sessions are removed by the store on lookup.
        let session = app_state
            .sessions
            .get(&session_id)
            .await
            .ok_or(AuthRejection::NotAuthenticated)?;

        Ok(RequireAuth(session))
    }
}

/// Extractor for requiring the administrator principal.
pub struct RequireAdmin(pub Session);

impl<S> FromRequestParts<S> for RequireAdmin
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(session) = RequireAuth::from_request_parts(parts, state).await?;

        if !session.is_admin() {
            return Err(AuthRejection::AdminRequired);
        }

        Ok(RequireAdmin(session))
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    NotAuthenticated,
    AdminRequired,
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::NotAuthenticated => Redirect::to("/").into_response(),
            Self::AdminRequired => Redirect::to("/?error=unauthorized").into_response(),
            Self::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
