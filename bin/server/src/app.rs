//! HTTP route table and application router.

use axum::{
    Json, Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::auth::{self, AppState};
use crate::dashboard;

/// Landing route; points unauthenticated visitors at the verification
/// flow.
async fn home() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": "guildgate",
        "authorize": "/auth/discord",
    }))
}

/// Builds the application router.
///
/// Every route the server answers is listed here; administrative routes
/// enforce the administrator session through their extractors.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/auth/discord", get(auth::login))
        .route("/auth/discord/callback", get(auth::callback))
        .route("/auth/logout", get(auth::logout))
        .route("/dashboard", get(dashboard::view_registry))
        .route("/dashboard/user/delete/{id}", get(dashboard::delete_user))
        .route("/dashboard/user/pull", post(dashboard::pull_user))
        .route("/dashboard/configuracoes", get(dashboard::view_settings))
        .route(
            "/dashboard/configuracoes/save",
            post(dashboard::save_settings),
        )
        .route("/dashboard/api/ban", post(dashboard::ban))
        .route("/dashboard/api/kick", post(dashboard::kick))
        .route("/dashboard/api/mute", post(dashboard::mute))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::SESSION_COOKIE;
    use crate::test_support::{
        admin_session, spawn_server, test_state, test_state_with_platform, user_session,
    };
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use guildgate_core::UserId;
    use guildgate_store::{DelegatedTokens, VerifiedUser};
    use tower::ServiceExt;

    fn get_request(uri: &str, session: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(session) = session {
            builder = builder.header("Cookie", format!("{SESSION_COOKIE}={session}"));
        }
        builder.body(Body::empty()).expect("request")
    }

    fn post_request(uri: &str, session: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Cookie", format!("{SESSION_COOKIE}={session}"))
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn location(response: &axum::response::Response) -> Option<&str> {
        response
            .headers()
            .get("location")
            .and_then(|v| v.to_str().ok())
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn verified(id: &str, token: &str) -> VerifiedUser {
        VerifiedUser::new(
            UserId::new(id),
            format!("user-{id}"),
            None,
            DelegatedTokens::new(token, None),
        )
    }

    #[tokio::test]
    async fn dashboard_without_session_redirects_home() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let app = router(state);

        let response = app
            .oneshot(get_request("/dashboard", None))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/"));
    }

    #[tokio::test]
    async fn dashboard_rejects_non_admin_session_without_mutation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        state
            .registry
            .upsert(verified("100", "tok1"))
            .await
            .expect("upsert");
        let session = user_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(get_request("/dashboard/user/delete/100", Some(&session)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/?error=unauthorized"));
        // The rejected request changed nothing.
        assert!(state.registry.get_by_id(&UserId::new("100")).await.is_some());
    }

    #[tokio::test]
    async fn admin_sees_registry_without_tokens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        state
            .registry
            .upsert(verified("100", "tok1"))
            .await
            .expect("upsert");
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(get_request("/dashboard", Some(&session)))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body[0]["id"], "100");
        assert_eq!(body[0]["hasToken"], true);
        assert!(body.to_string().find("tok1").is_none());
    }

    #[tokio::test]
    async fn admin_delete_removes_user() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        state
            .registry
            .upsert(verified("100", "tok1"))
            .await
            .expect("upsert");
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(get_request("/dashboard/user/delete/100", Some(&session)))
            .await
            .expect("response");

        assert_eq!(location(&response), Some("/dashboard"));
        assert!(state.registry.get_by_id(&UserId::new("100")).await.is_none());
    }

    #[tokio::test]
    async fn admin_pull_redirects_with_success() {
        let mock = Router::new().route(
            "/guilds/{guild}/members/{user}",
            axum::routing::put(|| async { StatusCode::CREATED }),
        );
        let base = spawn_server(mock).await;

        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state_with_platform(dir.path(), &base);
        state
            .registry
            .upsert(verified("100", "tok1"))
            .await
            .expect("upsert");
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(post_request(
                "/dashboard/user/pull",
                &session,
                serde_json::json!({ "userId": "100", "serverId": "serverA" }),
            ))
            .await
            .expect("response");

        assert_eq!(location(&response), Some("/dashboard?success=user_pulled"));
    }

    #[tokio::test]
    async fn admin_pull_of_unknown_user_reports_token_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(post_request(
                "/dashboard/user/pull",
                &session,
                serde_json::json!({ "userId": "200", "serverId": "serverA" }),
            ))
            .await
            .expect("response");

        assert_eq!(location(&response), Some("/dashboard?error=token_missing"));
    }

    #[tokio::test]
    async fn settings_save_then_view_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let session = admin_session(&state).await;

        let save = router(Arc::clone(&state))
            .oneshot(post_request(
                "/dashboard/configuracoes/save",
                &session,
                serde_json::json!({
                    "config": { "autoRole": "777", "welcomeMessage": "hi {user}" },
                    "embed": { "title": "Join us" },
                }),
            ))
            .await
            .expect("response");
        assert_eq!(
            location(&save),
            Some("/dashboard/configuracoes?success=saved")
        );

        let view = router(Arc::clone(&state))
            .oneshot(get_request("/dashboard/configuracoes", Some(&session)))
            .await
            .expect("response");
        let body = json_body(view).await;
        assert_eq!(body["config"]["autoRole"], "777");
        assert_eq!(body["embed"]["title"], "Join us");
        // Omitted fields fall back to defaults, not to the previous save.
        assert_eq!(body["embed"]["buttonLabel"], "Verify");
    }

    #[tokio::test]
    async fn moderation_ban_answers_success_json() {
        let mock = Router::new().route(
            "/guilds/{guild}/bans/{user}",
            axum::routing::put(|| async { StatusCode::NO_CONTENT }),
        );
        let base = spawn_server(mock).await;

        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state_with_platform(dir.path(), &base);
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(post_request(
                "/dashboard/api/ban",
                &session,
                serde_json::json!({
                    "serverId": "serverA",
                    "userId": "100",
                    "reason": "spamming",
                }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["success"], true);
    }

    #[tokio::test]
    async fn moderation_forbidden_maps_to_403_json_error() {
        let mock = Router::new().route(
            "/guilds/{guild}/members/{user}",
            axum::routing::delete(|| async { StatusCode::FORBIDDEN }),
        );
        let base = spawn_server(mock).await;

        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state_with_platform(dir.path(), &base);
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(post_request(
                "/dashboard/api/kick",
                &session,
                serde_json::json!({ "serverId": "serverA", "userId": "100" }),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(json_body(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn logout_clears_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = test_state(dir.path());
        let session = admin_session(&state).await;
        let app = router(Arc::clone(&state));

        let response = app
            .oneshot(get_request("/auth/logout", Some(&session)))
            .await
            .expect("response");
        assert_eq!(location(&response), Some("/"));

        // The session is gone; the dashboard bounces back to the home page.
        let after = router(Arc::clone(&state))
            .oneshot(get_request("/dashboard", Some(&session)))
            .await
            .expect("response");
        assert_eq!(location(&after), Some("/"));
    }
}
