//! OAuth2 client for the platform's identity provider.
//!
//! This module drives the authorization-code exchange for verification:
//! `/auth/discord` redirects to the provider with the verification scopes,
//! and the callback exchanges the returned code for the user's delegated
//! tokens, then reads their profile. No persistence happens here; it is a
//! pure exchange with the provider.

use guildgate_core::UserId;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, PkceCodeChallenge,
    PkceCodeVerifier, RedirectUrl, RequestTokenError, Scope, TokenResponse, TokenUrl,
    basic::BasicClient,
};
use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::config::OAuthConfig;

/// Provider authorization URL.
const PROVIDER_AUTH_URL: &str = "https://discord.com/api/oauth2/authorize";

/// Provider token URL.
const PROVIDER_TOKEN_URL: &str = "https://discord.com/api/oauth2/token";

/// Provider profile endpoint.
const PROVIDER_PROFILE_URL: &str = "https://discord.com/api/v10/users/@me";

/// Scopes requested during verification: identity, guild list, guild-join
/// consent, and guild-member read. The `guilds.join` consent is what the
/// membership provisioner later relies on.
const VERIFY_SCOPES: &[&str] = &["identify", "guilds", "guilds.join", "guilds.members.read"];

/// State carried through the OAuth flow in a short-lived cookie.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// Result of a successful code exchange.
#[derive(Debug)]
pub struct DelegatedExchange {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// The authenticated user's profile as reported by the provider.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub id: UserId,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProfileBody {
    id: String,
    username: String,
    avatar: Option<String>,
}

/// Identity provider client configuration.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    client_id: String,
    client_secret: String,
    auth_url: String,
    token_url: String,
    profile_url: String,
    redirect_url: String,
    http: reqwest::Client,
}

impl IdentityClient {
    /// Creates an identity client from the OAuth application config.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &OAuthConfig, timeout: Duration) -> Result<Self, AuthError> {
        let _ = RedirectUrl::new(config.redirect_url.clone()).map_err(|e| {
            AuthError::Configuration {
                reason: format!("invalid redirect URL: {e}"),
            }
        })?;

        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|e| AuthError::Configuration {
                reason: format!("HTTP client error: {e}"),
            })?;

        Ok(Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            auth_url: PROVIDER_AUTH_URL.to_string(),
            token_url: PROVIDER_TOKEN_URL.to_string(),
            profile_url: PROVIDER_PROFILE_URL.to_string(),
            redirect_url: config.redirect_url.clone(),
            http,
        })
    }

    /// Overrides the provider endpoints. Used by tests against a local server.
    #[must_use]
    pub fn with_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
        profile_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self.profile_url = profile_url.into();
        self
    }

    /// Generates the authorization URL for the verification flow.
    ///
    /// Returns the URL to redirect the user to, along with the auth state
    /// to stash in a cookie for validation on callback.
    #[must_use]
    pub fn authorization_url(&self) -> (String, AuthState) {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(self.auth_url.clone()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in VERIFY_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = AuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code for the user's delegated tokens.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] classifying the exchange failure.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<DelegatedExchange, AuthError> {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(self.token_url.clone()).expect("valid token URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| match e {
                RequestTokenError::ServerResponse(response) => AuthError::Denied {
                    reason: response.to_string(),
                },
                RequestTokenError::Request(e) => AuthError::ProviderUnavailable {
                    reason: e.to_string(),
                },
                other => AuthError::InvalidResponse {
                    reason: other.to_string(),
                },
            })?;

        Ok(DelegatedExchange {
            access_token: token_result.access_token().secret().clone(),
            refresh_token: token_result.refresh_token().map(|t| t.secret().clone()),
        })
    }

    /// Fetches the authenticated user's profile with their access token.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the provider is unreachable or answers
    /// with anything other than a parseable profile.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<PlatformProfile, AuthError> {
        let response = self
            .http
            .get(&self.profile_url)
            .header("Authorization", format!("Bearer {access_token}"))
            .send()
            .await
            .map_err(|e| AuthError::ProviderUnavailable {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::InvalidResponse {
                reason: format!("profile endpoint answered {status}: {body}"),
            });
        }

        let body: ProfileBody =
            response
                .json()
                .await
                .map_err(|e| AuthError::InvalidResponse {
                    reason: format!("unparseable profile payload: {e}"),
                })?;

        Ok(PlatformProfile {
            id: UserId::new(body.id),
            username: body.username,
            avatar: body.avatar,
        })
    }
}

/// Identity-provider exchange failures.
///
/// Any of these aborts the verification flow with no partial persistence.
#[derive(Debug)]
pub enum AuthError {
    /// The provider (or the user) refused the authorization.
    Denied { reason: String },
    /// The provider could not be reached.
    ProviderUnavailable { reason: String },
    /// The provider answered with something unusable.
    InvalidResponse { reason: String },
    /// The client itself is misconfigured.
    Configuration { reason: String },
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Denied { reason } => write!(f, "authorization denied: {reason}"),
            Self::ProviderUnavailable { reason } => {
                write!(f, "identity provider unavailable: {reason}")
            }
            Self::InvalidResponse { reason } => {
                write!(f, "invalid identity provider response: {reason}")
            }
            Self::Configuration { reason } => write!(f, "configuration error: {reason}"),
        }
    }
}

impl std::error::Error for AuthError {}
