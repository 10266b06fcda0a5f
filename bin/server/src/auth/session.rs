//! In-memory session management for authenticated principals.
//!
//! Sessions are ephemeral by design: the durable state of the pipeline is
//! the three flat documents, and a restart simply requires logging in
//! again. Expired sessions are rejected on access and removed lazily; a
//! periodic cleanup task in `main` purges the rest.

use chrono::{DateTime, Duration, Utc};
use guildgate_core::UserId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Unique identifier for a session, an opaque random string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from a string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates a random session ID.
#[must_use]
pub fn generate_session_id() -> SessionId {
    SessionId::new(ulid::Ulid::new().to_string())
}

/// An active authenticated session.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    user_id: UserId,
    username: String,
    admin: bool,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    /// Creates a new session valid for `duration`.
    #[must_use]
    pub fn new(
        id: SessionId,
        user_id: UserId,
        username: impl Into<String>,
        admin: bool,
        duration: Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            username: username.into(),
            admin,
            created_at: now,
            expires_at: now + duration,
        }
    }

    /// Returns the session ID.
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns the authenticated principal's platform ID.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Returns the principal's username at login time.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns true if the principal is the configured administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.admin
    }

    /// Returns when the session was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Shared in-memory session store.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a session, replacing any session with the same ID.
    pub async fn insert(&self, session: Session) {
        self.inner
            .write()
            .await
            .insert(session.id().clone(), session);
    }

    /// Looks up a live session, removing it if expired.
    pub async fn get(&self, id: &SessionId) -> Option<Session> {
        let session = self.inner.read().await.get(id).cloned()?;
        if session.is_expired() {
            self.inner.write().await.remove(id);
            return None;
        }
        Some(session)
    }

    /// Removes a session. Succeeds whether or not it existed.
    pub async fn remove(&self, id: &SessionId) {
        self.inner.write().await.remove(id);
    }

    /// Removes all expired sessions, returning how many were purged.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.inner.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }
}
