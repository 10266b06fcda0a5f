//! Durable registry of verified platform identities.
//!
//! The registry is a flat JSON list keyed by platform user ID. Upserts are
//! idempotent insert-or-replace with last-write-wins semantics and no
//! field-level merge. A per-process mutex serializes the read-modify-write
//! cycle so concurrent upserts to distinct IDs do not clobber each other.

use crate::document::{read_document, write_document};
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use guildgate_core::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Delegated OAuth2 tokens obtained during verification.
///
/// The access token is the proof of the user's `guilds.join` consent and is
/// required by the membership provisioner. This wrapper keeps the secrets
/// out of `Debug` output and log lines; they are still serialized into the
/// registry document, which is confidentiality-sensitive state.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatedTokens {
    access_token: String,
    refresh_token: Option<String>,
}

impl DelegatedTokens {
    /// Creates a token pair from an OAuth2 exchange result.
    #[must_use]
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    /// Returns the delegated access token.
    #[must_use]
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Returns the delegated refresh token, if one was issued.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns true if a usable access token is present.
    #[must_use]
    pub fn is_present(&self) -> bool {
        !self.access_token.is_empty()
    }
}

impl fmt::Debug for DelegatedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatedTokens")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A verified platform identity, as stored in the registry document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiedUser {
    /// Platform user ID, the registry key.
    pub id: UserId,
    /// Username at verification time.
    pub username: String,
    /// Avatar reference, if the user has one.
    pub avatar: Option<String>,
    /// Always true for records created through the verification flow.
    pub verified: bool,
    /// When the verification completed.
    pub verified_at: DateTime<Utc>,
    /// Delegated tokens captured during the OAuth exchange.
    #[serde(flatten)]
    pub tokens: DelegatedTokens,
}

impl VerifiedUser {
    /// Creates a freshly verified user record.
    #[must_use]
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        avatar: Option<String>,
        tokens: DelegatedTokens,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            avatar,
            verified: true,
            verified_at: Utc::now(),
            tokens,
        }
    }
}

/// Durable store of verified identities keyed by platform user ID.
pub struct UserRegistry {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl UserRegistry {
    /// Creates a registry backed by the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns all verified users. Order is not significant.
    ///
    /// A missing or corrupt backing store degrades to an empty list.
    pub async fn list(&self) -> Vec<VerifiedUser> {
        read_document(&self.path).await.unwrap_or_default()
    }

    /// Looks up a user by platform ID.
    pub async fn get_by_id(&self, id: &UserId) -> Option<VerifiedUser> {
        self.list().await.into_iter().find(|u| &u.id == id)
    }

    /// Inserts or replaces the record with the same ID.
    ///
    /// Idempotent; the last write wins with no field-level merge.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry document cannot be written.
    pub async fn upsert(&self, user: VerifiedUser) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<VerifiedUser> = read_document(&self.path).await.unwrap_or_default();

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => users.push(user),
        }

        write_document(&self.path, &users).await
    }

    /// Removes the record with `id`, succeeding whether or not it existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the registry document cannot be written.
    pub async fn delete(&self, id: &UserId) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut users: Vec<VerifiedUser> = read_document(&self.path).await.unwrap_or_default();
        users.retain(|u| &u.id != id);
        write_document(&self.path, &users).await
    }
}
