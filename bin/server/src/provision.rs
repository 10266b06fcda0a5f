//! Guild-membership provisioning from stored delegated tokens.
//!
//! "Pull" means adding an already-verified user to a guild with the access
//! token they consented during verification. A user without a stored token
//! cannot be pulled; that case is decided from the registry alone, before
//! any platform traffic.

use guildgate_core::{GuildId, UserId};
use guildgate_platform::{PlatformClient, ProvisionError};
use guildgate_store::UserRegistry;
use std::sync::Arc;

/// Provisions guild membership for verified users.
pub struct Provisioner {
    registry: Arc<UserRegistry>,
    platform: Arc<PlatformClient>,
}

impl Provisioner {
    /// Creates a provisioner over the registry and platform client.
    #[must_use]
    pub fn new(registry: Arc<UserRegistry>, platform: Arc<PlatformClient>) -> Self {
        Self { registry, platform }
    }

    /// Pulls a verified user into `guild_id` using their stored token.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError::TokenMissing`] when the user is unknown or
    /// has no usable token; platform rejections are classified by the
    /// client.
    pub async fn pull(&self, guild_id: &GuildId, user_id: &UserId) -> Result<(), ProvisionError> {
        let user = self
            .registry
            .get_by_id(user_id)
            .await
            .filter(|u| u.tokens.is_present())
            .ok_or_else(|| ProvisionError::TokenMissing {
                user_id: user_id.clone(),
            })?;

        self.platform
            .add_guild_member(guild_id, user_id, user.tokens.access_token())
            .await?;

        tracing::info!(user = %user_id, guild = %guild_id, "user pulled into guild");
        Ok(())
    }
}
