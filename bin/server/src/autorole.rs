//! Automatic role grant after verification.
//!
//! The grant runs as a detached task so verification never waits on the
//! platform. Its outcome is logged and otherwise discarded; the user is
//! verified either way.

use guildgate_core::{GuildId, RoleId, UserId};
use guildgate_platform::{PlatformClient, ProvisionError};
use guildgate_store::GuildConfig;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on a single grant attempt, read-then-assign included.
const GRANT_TIMEOUT: Duration = Duration::from_secs(10);

/// Spawns the auto-role grant for a freshly verified user.
///
/// No-op when the guild configuration has no auto-role. The caller never
/// awaits the spawned task.
pub fn grant_on_verify(
    platform: Arc<PlatformClient>,
    guild_id: GuildId,
    user_id: UserId,
    username: String,
    config: GuildConfig,
) {
    let Some(role) = config.auto_role() else {
        tracing::debug!(user = %user_id, "no auto-role configured, skipping grant");
        return;
    };
    let role_id = RoleId::new(role);
    let welcome = config.render_welcome(&username);

    tokio::spawn(async move {
        let attempt = tokio::time::timeout(
            GRANT_TIMEOUT,
            grant(&platform, &guild_id, &user_id, &role_id),
        )
        .await;

        match attempt {
            Ok(Ok(granted)) => {
                if granted {
                    tracing::info!(
                        user = %user_id,
                        role = %role_id,
                        guild = %guild_id,
                        welcome = %welcome,
                        "auto-role granted",
                    );
                } else {
                    tracing::debug!(user = %user_id, role = %role_id, "member already holds auto-role");
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(user = %user_id, role = %role_id, error = %e, "auto-role grant failed");
            }
            Err(_) => {
                tracing::warn!(user = %user_id, role = %role_id, "auto-role grant timed out");
            }
        }
    });
}

/// Grants the role unless the member already holds it.
///
/// Returns `Ok(true)` when the role was assigned and `Ok(false)` when the
/// member already had it.
async fn grant(
    platform: &PlatformClient,
    guild_id: &GuildId,
    user_id: &UserId,
    role_id: &RoleId,
) -> Result<bool, ProvisionError> {
    let member = platform.get_guild_member(guild_id, user_id).await?;
    if member.has_role(role_id) {
        return Ok(false);
    }

    platform.add_member_role(guild_id, user_id, role_id).await?;
    Ok(true)
}
