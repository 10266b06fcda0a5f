//! Error types for platform provisioning and moderation calls.

use guildgate_core::{GuildId, UserId};
use std::fmt;

/// Errors from guild provisioning and moderation operations.
///
/// These surface directly to the administrator caller; none of them
/// triggers an automatic retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisionError {
    /// The user has no stored delegated access token.
    TokenMissing { user_id: UserId },
    /// The platform rejected the delegated or bot credential.
    TokenExpired,
    /// The platform refused the operation for lack of permission.
    Forbidden { action: String },
    /// The guild (or the member within it) could not be resolved.
    GuildUnavailable { guild_id: GuildId },
    /// Any other upstream rejection, including transport failures.
    UpstreamRejected {
        /// HTTP status, when a response was received at all.
        status: Option<u16>,
        reason: String,
    },
}

impl fmt::Display for ProvisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TokenMissing { user_id } => {
                write!(f, "no delegated access token stored for user '{user_id}'")
            }
            Self::TokenExpired => {
                write!(f, "the platform rejected the credential as invalid or expired")
            }
            Self::Forbidden { action } => {
                write!(f, "the platform refused '{action}': missing permission")
            }
            Self::GuildUnavailable { guild_id } => {
                write!(f, "guild '{guild_id}' (or the target member) was not found")
            }
            Self::UpstreamRejected { status, reason } => {
                if let Some(status) = status {
                    write!(f, "platform rejected the call ({status}): {reason}")
                } else {
                    write!(f, "platform call failed: {reason}")
                }
            }
        }
    }
}

impl std::error::Error for ProvisionError {}
