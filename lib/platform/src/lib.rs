//! Guild platform REST client for the guildgate service.
//!
//! This crate wraps the platform's guild-management API: adding a member
//! to a guild (authorized jointly by the service's bot credential and the
//! member's delegated token), granting roles, and the one-shot moderation
//! actions (ban, kick, timeout) authorized by the bot credential alone.
//!
//! The platform is treated as an opaque external API. Every call carries
//! the client-wide request timeout; there is no retry. A failed call is
//! surfaced to the caller, who may re-invoke.

pub mod client;
pub mod error;

pub use client::{GuildMember, PlatformClient};
pub use error::ProvisionError;
