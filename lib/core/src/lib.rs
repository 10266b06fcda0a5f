//! Core domain types for the guildgate service.
//!
//! This crate provides the strongly-typed platform IDs shared across the
//! guildgate verification and provisioning pipeline.

pub mod id;

pub use id::{ChannelId, GuildId, RoleId, UserId};
