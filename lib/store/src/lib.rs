//! Flat-document persistence for the guildgate service.
//!
//! All durable state lives in three independent JSON documents on disk:
//! the verified-user list, the guild configuration, and the embed
//! presentation. Each document is loadable and savable in isolation.
//!
//! # Durability discipline
//!
//! Writes never modify a document in place. The new content is written to
//! a temporary file in the same directory and atomically renamed over the
//! target, so a crash mid-write leaves the previous document intact.
//! Reads on a missing or corrupt document degrade to an empty collection
//! or the fixed default rather than failing the caller.

pub mod config_docs;
pub mod document;
pub mod error;
pub mod registry;

pub use config_docs::{DocumentStore, EmbedPresentation, GuildConfig};
pub use error::StorageError;
pub use registry::{DelegatedTokens, UserRegistry, VerifiedUser};
