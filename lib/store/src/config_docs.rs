//! Guild configuration and embed presentation documents.
//!
//! Two independent documents with replace-on-save semantics: saving a
//! document replaces it wholesale, so callers must resupply every field
//! they intend to keep. On first boot a missing document is populated
//! with its fixed default rather than treated as an error.

use crate::document::{read_document, write_document};
use crate::error::StorageError;
use guildgate_core::ChannelId;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::Mutex;

/// Per-guild behaviour configuration.
///
/// Field names follow the on-disk JSON document (camelCase).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GuildConfig {
    /// Channel receiving verification log messages.
    pub log_channel: ChannelId,
    /// Role granted automatically after verification. Empty disables the
    /// auto-role grant entirely; this is configuration, not an error.
    pub auto_role: String,
    /// Welcome message template. `{user}` is replaced with the username.
    pub welcome_message: String,
    /// Channel receiving welcome messages.
    pub welcome_channel: ChannelId,
    /// Whether the verification embed preview is enabled.
    pub embed_preview: bool,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            log_channel: ChannelId::new(""),
            auto_role: String::new(),
            welcome_message: "Welcome {user} to the server!".to_string(),
            welcome_channel: ChannelId::new(""),
            embed_preview: true,
        }
    }
}

impl GuildConfig {
    /// Returns the configured auto-role, or `None` when disabled.
    #[must_use]
    pub fn auto_role(&self) -> Option<&str> {
        if self.auto_role.is_empty() {
            None
        } else {
            Some(&self.auto_role)
        }
    }

    /// Renders the welcome message template for a username.
    #[must_use]
    pub fn render_welcome(&self, username: &str) -> String {
        self.welcome_message.replace("{user}", username)
    }
}

/// Presentation of the verification embed shown in the guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedPresentation {
    pub title: String,
    pub description: String,
    /// Hex color string, e.g. `#5865F2`.
    pub color: String,
    pub footer: String,
    pub button_label: String,
    pub button_emoji: String,
}

impl Default for EmbedPresentation {
    fn default() -> Self {
        Self {
            title: "Verification".to_string(),
            description: "Click the button below to start your verification".to_string(),
            color: "#5865F2".to_string(),
            footer: "Guildgate".to_string(),
            button_label: "Verify".to_string(),
            button_emoji: "\u{2705}".to_string(),
        }
    }
}

/// A single flat configuration document backed by one JSON file.
///
/// `load` falls back to `T::default()` on a missing or corrupt file.
/// `save` is a full replacement with the atomic temp-write-and-rename
/// discipline from [`crate::document`]. A per-process mutex serializes
/// writers so concurrent saves cannot interleave on the temporary file.
pub struct DocumentStore<T> {
    path: PathBuf,
    write_lock: Mutex<()>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

impl<T> DocumentStore<T>
where
    T: Default + Serialize + DeserializeOwned,
{
    /// Creates a store for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
            _marker: std::marker::PhantomData,
        }
    }

    /// Loads the document, falling back to the fixed default.
    pub async fn load(&self) -> T {
        read_document(&self.path).await.unwrap_or_default()
    }

    /// Replaces the document with `value`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be written.
    pub async fn save(&self, value: &T) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        write_document(&self.path, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guild_config_cold_start_defaults() {
        let config = GuildConfig::default();
        assert_eq!(config.auto_role, "");
        assert!(config.embed_preview);
        assert!(config.auto_role().is_none());
    }

    #[test]
    fn embed_presentation_cold_start_defaults() {
        let embed = EmbedPresentation::default();
        assert_eq!(embed.color, "#5865F2");
        assert_eq!(embed.button_label, "Verify");
    }

    #[test]
    fn auto_role_present_when_configured() {
        let config = GuildConfig {
            auto_role: "777".to_string(),
            ..GuildConfig::default()
        };
        assert_eq!(config.auto_role(), Some("777"));
    }

    #[test]
    fn render_welcome_substitutes_username() {
        let config = GuildConfig::default();
        assert_eq!(config.render_welcome("alice"), "Welcome alice to the server!");
    }

    #[test]
    fn guild_config_uses_camel_case_fields() {
        let json = serde_json::to_value(GuildConfig::default()).expect("serialize");
        assert!(json.get("autoRole").is_some());
        assert!(json.get("embedPreview").is_some());
        assert!(json.get("welcomeMessage").is_some());
    }

    #[test]
    fn channel_ids_stay_plain_strings_in_the_document() {
        let config = GuildConfig {
            log_channel: ChannelId::new("4455"),
            welcome_channel: ChannelId::new("6677"),
            ..GuildConfig::default()
        };

        let json = serde_json::to_value(&config).expect("serialize");
        assert_eq!(json["logChannel"], "4455");
        assert_eq!(json["welcomeChannel"], "6677");

        let parsed: GuildConfig =
            serde_json::from_value(serde_json::json!({ "logChannel": "4455" })).expect("parse");
        assert_eq!(parsed.log_channel, ChannelId::new("4455"));
    }

    #[tokio::test]
    async fn missing_document_loads_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: DocumentStore<GuildConfig> = DocumentStore::new(dir.path().join("config.json"));

        let loaded = store.load().await;
        assert_eq!(loaded, GuildConfig::default());
    }

    #[tokio::test]
    async fn save_replaces_whole_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store: DocumentStore<GuildConfig> = DocumentStore::new(dir.path().join("config.json"));

        let first = GuildConfig {
            auto_role: "111".to_string(),
            log_channel: ChannelId::new("222"),
            ..GuildConfig::default()
        };
        store.save(&first).await.expect("save");

        // A save with only auto_role set must erase the log channel; this
        // is the documented replace-not-merge semantics.
        let second = GuildConfig {
            auto_role: "333".to_string(),
            ..GuildConfig::default()
        };
        store.save(&second).await.expect("save");

        let loaded = store.load().await;
        assert_eq!(loaded.auto_role, "333");
        assert_eq!(loaded.log_channel, ChannelId::new(""));
    }

    #[tokio::test]
    async fn corrupt_document_loads_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("embed.json");
        tokio::fs::write(&path, b"][").await.expect("write");

        let store: DocumentStore<EmbedPresentation> = DocumentStore::new(path);
        let loaded = store.load().await;
        assert_eq!(loaded, EmbedPresentation::default());
    }

    #[tokio::test]
    async fn documents_are_independent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config_store: DocumentStore<GuildConfig> =
            DocumentStore::new(dir.path().join("config.json"));
        let embed_store: DocumentStore<EmbedPresentation> =
            DocumentStore::new(dir.path().join("embed.json"));

        let config = GuildConfig {
            auto_role: "777".to_string(),
            ..GuildConfig::default()
        };
        config_store.save(&config).await.expect("save");

        // Saving one document does not touch the other.
        assert_eq!(embed_store.load().await, EmbedPresentation::default());
        assert_eq!(config_store.load().await.auto_role, "777");
    }
}
