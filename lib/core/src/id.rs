//! Strongly-typed ID types for platform entities.
//!
//! The guild platform assigns IDs transmitted as strings in every JSON
//! payload. IDs are kept as opaque strings end to end; the newtypes exist
//! so a guild ID cannot be passed where a user ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a strongly-typed ID wrapper around a platform ID string.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an ID from a raw platform ID string.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a platform user.
    UserId
);

define_id!(
    /// Unique identifier for a guild.
    GuildId
);

define_id!(
    /// Unique identifier for a role within a guild.
    RoleId
);

define_id!(
    /// Unique identifier for a channel within a guild.
    ChannelId
);
