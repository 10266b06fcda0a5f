//! Error types for the store crate.
//!
//! Reads degrade to defaults and never produce these errors; only write
//! failures propagate to the initiating request.

use std::fmt;

/// Errors from persisting a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Serializing the document to JSON failed.
    Serialize { reason: String },
    /// Writing the temporary file failed.
    WriteFailed { path: String, reason: String },
    /// Atomically replacing the target document failed.
    ReplaceFailed { path: String, reason: String },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serialize { reason } => {
                write!(f, "failed to serialize document: {reason}")
            }
            Self::WriteFailed { path, reason } => {
                write!(f, "failed to write '{path}': {reason}")
            }
            Self::ReplaceFailed { path, reason } => {
                write!(f, "failed to replace '{path}': {reason}")
            }
        }
    }
}

impl std::error::Error for StorageError {}
