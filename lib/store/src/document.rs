//! Atomic read/write primitives for flat JSON documents.

use crate::error::StorageError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Reads a document from disk.
///
/// Returns `None` when the file is missing or unreadable, and when the
/// content does not parse as `T`. A corrupt document is logged; a missing
/// one is the normal cold-start case and is not.
pub async fn read_document<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to read document");
            return None;
        }
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "document is corrupt, falling back to default"
            );
            None
        }
    }
}

/// Writes a document to disk via a temporary file and atomic rename.
///
/// The parent directory is created if missing. The temporary file lives in
/// the same directory as the target so the rename stays on one filesystem.
///
/// # Errors
///
/// Returns an error if serialization, the temporary write, or the final
/// rename fails.
pub async fn write_document<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(value).map_err(|e| StorageError::Serialize {
        reason: e.to_string(),
    })?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::WriteFailed {
                path: parent.display().to_string(),
                reason: e.to_string(),
            })?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes)
        .await
        .map_err(|e| StorageError::WriteFailed {
            path: tmp.display().to_string(),
            reason: e.to_string(),
        })?;

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StorageError::ReplaceFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}
