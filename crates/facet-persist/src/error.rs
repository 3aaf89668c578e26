//! Persistence error types.
//!
//! Sink writes can fail (a full store, an unwritable file). Callers in the
//! commit path log these and carry on; the live UI never depends on a
//! successful write.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized for storage.
    #[error("Failed to encode value for key {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The store file exists but is not a JSON object of strings.
    #[error("Store file is not readable: {path}")]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the entry would exceed the store's byte quota.
    #[error("Store quota exceeded writing {key} ({required} of {limit} bytes)")]
    QuotaExceeded {
        key: String,
        limit: usize,
        required: usize,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete store write")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistError {
    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::Encode { key, .. } => {
                format!("The value for '{key}' could not be saved.")
            }
            Self::Decode { path, .. } => {
                format!(
                    "The saved filters at {} could not be read and were ignored.",
                    path.display()
                )
            }
            Self::QuotaExceeded { key, .. } => {
                format!("There is no room left to remember '{key}'. Filters still apply.")
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::Encode { .. } => None,
            Self::Decode { .. } => Some("Delete the store file to start fresh.".into()),
            Self::QuotaExceeded { .. } => {
                Some("Reset filters or clear saved data for this site.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or choose a different store location.".into())
            }
        }
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistError>;
