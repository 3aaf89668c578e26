//! Synchronization error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    /// The live value could not be serialized into an entry.
    #[error("failed to encode live value for {key}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SyncError>;
