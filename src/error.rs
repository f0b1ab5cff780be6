//! Error types for blobsync

use thiserror::Error;

/// Result type alias for blobsync operations
pub type Result<T> = std::result::Result<T, SyncError>;

/// Main error type for blobsync
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Remote lookup error: {0}")]
    RemoteLookup(String),

    #[error("Remote write error: {0}")]
    RemoteWrite(String),

    #[error("User callback error: {0}")]
    Callback(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Stable marker per error kind, for scripting on outcome logs
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Config(_) => "config",
            SyncError::UnsupportedInput(_) => "unsupported_input",
            SyncError::RemoteLookup(_) => "remote_lookup",
            SyncError::RemoteWrite(_) => "remote_write",
            SyncError::Callback(_) => "callback",
            SyncError::Io(_) => "io",
        }
    }

    /// Check if the error aborts the whole run rather than a single file
    pub fn is_run_fatal(&self) -> bool {
        matches!(self, SyncError::Config(_))
    }
}
