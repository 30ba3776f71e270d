//! Error types for preference storage and messaging

use std::path::PathBuf;
use thiserror::Error;

/// Errors during preference persistence
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to locate the configuration directory: {0}")]
    ConfigPath(#[source] confy::ConfyError),

    #[error("failed to load preferences from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },

    #[error("failed to save preferences to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: confy::ConfyError,
    },
}

/// Errors on the preferences request/response channel
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    #[error("preferences service is not running")]
    Closed,

    #[error("preferences queue is full")]
    Full,

    #[error("preferences service dropped the request without replying")]
    NoReply,
}

/// Errors decoding or encoding wire messages
#[derive(Debug, Error)]
pub enum WireError {
    #[error("malformed preferences message")]
    Json(#[from] serde_json::Error),
}
