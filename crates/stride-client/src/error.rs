use thiserror::Error;

use stride_shared::types::PostId;
use stride_shared::ModelError;
use stride_store::StoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, timeout...).
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server responded {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the JSON we expected.
    #[error("Invalid response payload: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("No user is signed in")]
    NotLoggedIn,

    #[error("Cannot open a conversation with yourself")]
    SelfChat,

    #[error("Post {0} is not in the feed")]
    UnknownPost(PostId),

    /// A previous submission of the same action is still in flight.
    #[error("Another request is already in progress")]
    Busy,

    #[error("Local cache error: {0}")]
    Store(#[from] StoreError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;
