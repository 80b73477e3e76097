use kindred_shared::types::MessageId;
use thiserror::Error;

/// Errors produced by a chat session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    /// The session was torn down.
    #[error("Chat session is closed")]
    Closed,

    #[error("A voice message is already being recorded")]
    RecordingInProgress,

    #[error("No voice message is being recorded")]
    NotRecording,

    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ChatError>;
