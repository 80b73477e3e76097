use thiserror::Error;

use kindred_chat::ChatError;
use kindred_onboarding::WizardError;
use kindred_shared::ValidationError;

/// Failures reported by a collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollaboratorError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The collaborator's task or channel is gone.
    #[error("Collaborator unavailable")]
    Unavailable,
}

/// A configuration value that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

/// Errors from the services that combine cores and collaborators.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Chat(#[from] ChatError),

    #[error("Collaborator error: {0}")]
    Collaborator(#[from] CollaboratorError),

    /// The operation needs state that an earlier step creates.
    #[error("Not ready: {0}")]
    NotReady(&'static str),
}

impl From<ValidationError> for ServiceError {
    fn from(e: ValidationError) -> Self {
        ServiceError::Wizard(WizardError::Validation(e))
    }
}
