use kindred_shared::ValidationError;
use thiserror::Error;

use crate::steps::StepId;

/// Errors produced by wizard navigation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    /// Required input missing or malformed; the wizard did not move.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// `retreat()` on the first step.
    #[error("Already at the first step")]
    AtFirstStep,

    #[error("Step {0} cannot be skipped")]
    NotSkippable(StepId),

    /// The terminal step was committed; the wizard accepts no more input.
    #[error("Wizard already finished")]
    Finished,
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WizardError>;
