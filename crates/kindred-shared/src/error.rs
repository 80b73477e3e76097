use thiserror::Error;

/// A local, recoverable input problem. The user stays on the same step.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please add at least your main photo to continue")]
    MissingMainPhoto,

    #[error("Main photo is required")]
    MainPhotoRequired,

    #[error("{0} is required")]
    RequiredField(&'static str),

    #[error("Please enter a valid phone number")]
    InvalidPhoneNumber,

    #[error("Please enter complete OTP")]
    IncompleteOtp,

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("{field} exceeds {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Recording can be at most {max_secs} seconds")]
    RecordingTooLong { max_secs: u32 },

    #[error("Expected {expected} {field}, got {actual}")]
    WrongCount {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Photo already used in this profile")]
    DuplicatePhoto,

    #[error("Photo slot {0} does not exist")]
    SlotOutOfRange(usize),

    #[error("Face verification has not finished")]
    VerificationIncomplete,

    #[error("Input does not belong to this step")]
    WrongStep,
}
