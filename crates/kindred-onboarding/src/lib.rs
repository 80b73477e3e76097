//! # kindred-onboarding
//!
//! The onboarding and profile-setup wizard: a fixed, linear pipeline of
//! steps that each write their own slice of a [`ProfileDraft`], plus the
//! step-local state machines that need timers (OTP resend countdown, face
//! verification progress) and the photo grid editor.

pub mod otp;
pub mod photos;
pub mod steps;
pub mod verification;
pub mod wizard;

mod error;
mod input;

pub use error::{Result, WizardError};
pub use input::{normalize_phone_number, validate_otp, StepInput};
pub use kindred_shared::ProfileDraft;
pub use photos::PhotoGrid;
pub use steps::StepId;
pub use wizard::{Transition, Wizard};
