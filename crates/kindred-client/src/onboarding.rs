//! The onboarding wizard wired to its collaborators.
//!
//! [`kindred_onboarding::Wizard`] decides navigation and validation; this
//! service performs the I/O around it: sending and checking the OTP,
//! fetching photos, running face verification and committing the finished
//! draft. A collaborator failure never moves the wizard.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use kindred_onboarding::otp::OtpSession;
use kindred_onboarding::verification::{FaceVerification, VerificationEvent};
use kindred_onboarding::wizard::WizardView;
use kindred_onboarding::{normalize_phone_number, validate_otp, PhotoGrid, StepId, StepInput, Transition, Wizard};
use kindred_shared::constants::FACE_VERIFICATION_SETTLE;
use kindred_shared::types::{MediaRef, ProfileId};
use kindred_shared::ValidationError;

use crate::collaborators::{AuthService, Collaborators, FaceVerifier, MediaSource, ProfileStore};
use crate::config::ClientConfig;
use crate::error::ServiceError;

/// Where a photo comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSource {
    Camera,
    Library,
}

/// Result of a forward move through the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Moved(StepId),
    /// The terminal step was passed and the profile persisted.
    Committed(ProfileId),
}

pub struct OnboardingService {
    wizard: Wizard,
    grid: PhotoGrid,
    otp: Option<OtpSession>,
    otp_resend_secs: u32,
    auth: Arc<dyn AuthService>,
    media: Arc<dyn MediaSource>,
    faces: Arc<dyn FaceVerifier>,
    profiles: Arc<dyn ProfileStore>,
}

impl OnboardingService {
    pub fn new(collaborators: &Collaborators, config: &ClientConfig) -> Self {
        Self::with_wizard(Wizard::new(), collaborators, config)
    }

    pub fn with_wizard(wizard: Wizard, collaborators: &Collaborators, config: &ClientConfig) -> Self {
        Self {
            grid: wizard.photo_grid(),
            wizard,
            otp: None,
            otp_resend_secs: config.otp_resend_secs,
            auth: collaborators.auth.clone(),
            media: collaborators.media.clone(),
            faces: collaborators.faces.clone(),
            profiles: collaborators.profiles.clone(),
        }
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    pub fn view(&self) -> WizardView {
        self.wizard.view()
    }

    pub fn otp(&self) -> Option<&OtpSession> {
        self.otp.as_ref()
    }

    /// The OTP countdown, for a driver to advance.
    pub fn otp_mut(&mut self) -> Option<&mut OtpSession> {
        self.otp.as_mut()
    }

    pub fn photo_grid(&self) -> &PhotoGrid {
        &self.grid
    }

    pub fn photo_grid_mut(&mut self) -> &mut PhotoGrid {
        &mut self.grid
    }

    // -----------------------------------------------------------------------
    // Phone number and OTP
    // -----------------------------------------------------------------------

    /// Send a code to the number and move to OTP entry.
    pub async fn submit_phone(&mut self, country_code: &str, number: &str) -> Result<StepId, ServiceError> {
        self.expect_step(StepId::PhoneNumber)?;
        let phone = normalize_phone_number(country_code, number)?;
        self.auth.send_otp(&phone).await?;

        let step = self.advance_wizard(StepInput::PhoneNumber {
            country_code: country_code.to_string(),
            number: number.to_string(),
        })?;
        if let Some(old) = self.otp.as_mut() {
            old.close();
        }
        self.otp = Some(OtpSession::with_resend_secs(phone, self.otp_resend_secs));
        Ok(step)
    }

    /// Send a new code once the countdown allows it.
    pub async fn resend_otp(&mut self) -> Result<bool, ServiceError> {
        let otp = self.otp.as_mut().ok_or(ServiceError::NotReady("no code was sent"))?;
        if !otp.can_resend() {
            return Ok(false);
        }
        let phone = otp.phone_number().to_string();
        self.auth.send_otp(&phone).await?;
        if let Some(otp) = self.otp.as_mut() {
            otp.resend();
        }
        Ok(true)
    }

    /// Check `code` with the auth service and move on when it matches.
    pub async fn verify_otp(&mut self, code: &str) -> Result<StepId, ServiceError> {
        self.expect_step(StepId::OtpVerification)?;
        validate_otp(code)?;
        let phone = self
            .otp
            .as_ref()
            .map(|o| o.phone_number().to_string())
            .ok_or(ServiceError::NotReady("no code was sent"))?;

        if !self.auth.verify_otp(&phone, code.trim()).await? {
            info!(phone = %phone, "OTP rejected");
            return Err(ValidationError::InvalidOtp.into());
        }

        let step = self.advance_wizard(StepInput::Otp {
            code: code.trim().to_string(),
        })?;
        if let Some(mut otp) = self.otp.take() {
            otp.close();
        }
        Ok(step)
    }

    // -----------------------------------------------------------------------
    // Photos
    // -----------------------------------------------------------------------

    /// Fetch a photo and put it into the grid: the main slot when `slot` is
    /// `None`, otherwise the given additional slot.
    pub async fn add_photo(&mut self, source: PhotoSource, slot: Option<usize>) -> Result<MediaRef, ServiceError> {
        let photo = match source {
            PhotoSource::Camera => self.media.capture_image().await?,
            PhotoSource::Library => self.media.pick_image().await?,
        };
        match slot {
            None => self.grid.set_main(photo.clone())?,
            Some(index) => self.grid.set_slot(index, photo.clone())?,
        };
        debug!(photo = %photo, slot = ?slot, "Photo added");
        Ok(photo)
    }

    /// Submit the grid on a photo step.
    pub async fn submit_photos(&mut self) -> Result<StepOutcome, ServiceError> {
        self.submit(StepInput::Photos(self.grid.clone())).await
    }

    // -----------------------------------------------------------------------
    // Face verification
    // -----------------------------------------------------------------------

    /// Run a verification to completion and move past the step.
    pub async fn run_face_verification(&mut self) -> Result<StepId, ServiceError> {
        self.expect_step(StepId::FaceVerification)?;
        let mut run = FaceVerification::external();
        run.start();

        let mut progress = self.faces.run_verification().await?;
        while let Some(p) = progress.next().await {
            for event in run.report(p) {
                if let VerificationEvent::Progress(p) = event {
                    debug!(progress = p, status = run.status_message(), "Face verification progress");
                }
            }
        }

        if run.next_deadline().is_some() {
            tokio::time::sleep(FACE_VERIFICATION_SETTLE).await;
            run.advance(FACE_VERIFICATION_SETTLE);
        }
        if !run.is_complete() {
            run.cancel();
            warn!(progress = run.progress(), "Face verification ended early");
            return Err(ValidationError::VerificationIncomplete.into());
        }

        self.advance_wizard(StepInput::FaceVerification {
            progress: run.progress(),
        })
    }

    // -----------------------------------------------------------------------
    // Generic navigation
    // -----------------------------------------------------------------------

    /// Submit the input of the current step. Passing the terminal step
    /// commits the draft; if that fails the wizard stays on it.
    pub async fn submit(&mut self, input: StepInput) -> Result<StepOutcome, ServiceError> {
        let transition = self.wizard.advance(input)?;
        self.settle(transition).await
    }

    pub async fn skip(&mut self) -> Result<StepOutcome, ServiceError> {
        let transition = self.wizard.skip()?;
        self.settle(transition).await
    }

    pub fn retreat(&mut self) -> Result<StepId, ServiceError> {
        let step = self.wizard.retreat()?;
        if matches!(step, StepId::PhotoUpload | StepId::PhotoGrid) {
            self.grid = self.wizard.photo_grid();
        }
        Ok(step)
    }

    async fn settle(&mut self, transition: Transition) -> Result<StepOutcome, ServiceError> {
        match transition {
            Transition::Moved(step) => Ok(StepOutcome::Moved(step)),
            Transition::Completed(draft) => match self.profiles.commit_profile(&draft).await {
                Ok(id) => {
                    info!(profile = %id, "Onboarding finished");
                    Ok(StepOutcome::Committed(id))
                }
                Err(e) => {
                    warn!(error = %e, "Profile commit failed, draft kept");
                    self.wizard.reopen();
                    Err(e.into())
                }
            },
        }
    }

    /// Advance a step that never completes the wizard.
    fn advance_wizard(&mut self, input: StepInput) -> Result<StepId, ServiceError> {
        match self.wizard.advance(input)? {
            Transition::Moved(step) => Ok(step),
            Transition::Completed(_) => Err(ServiceError::NotReady("unexpected completion")),
        }
    }

    fn expect_step(&self, step: StepId) -> Result<(), ServiceError> {
        if self.wizard.is_finished() {
            return Err(kindred_onboarding::WizardError::Finished.into());
        }
        if self.wizard.current() != step {
            return Err(ValidationError::WrongStep.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use kindred_onboarding::ProfileDraft;

    use super::*;
    use crate::mock::{in_memory_collaborators, InMemoryProfileStore, DEMO_OTP};

    fn resumed_at(step: StepId) -> Wizard {
        let mut draft = ProfileDraft::new();
        draft.main_photo = Some(MediaRef::new("https://img.example/main.jpg"));
        Wizard::resume(draft, step).unwrap()
    }

    fn service() -> OnboardingService {
        OnboardingService::new(
            &in_memory_collaborators(&ClientConfig::default()),
            &ClientConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_phone_and_otp() {
        let mut svc = service();
        assert!(matches!(
            svc.submit_phone("+1", "555-123").await,
            Err(ServiceError::Wizard(_))
        ));
        assert_eq!(svc.wizard().current(), StepId::PhoneNumber);

        let step = svc.submit_phone("+1", "555 123 4567").await.unwrap();
        assert_eq!(step, StepId::OtpVerification);
        assert_eq!(svc.otp().unwrap().seconds_left(), 60);
        assert!(!svc.resend_otp().await.unwrap());

        let err = svc.verify_otp("54321").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Wizard(kindred_onboarding::WizardError::Validation(
                ValidationError::InvalidOtp
            ))
        ));
        assert_eq!(svc.wizard().current(), StepId::OtpVerification);

        assert_eq!(svc.verify_otp(DEMO_OTP).await.unwrap(), StepId::PhotoUpload);
        assert!(svc.otp().is_none());
        assert!(svc.wizard().draft().phone_verified);
        assert_eq!(
            svc.wizard().draft().phone_number.as_deref(),
            Some("+15551234567")
        );
    }

    #[tokio::test]
    async fn test_photos_require_main() {
        let mut svc = OnboardingService::with_wizard(
            Wizard::resume(ProfileDraft::new(), StepId::PhotoUpload).unwrap(),
            &in_memory_collaborators(&ClientConfig::default()),
            &ClientConfig::default(),
        );
        svc.add_photo(PhotoSource::Library, Some(0)).await.unwrap();
        assert!(svc.submit_photos().await.is_err());
        assert_eq!(svc.wizard().current(), StepId::PhotoUpload);

        svc.add_photo(PhotoSource::Camera, None).await.unwrap();
        assert_eq!(
            svc.submit_photos().await.unwrap(),
            StepOutcome::Moved(StepId::AddPrompt)
        );
        assert_eq!(svc.wizard().draft().photos.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_face_verification_step() {
        let mut svc = OnboardingService::with_wizard(
            resumed_at(StepId::FaceVerification),
            &in_memory_collaborators(&ClientConfig::default()),
            &ClientConfig::default(),
        );
        assert_eq!(svc.run_face_verification().await.unwrap(), StepId::Identity);
        assert!(svc.wizard().draft().face_verified);
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_draft() {
        let store = Arc::new(InMemoryProfileStore::new());
        let mut collaborators = in_memory_collaborators(&ClientConfig::default());
        collaborators.profiles = store.clone() as Arc<dyn ProfileStore>;
        let mut svc = OnboardingService::with_wizard(
            resumed_at(StepId::Ethnicity),
            &collaborators,
            &ClientConfig::default(),
        );

        store.fail_next_commit();
        let input = StepInput::Ethnicity("South Asian".into());
        assert!(matches!(
            svc.submit(input.clone()).await,
            Err(ServiceError::Collaborator(_))
        ));
        assert!(!svc.wizard().is_finished());
        assert_eq!(svc.wizard().current(), StepId::Ethnicity);

        let StepOutcome::Committed(id) = svc.submit(input).await.unwrap() else {
            panic!("expected commit");
        };
        assert_eq!(
            store.get(id).unwrap().draft.ethnicity.as_deref(),
            Some("South Asian")
        );
    }
}
