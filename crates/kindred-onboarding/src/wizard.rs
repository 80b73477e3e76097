//! Wizard Flow Controller.
//!
//! Holds the draft and the current step and decides where navigation goes.
//! A failed `advance` leaves both untouched, so a validation error never
//! exposes a half-merged draft.

use serde::Serialize;
use tracing::{debug, info, warn};

use kindred_shared::{ProfileDraft, ValidationError};

use crate::error::{Result, WizardError};
use crate::input::StepInput;
use crate::photos::PhotoGrid;
use crate::steps::{progress_fraction, StepId};

/// Outcome of a forward move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Now showing this step.
    Moved(StepId),
    /// The terminal step was passed; hand the draft to profile persistence.
    Completed(ProfileDraft),
}

/// UI snapshot of the wizard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardView {
    pub step: StepId,
    pub title: &'static str,
    pub progress: f32,
    pub skippable: bool,
    pub can_go_back: bool,
    pub finished: bool,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    draft: ProfileDraft,
    current: StepId,
    finished: bool,
}

impl Wizard {
    /// Start a new run on the first step with an empty draft.
    pub fn new() -> Self {
        Self {
            draft: ProfileDraft::new(),
            current: StepId::FIRST,
            finished: false,
        }
    }

    /// Continue a run at `step` with a draft assembled earlier, e.g. the
    /// profile questionnaire after a sign-in that already verified the phone
    /// number. Steps past the photo pipeline need a main photo in the draft.
    pub fn resume(draft: ProfileDraft, step: StepId) -> Result<Self> {
        if step > StepId::PhotoGrid && !draft.has_main_photo() {
            warn!(step = %step, "Cannot resume past the photo steps without a main photo");
            return Err(ValidationError::MissingMainPhoto.into());
        }
        Ok(Self {
            draft,
            current: step,
            finished: false,
        })
    }

    pub fn current(&self) -> StepId {
        self.current
    }

    pub fn draft(&self) -> &ProfileDraft {
        &self.draft
    }

    pub fn into_draft(self) -> ProfileDraft {
        self.draft
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn progress(&self) -> f32 {
        progress_fraction(self.current)
    }

    /// Photo grid prefilled from the draft for the photo steps.
    pub fn photo_grid(&self) -> PhotoGrid {
        PhotoGrid::from_draft(&self.draft)
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            step: self.current,
            title: self.current.title(),
            progress: self.progress(),
            skippable: self.current.is_skippable(),
            can_go_back: self.current.previous().is_some() && !self.finished,
            finished: self.finished,
        }
    }

    /// Validate `input` against the current step, merge it and move on.
    pub fn advance(&mut self, input: StepInput) -> Result<Transition> {
        self.ensure_open()?;

        if !input.belongs_to(self.current) {
            warn!(step = %self.current, "Input submitted on the wrong step");
            return Err(ValidationError::WrongStep.into());
        }
        if let Err(e) = input.validate() {
            debug!(step = %self.current, error = %e, "Step validation failed");
            return Err(e.into());
        }

        input.apply(&mut self.draft);
        Ok(self.move_forward())
    }

    /// Move on without writing anything for the current step.
    pub fn skip(&mut self) -> Result<Transition> {
        self.ensure_open()?;
        if !self.current.is_skippable() {
            return Err(WizardError::NotSkippable(self.current));
        }
        debug!(step = %self.current, "Step skipped");
        Ok(self.move_forward())
    }

    /// Go back one step. The draft is kept as is.
    pub fn retreat(&mut self) -> Result<StepId> {
        self.ensure_open()?;
        let previous = self.current.previous().ok_or(WizardError::AtFirstStep)?;
        debug!(from = %self.current, to = %previous, "Step retreated");
        self.current = previous;
        Ok(previous)
    }

    /// Undo completion when the draft could not be persisted. The wizard
    /// stays on the terminal step with the draft intact.
    pub fn reopen(&mut self) {
        if self.finished {
            self.finished = false;
            warn!(step = %self.current, "Wizard reopened after failed commit");
        }
    }

    fn move_forward(&mut self) -> Transition {
        match self.current.next() {
            Some(next) => {
                info!(
                    from = %self.current,
                    to = %next,
                    progress = progress_fraction(next),
                    "Step advanced"
                );
                self.current = next;
                Transition::Moved(next)
            }
            None => {
                self.finished = true;
                info!(
                    name = self.draft.display_name().unwrap_or("-"),
                    "Profile draft completed"
                );
                Transition::Completed(self.draft.clone())
            }
        }
    }

    fn ensure_open(&self) -> Result<()> {
        if self.finished {
            Err(WizardError::Finished)
        } else {
            Ok(())
        }
    }
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use kindred_shared::profile::{ChildrenStatus, Family, Identity};
    use kindred_shared::types::MediaRef;

    use super::*;

    fn main_photo_grid() -> PhotoGrid {
        let mut grid = PhotoGrid::new();
        grid.set_main(MediaRef::new("https://img.example/main.jpg"))
            .unwrap();
        grid
    }

    fn wizard_at(step: StepId) -> Wizard {
        let mut draft = ProfileDraft::new();
        if step > StepId::PhotoGrid {
            draft.main_photo = Some(MediaRef::new("https://img.example/main.jpg"));
        }
        Wizard::resume(draft, step).unwrap()
    }

    #[test]
    fn test_resume_past_photos_needs_main_photo() {
        let err = Wizard::resume(ProfileDraft::new(), StepId::FaceVerification).unwrap_err();
        assert_eq!(err, WizardError::Validation(ValidationError::MissingMainPhoto));
        assert!(Wizard::resume(ProfileDraft::new(), StepId::Ethnicity).is_err());

        let wizard = Wizard::resume(ProfileDraft::new(), StepId::PhotoGrid).unwrap();
        assert_eq!(wizard.current(), StepId::PhotoGrid);
        assert_eq!(wizard_at(StepId::FaceVerification).current(), StepId::FaceVerification);
    }

    #[test]
    fn test_photo_upload_requires_main_photo() {
        let mut wizard = wizard_at(StepId::PhotoUpload);
        let err = wizard
            .advance(StepInput::Photos(PhotoGrid::new()))
            .unwrap_err();
        assert_eq!(err, WizardError::Validation(ValidationError::MissingMainPhoto));
        assert_eq!(wizard.current(), StepId::PhotoUpload);
        assert!(wizard.draft().main_photo.is_none());

        let t = wizard.advance(StepInput::Photos(main_photo_grid())).unwrap();
        assert_eq!(t, Transition::Moved(StepId::AddPrompt));
        assert!(wizard.draft().has_main_photo());
    }

    #[test]
    fn test_wrong_step_input_rejected() {
        let mut wizard = Wizard::new();
        let err = wizard
            .advance(StepInput::Location("Jaipur".into()))
            .unwrap_err();
        assert_eq!(err, WizardError::Validation(ValidationError::WrongStep));
        assert_eq!(wizard.current(), StepId::PhoneNumber);
    }

    #[test]
    fn test_retreat_preserves_draft() {
        let mut wizard = wizard_at(StepId::Identity);
        let identity = StepInput::Identity(Identity {
            first_name: "Amara".into(),
            ..Identity::default()
        });
        wizard.advance(identity.clone()).unwrap();
        let family = StepInput::Family(Family {
            has_children: Some(ChildrenStatus::No),
            family_plans: None,
        });
        wizard.advance(family.clone()).unwrap();
        let once = wizard.draft().clone();

        assert_eq!(wizard.retreat().unwrap(), StepId::Family);
        assert_eq!(wizard.draft(), &once);
        wizard.advance(family).unwrap();
        assert_eq!(wizard.draft(), &once);
        assert_eq!(wizard.current(), StepId::Location);
    }

    #[test]
    fn test_retreat_at_first_step() {
        let mut wizard = Wizard::new();
        assert_eq!(wizard.retreat(), Err(WizardError::AtFirstStep));
        assert_eq!(wizard.current(), StepId::PhoneNumber);
    }

    #[test]
    fn test_skip_rules() {
        let mut wizard = Wizard::new();
        assert_eq!(
            wizard.skip(),
            Err(WizardError::NotSkippable(StepId::PhoneNumber))
        );

        let mut wizard = wizard_at(StepId::Interests);
        assert_eq!(wizard.skip().unwrap(), Transition::Moved(StepId::Pronouns));
        assert!(wizard.draft().interests.is_empty());
    }

    #[test]
    fn test_terminal_step_completes() {
        let mut wizard = wizard_at(StepId::Ethnicity);
        let t = wizard
            .advance(StepInput::Ethnicity("Asian".into()))
            .unwrap();
        match t {
            Transition::Completed(draft) => assert_eq!(draft.ethnicity.as_deref(), Some("Asian")),
            other => panic!("expected completion, got {other:?}"),
        }
        assert!(wizard.is_finished());
        assert_eq!(wizard.skip(), Err(WizardError::Finished));
        assert_eq!(wizard.retreat(), Err(WizardError::Finished));

        wizard.reopen();
        assert_eq!(wizard.current(), StepId::Ethnicity);
        assert_eq!(wizard.draft().ethnicity.as_deref(), Some("Asian"));
        assert!(wizard.skip().is_ok());
    }

    #[test]
    fn test_face_verification_needs_full_progress() {
        let mut wizard = wizard_at(StepId::FaceVerification);
        let err = wizard
            .advance(StepInput::FaceVerification { progress: 99 })
            .unwrap_err();
        assert_eq!(
            err,
            WizardError::Validation(ValidationError::VerificationIncomplete)
        );
        wizard
            .advance(StepInput::FaceVerification { progress: 100 })
            .unwrap();
        assert!(wizard.draft().face_verified);
    }

    #[test]
    fn test_view_reflects_step() {
        let mut wizard = wizard_at(StepId::Interests);
        let tags: BTreeSet<String> = ["Music", "Photography"].into_iter().map(String::from).collect();
        wizard.advance(StepInput::Interests(tags)).unwrap();
        let view = wizard.view();
        assert_eq!(view.step, StepId::Pronouns);
        assert!(view.skippable);
        assert!(view.can_go_back);
        assert!(!view.finished);
    }
}
