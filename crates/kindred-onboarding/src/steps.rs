//! The step graph.
//!
//! Steps form one fixed pipeline: account verification, photos, face
//! verification, then the profile questionnaire ending on [`StepId::Ethnicity`],
//! which commits the draft. Progress is derived from the ordinal so it can
//! only grow while moving forward.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum StepId {
    PhoneNumber,
    OtpVerification,
    PhotoUpload,
    AddPrompt,
    PhotoGrid,
    FaceVerification,
    Identity,
    Family,
    Location,
    Profession,
    EducationLevel,
    Interests,
    Pronouns,
    GenderIdentity,
    SexualOrientation,
    LookingToMeet,
    ReligiousAffiliation,
    Hometown,
    PoliticalAffiliation,
    Languages,
    DatingIntentions,
    LifestyleHabits,
    IdealRelationship,
    WrittenPrompts,
    VoicePrompt,
    VideoPrompt,
    PromptPoll,
    Ethnicity,
}

/// Declared step order.
pub const STEP_ORDER: [StepId; 28] = [
    StepId::PhoneNumber,
    StepId::OtpVerification,
    StepId::PhotoUpload,
    StepId::AddPrompt,
    StepId::PhotoGrid,
    StepId::FaceVerification,
    StepId::Identity,
    StepId::Family,
    StepId::Location,
    StepId::Profession,
    StepId::EducationLevel,
    StepId::Interests,
    StepId::Pronouns,
    StepId::GenderIdentity,
    StepId::SexualOrientation,
    StepId::LookingToMeet,
    StepId::ReligiousAffiliation,
    StepId::Hometown,
    StepId::PoliticalAffiliation,
    StepId::Languages,
    StepId::DatingIntentions,
    StepId::LifestyleHabits,
    StepId::IdealRelationship,
    StepId::WrittenPrompts,
    StepId::VoicePrompt,
    StepId::VideoPrompt,
    StepId::PromptPoll,
    StepId::Ethnicity,
];

impl StepId {
    pub const FIRST: StepId = STEP_ORDER[0];
    pub const TERMINAL: StepId = STEP_ORDER[STEP_ORDER.len() - 1];

    /// Zero-based position in [`STEP_ORDER`].
    pub fn ordinal(self) -> usize {
        // Enum discriminants follow STEP_ORDER.
        self as usize
    }

    /// Static successor, `None` on the terminal step.
    pub fn next(self) -> Option<StepId> {
        STEP_ORDER.get(self.ordinal() + 1).copied()
    }

    pub fn previous(self) -> Option<StepId> {
        self.ordinal()
            .checked_sub(1)
            .and_then(|i| STEP_ORDER.get(i).copied())
    }

    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    pub fn is_skippable(self) -> bool {
        matches!(
            self,
            StepId::FaceVerification
                | StepId::Family
                | StepId::Profession
                | StepId::EducationLevel
                | StepId::Interests
                | StepId::Pronouns
                | StepId::LookingToMeet
                | StepId::ReligiousAffiliation
                | StepId::Hometown
                | StepId::DatingIntentions
                | StepId::WrittenPrompts
                | StepId::VoicePrompt
                | StepId::VideoPrompt
                | StepId::PromptPoll
                | StepId::Ethnicity
        )
    }

    pub fn title(self) -> &'static str {
        match self {
            StepId::PhoneNumber => "Enter your phone number",
            StepId::OtpVerification => "Verify your number",
            StepId::PhotoUpload => "Add your photos",
            StepId::AddPrompt => "Add a prompt to your photo",
            StepId::PhotoGrid => "Fill your photo grid",
            StepId::FaceVerification => "Verify your face",
            StepId::Identity => "About you",
            StepId::Family => "Family",
            StepId::Location => "Where do you live?",
            StepId::Profession => "Work",
            StepId::EducationLevel => "Education level",
            StepId::Interests => "Interests",
            StepId::Pronouns => "Pronouns",
            StepId::GenderIdentity => "Gender identity",
            StepId::SexualOrientation => "Sexual orientation",
            StepId::LookingToMeet => "Who are you looking to meet?",
            StepId::ReligiousAffiliation => "Religious beliefs",
            StepId::Hometown => "Where did you grow up?",
            StepId::PoliticalAffiliation => "Political beliefs",
            StepId::Languages => "Languages you speak",
            StepId::DatingIntentions => "Dating intentions",
            StepId::LifestyleHabits => "Lifestyle habits",
            StepId::IdealRelationship => "Your ideal relationship",
            StepId::WrittenPrompts => "Written prompts",
            StepId::VoicePrompt => "Voice prompt",
            StepId::VideoPrompt => "Video prompt",
            StepId::PromptPoll => "Prompt poll",
            StepId::Ethnicity => "Ethnicity",
        }
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Progress bar percentage for `step`. Only the terminal step reaches 100.
pub fn progress_fraction(step: StepId) -> f32 {
    (step.ordinal() + 1) as f32 / STEP_ORDER.len() as f32 * 100.0
}
