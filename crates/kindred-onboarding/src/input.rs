use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use kindred_shared::constants::{
    MAX_POLL_OPTION_LEN, MAX_PROMPT_ANSWER_LEN, MAX_VOICE_PROMPT_SECS, MIN_PHONE_DIGITS,
    OTP_LENGTH, POLL_OPTIONS,
};
use kindred_shared::profile::{
    DatingIntention, EducationLevel, Family, Identity, LifestyleHabits, PhotoPrompt,
    ProfilePrompt, PromptAnswer, PromptPoll, Profession,
};
use kindred_shared::types::MediaRef;
use kindred_shared::{ProfileDraft, ValidationError};

use crate::photos::PhotoGrid;
use crate::steps::StepId;

/// The answer submitted on one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "step", content = "value", rename_all = "camelCase")]
pub enum StepInput {
    PhoneNumber { country_code: String, number: String },
    Otp { code: String },
    /// Accepted on both the PhotoUpload and PhotoGrid steps.
    Photos(PhotoGrid),
    PhotoPrompt(PhotoPrompt),
    FaceVerification { progress: u8 },
    Identity(Identity),
    Family(Family),
    Location(String),
    Profession(Profession),
    Education {
        level: EducationLevel,
        other: Option<String>,
    },
    Interests(BTreeSet<String>),
    Pronouns(String),
    GenderIdentity(String),
    SexualOrientation(String),
    LookingToMeet(BTreeSet<String>),
    ReligiousAffiliation(String),
    Hometown(String),
    PoliticalAffiliation(String),
    Languages(BTreeSet<String>),
    DatingIntention(DatingIntention),
    Lifestyle(LifestyleHabits),
    IdealRelationship(String),
    /// `(question, answer)` pairs.
    WrittenPrompts(Vec<(String, String)>),
    VoicePrompt {
        question: String,
        clip: MediaRef,
        duration_secs: u32,
    },
    VideoPrompt { question: String, clip: MediaRef },
    Poll(PromptPoll),
    Ethnicity(String),
}

impl StepInput {
    /// Whether this input may be submitted on `step`.
    pub fn belongs_to(&self, step: StepId) -> bool {
        use StepInput as I;
        matches!(
            (self, step),
            (I::PhoneNumber { .. }, StepId::PhoneNumber)
                | (I::Otp { .. }, StepId::OtpVerification)
                | (I::Photos(_), StepId::PhotoUpload | StepId::PhotoGrid)
                | (I::PhotoPrompt(_), StepId::AddPrompt)
                | (I::FaceVerification { .. }, StepId::FaceVerification)
                | (I::Identity(_), StepId::Identity)
                | (I::Family(_), StepId::Family)
                | (I::Location(_), StepId::Location)
                | (I::Profession(_), StepId::Profession)
                | (I::Education { .. }, StepId::EducationLevel)
                | (I::Interests(_), StepId::Interests)
                | (I::Pronouns(_), StepId::Pronouns)
                | (I::GenderIdentity(_), StepId::GenderIdentity)
                | (I::SexualOrientation(_), StepId::SexualOrientation)
                | (I::LookingToMeet(_), StepId::LookingToMeet)
                | (I::ReligiousAffiliation(_), StepId::ReligiousAffiliation)
                | (I::Hometown(_), StepId::Hometown)
                | (I::PoliticalAffiliation(_), StepId::PoliticalAffiliation)
                | (I::Languages(_), StepId::Languages)
                | (I::DatingIntention(_), StepId::DatingIntentions)
                | (I::Lifestyle(_), StepId::LifestyleHabits)
                | (I::IdealRelationship(_), StepId::IdealRelationship)
                | (I::WrittenPrompts(_), StepId::WrittenPrompts)
                | (I::VoicePrompt { .. }, StepId::VoicePrompt)
                | (I::VideoPrompt { .. }, StepId::VideoPrompt)
                | (I::Poll(_), StepId::PromptPoll)
                | (I::Ethnicity(_), StepId::Ethnicity)
        )
    }

    /// Check required fields. Nothing is written on failure.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            StepInput::PhoneNumber { number, .. } => {
                normalize_phone_number("", number).map(|_| ())
            }
            StepInput::Otp { code } => validate_otp(code),
            StepInput::Photos(grid) => grid.require_main().map(|_| ()),
            StepInput::FaceVerification { progress } if *progress < 100 => {
                Err(ValidationError::VerificationIncomplete)
            }
            StepInput::Identity(identity) if identity.first_name.trim().is_empty() => {
                Err(ValidationError::RequiredField("First name"))
            }
            StepInput::Education {
                level: EducationLevel::Other,
                other,
            } if other.as_deref().map_or(true, |t| t.trim().is_empty()) => {
                Err(ValidationError::RequiredField("Education"))
            }
            StepInput::WrittenPrompts(pairs) => {
                for (_, answer) in pairs {
                    if answer.chars().count() > MAX_PROMPT_ANSWER_LEN {
                        return Err(ValidationError::TooLong {
                            field: "Prompt answer",
                            max: MAX_PROMPT_ANSWER_LEN,
                        });
                    }
                }
                Ok(())
            }
            StepInput::VoicePrompt { duration_secs, .. } if *duration_secs == 0 => {
                Err(ValidationError::RequiredField("Voice recording"))
            }
            StepInput::VoicePrompt { duration_secs, .. }
                if *duration_secs > MAX_VOICE_PROMPT_SECS =>
            {
                Err(ValidationError::RecordingTooLong {
                    max_secs: MAX_VOICE_PROMPT_SECS,
                })
            }
            StepInput::Poll(poll) => validate_poll(poll),
            _ => Ok(()),
        }
    }

    /// Merge into the draft. Only the fields owned by this input's step are
    /// touched, and repeated application yields the same draft.
    pub(crate) fn apply(self, draft: &mut ProfileDraft) {
        match self {
            StepInput::PhoneNumber {
                country_code,
                number,
            } => {
                draft.phone_number = normalize_phone_number(&country_code, &number).ok();
            }
            StepInput::Otp { .. } => draft.phone_verified = true,
            StepInput::Photos(grid) => {
                draft.main_photo = grid.main().cloned();
                draft.photos = grid.additional_photos();
            }
            StepInput::PhotoPrompt(prompt) => draft.photo_prompt = Some(prompt),
            StepInput::FaceVerification { .. } => draft.face_verified = true,
            StepInput::Identity(identity) => draft.identity = Some(identity),
            StepInput::Family(family) => draft.family = family,
            StepInput::Location(location) => draft.location = non_empty(location),
            StepInput::Profession(profession) => draft.profession = profession,
            StepInput::Education { level, other } => {
                draft.education_level = Some(level);
                draft.education_other = match level {
                    EducationLevel::Other => other.and_then(non_empty),
                    _ => None,
                };
            }
            StepInput::Interests(tags) => draft.interests = tags,
            StepInput::Pronouns(v) => draft.pronouns = non_empty(v),
            StepInput::GenderIdentity(v) => draft.gender_identity = non_empty(v),
            StepInput::SexualOrientation(v) => draft.sexual_orientation = non_empty(v),
            StepInput::LookingToMeet(set) => draft.looking_to_meet = set,
            StepInput::ReligiousAffiliation(v) => draft.religious_affiliation = non_empty(v),
            StepInput::Hometown(v) => draft.hometown = non_empty(v),
            StepInput::PoliticalAffiliation(v) => draft.political_affiliation = non_empty(v),
            StepInput::Languages(set) => draft.languages = set,
            StepInput::DatingIntention(v) => draft.dating_intention = Some(v),
            StepInput::Lifestyle(habits) => draft.lifestyle = habits,
            StepInput::IdealRelationship(v) => draft.ideal_relationship = non_empty(v),
            StepInput::WrittenPrompts(pairs) => {
                let prompts = pairs
                    .into_iter()
                    .filter(|(_, answer)| !answer.trim().is_empty())
                    .map(|(question, answer)| ProfilePrompt {
                        question,
                        answer: PromptAnswer::Written { text: answer },
                    })
                    .collect();
                replace_prompts(draft, PromptKind::Written, prompts);
            }
            StepInput::VoicePrompt {
                question,
                clip,
                duration_secs,
            } => {
                let prompt = ProfilePrompt {
                    question,
                    answer: PromptAnswer::Voice {
                        clip,
                        duration_secs,
                    },
                };
                replace_prompts(draft, PromptKind::Voice, vec![prompt]);
            }
            StepInput::VideoPrompt { question, clip } => {
                let prompt = ProfilePrompt {
                    question,
                    answer: PromptAnswer::Video { clip },
                };
                replace_prompts(draft, PromptKind::Video, vec![prompt]);
            }
            StepInput::Poll(poll) => draft.poll = Some(poll),
            StepInput::Ethnicity(v) => draft.ethnicity = non_empty(v),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Written,
    Voice,
    Video,
}

fn kind_of(answer: &PromptAnswer) -> PromptKind {
    match answer {
        PromptAnswer::Written { .. } => PromptKind::Written,
        PromptAnswer::Voice { .. } => PromptKind::Voice,
        PromptAnswer::Video { .. } => PromptKind::Video,
    }
}

/// Swap out every prompt of `kind`, keeping the relative order of the rest.
fn replace_prompts(draft: &mut ProfileDraft, kind: PromptKind, prompts: Vec<ProfilePrompt>) {
    draft.prompts.retain(|p| kind_of(&p.answer) != kind);
    draft.prompts.extend(prompts);
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Join country code and number, rejecting numbers with too few digits.
pub fn normalize_phone_number(country_code: &str, number: &str) -> Result<String, ValidationError> {
    let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::InvalidPhoneNumber);
    }
    Ok(format!("{}{}", country_code.trim(), digits))
}

pub fn validate_otp(code: &str) -> Result<(), ValidationError> {
    let code = code.trim();
    if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::IncompleteOtp);
    }
    Ok(())
}

fn validate_poll(poll: &PromptPoll) -> Result<(), ValidationError> {
    if poll.question.trim().is_empty() {
        return Err(ValidationError::RequiredField("Poll question"));
    }
    if poll.options.len() != POLL_OPTIONS {
        return Err(ValidationError::WrongCount {
            field: "poll options",
            expected: POLL_OPTIONS,
            actual: poll.options.len(),
        });
    }
    if poll
        .options
        .iter()
        .any(|o| o.chars().count() > MAX_POLL_OPTION_LEN)
    {
        return Err(ValidationError::TooLong {
            field: "Poll option",
            max: MAX_POLL_OPTION_LEN,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_digits() {
        assert_eq!(
            normalize_phone_number("+1", "(555) 123-4567").unwrap(),
            "+15551234567"
        );
        assert_eq!(
            normalize_phone_number("+1", "555-1234"),
            Err(ValidationError::InvalidPhoneNumber)
        );
    }

    #[test]
    fn test_otp_format() {
        assert!(validate_otp("12345").is_ok());
        assert_eq!(validate_otp(""), Err(ValidationError::IncompleteOtp));
        assert_eq!(validate_otp("1234"), Err(ValidationError::IncompleteOtp));
        assert_eq!(validate_otp("12a45"), Err(ValidationError::IncompleteOtp));
    }

    #[test]
    fn test_education_other_needs_text() {
        let input = StepInput::Education {
            level: EducationLevel::Other,
            other: Some("  ".into()),
        };
        assert_eq!(
            input.validate(),
            Err(ValidationError::RequiredField("Education"))
        );
        let input = StepInput::Education {
            level: EducationLevel::Bachelors,
            other: Some("ignored".into()),
        };
        assert!(input.validate().is_ok());
        let mut draft = ProfileDraft::new();
        input.apply(&mut draft);
        assert_eq!(draft.education_other, None);
    }

    #[test]
    fn test_poll_rules() {
        let mut poll = PromptPoll {
            question: "Who would you rather go on a date with?".into(),
            options: vec!["A".into(), "B".into()],
        };
        assert!(matches!(
            StepInput::Poll(poll.clone()).validate(),
            Err(ValidationError::WrongCount { actual: 2, .. })
        ));
        poll.options.push("x".repeat(MAX_POLL_OPTION_LEN + 1));
        assert!(matches!(
            StepInput::Poll(poll.clone()).validate(),
            Err(ValidationError::TooLong { .. })
        ));
        poll.options[2] = "C".into();
        assert!(StepInput::Poll(poll).validate().is_ok());
    }

    #[test]
    fn test_voice_prompt_length() {
        let voice = |duration_secs| StepInput::VoicePrompt {
            question: "My simple pleasures".into(),
            clip: MediaRef::new("file://v.m4a"),
            duration_secs,
        };
        assert_eq!(
            voice(0).validate(),
            Err(ValidationError::RequiredField("Voice recording"))
        );
        assert!(voice(MAX_VOICE_PROMPT_SECS).validate().is_ok());
        assert_eq!(
            voice(10_000).validate(),
            Err(ValidationError::RecordingTooLong { max_secs: 30 })
        );
    }

    #[test]
    fn test_prompt_kinds_replace_independently() {
        let mut draft = ProfileDraft::new();
        StepInput::WrittenPrompts(vec![("Q1".into(), "A1".into())]).apply(&mut draft);
        StepInput::VoicePrompt {
            question: "Q2".into(),
            clip: MediaRef::new("file://v.m4a"),
            duration_secs: 12,
        }
        .apply(&mut draft);
        StepInput::WrittenPrompts(vec![("Q3".into(), "A3".into()), ("Q4".into(), "".into())])
            .apply(&mut draft);

        let questions: Vec<_> = draft.prompts.iter().map(|p| p.question.as_str()).collect();
        assert_eq!(questions, vec!["Q2", "Q3"]);
    }

    #[test]
    fn test_belongs_to() {
        let photos = StepInput::Photos(PhotoGrid::new());
        assert!(photos.belongs_to(StepId::PhotoUpload));
        assert!(photos.belongs_to(StepId::PhotoGrid));
        assert!(!photos.belongs_to(StepId::AddPrompt));
    }
}
