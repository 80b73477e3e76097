//! The profile draft assembled by the onboarding wizard.
//!
//! Every field starts unset. Each wizard step owns a disjoint group of
//! fields and only ever writes those; going back never clears anything.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::MediaRef;

// ---------------------------------------------------------------------------
// Answer enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ChildrenStatus {
    No,
    Yes,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum FamilyPlans {
    No,
    Yes,
    Open,
    NotSure,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum EducationLevel {
    HighSchool,
    SomeCollege,
    Associates,
    Bachelors,
    Masters,
    Doctoral,
    Trade,
    Other,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DatingIntention {
    Casual,
    LongTerm,
    Friends,
    Serious,
    Open,
    Exploring,
    PreferNotToSay,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum HabitFrequency {
    Regularly,
    Occasionally,
    UsedTo,
    Never,
    PreferNotToSay,
}

// ---------------------------------------------------------------------------
// Grouped sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub first_name: String,
    pub last_name: Option<String>,
    /// `MM/DD/YYYY`, see [`format_birth_date`].
    pub birth_date: Option<String>,
    pub height: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub has_children: Option<ChildrenStatus>,
    pub family_plans: Option<FamilyPlans>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profession {
    pub workplace: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LifestyleHabits {
    pub smoking: Option<HabitFrequency>,
    pub drinking: Option<HabitFrequency>,
    pub weed: Option<HabitFrequency>,
}

/// Prompt attached to the main photo on the AddPrompt step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPrompt {
    pub prompt: Option<String>,
    pub location: Option<String>,
    pub caption: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PromptAnswer {
    Written { text: String },
    #[serde(rename_all = "camelCase")]
    Voice { clip: MediaRef, duration_secs: u32 },
    Video { clip: MediaRef },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePrompt {
    pub question: String,
    pub answer: PromptAnswer,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PromptPoll {
    pub question: String,
    pub options: Vec<String>,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// The in-progress, uncommitted profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub phone_number: Option<String>,
    pub phone_verified: bool,

    pub main_photo: Option<MediaRef>,
    /// Additional photos in display order, at most `PHOTO_SLOTS`.
    pub photos: Vec<MediaRef>,
    pub photo_prompt: Option<PhotoPrompt>,
    pub face_verified: bool,

    pub identity: Option<Identity>,
    pub family: Family,
    pub location: Option<String>,
    pub profession: Profession,
    pub education_level: Option<EducationLevel>,
    pub education_other: Option<String>,
    pub interests: BTreeSet<String>,
    pub pronouns: Option<String>,
    pub gender_identity: Option<String>,
    pub sexual_orientation: Option<String>,
    pub looking_to_meet: BTreeSet<String>,
    pub religious_affiliation: Option<String>,
    pub hometown: Option<String>,
    pub political_affiliation: Option<String>,
    pub languages: BTreeSet<String>,
    pub dating_intention: Option<DatingIntention>,
    pub lifestyle: LifestyleHabits,
    pub ideal_relationship: Option<String>,
    pub prompts: Vec<ProfilePrompt>,
    pub poll: Option<PromptPoll>,
    pub ethnicity: Option<String>,
}

impl ProfileDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_main_photo(&self) -> bool {
        self.main_photo.is_some()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.identity.as_ref().map(|i| i.first_name.as_str())
    }
}

/// Format raw birth-date keystrokes as `MM/DD/YYYY`.
///
/// Non-digits are dropped. Input longer than eight digits is rejected
/// (`None`) so the caller keeps the previous value.
pub fn format_birth_date(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        0..=2 => Some(digits),
        3..=4 => Some(format!("{}/{}", &digits[..2], &digits[2..])),
        5..=8 => Some(format!(
            "{}/{}/{}",
            &digits[..2],
            &digits[2..4],
            &digits[4..]
        )),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_birth_date_progressive() {
        assert_eq!(format_birth_date("0").as_deref(), Some("0"));
        assert_eq!(format_birth_date("041").as_deref(), Some("04/1"));
        assert_eq!(format_birth_date("04-15-1995").as_deref(), Some("04/15/1995"));
        assert_eq!(format_birth_date("041519951"), None);
    }

    #[test]
    fn test_empty_draft() {
        let draft = ProfileDraft::new();
        assert!(!draft.has_main_photo());
        assert!(draft.display_name().is_none());
        assert!(draft.interests.is_empty());
    }

    #[test]
    fn test_prompt_answer_tagged_json() {
        let answer = PromptAnswer::Voice {
            clip: MediaRef::new("file://clip.m4a"),
            duration_secs: 15,
        };
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["kind"], "voice");
        assert_eq!(json["durationSecs"], 15);
    }
}
