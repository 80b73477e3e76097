use serde::{Deserialize, Serialize};

use kindred_shared::types::{CandidateId, MediaRef, Tier};

/// A profile shown in the discovery feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub age: u8,
    pub image: MediaRef,
    pub tier: Tier,
    /// Shows the "New" badge on the card.
    pub is_new: bool,
    pub description: String,
}

impl Candidate {
    pub fn new(
        id: u32,
        name: impl Into<String>,
        age: u8,
        tier: Tier,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: CandidateId(id),
            name: name.into(),
            age,
            image: MediaRef::new(format!("https://picsum.photos/400/600?random={id}")),
            tier,
            is_new: false,
            description: description.into(),
        }
    }

    pub fn marked_new(mut self) -> Self {
        self.is_new = true;
        self
    }

    /// Card headline, e.g. `Amara, 26`.
    pub fn headline(&self) -> String {
        format!("{}, {}", self.name, self.age)
    }
}

/// The fixed directory the app ships with until a real backend exists.
pub fn seed_candidates() -> Vec<Candidate> {
    vec![
        Candidate::new(
            1,
            "Amara",
            26,
            Tier::Signature,
            "I am determined and I love adventure. Looking for someone who shares my passion for travel and new experiences.",
        )
        .marked_new(),
        Candidate::new(
            2,
            "Sarah",
            24,
            Tier::Executive,
            "Love hiking and exploring new places. Coffee enthusiast and weekend warrior.",
        ),
        Candidate::new(
            3,
            "Emma",
            28,
            Tier::Signature,
            "Artist and dreamer. Looking for deep conversations and genuine connections.",
        )
        .marked_new(),
        Candidate::new(
            4,
            "Jessica",
            25,
            Tier::Executive,
            "Entrepreneur and fitness enthusiast. Love building businesses and staying active.",
        ),
        Candidate::new(
            5,
            "Sophie",
            27,
            Tier::Signature,
            "Primary school educator and book lover. Looking for someone who appreciates quiet moments and good conversation.",
        )
        .marked_new(),
        Candidate::new(
            6,
            "Rachel",
            29,
            Tier::Executive,
            "Doctor and traveler. Passionate about helping others and exploring the world.",
        ),
    ]
}
