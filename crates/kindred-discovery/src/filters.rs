//! Filter settings passed to the candidate directory.

use serde::{Deserialize, Serialize};

use kindred_shared::constants::{DEFAULT_AGE_RANGE, DEFAULT_DISTANCE_KM};

use crate::candidates::Candidate;

pub const MIN_AGE: u8 = 18;
pub const MAX_AGE: u8 = 65;
pub const MIN_DISTANCE_KM: u32 = 5;
pub const MAX_DISTANCE_KM: u32 = 100;
pub const DISTANCE_STEP_KM: u32 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryFilters {
    pub location: String,
    pub gender: String,
    /// Inclusive, always `min < max`.
    pub age_range: (u8, u8),
    pub distance_km: u32,
}

impl Default for DiscoveryFilters {
    fn default() -> Self {
        Self {
            location: "Jaipur".to_string(),
            gender: "Female".to_string(),
            age_range: DEFAULT_AGE_RANGE,
            distance_km: DEFAULT_DISTANCE_KM,
        }
    }
}

impl DiscoveryFilters {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Step the lower age bound by one year, keeping it below the upper one.
    pub fn step_min_age(&mut self, up: bool) {
        let (min, max) = self.age_range;
        let min = if up {
            (min + 1).min(max - 1)
        } else {
            min.saturating_sub(1).max(MIN_AGE)
        };
        self.age_range = (min, max);
    }

    /// Step the upper age bound by one year, keeping it above the lower one.
    pub fn step_max_age(&mut self, up: bool) {
        let (min, max) = self.age_range;
        let max = if up {
            (max + 1).min(MAX_AGE)
        } else {
            (max - 1).max(min + 1)
        };
        self.age_range = (min, max);
    }

    pub fn step_distance(&mut self, up: bool) {
        self.distance_km = if up {
            (self.distance_km + DISTANCE_STEP_KM).min(MAX_DISTANCE_KM)
        } else {
            self.distance_km
                .saturating_sub(DISTANCE_STEP_KM)
                .max(MIN_DISTANCE_KM)
        };
    }

    pub fn matches(&self, candidate: &Candidate) -> bool {
        (self.age_range.0..=self.age_range.1).contains(&candidate.age)
    }
}
