//! Discovery Feed Selector.
//!
//! A cursor over the tier-filtered subset of a fixed candidate list. The
//! feed is cyclic: advancing past the last candidate wraps to the first,
//! and liked or passed candidates stay in the pool.

use serde::Serialize;
use tracing::{debug, info};

use kindred_shared::types::Tier;

use crate::candidates::Candidate;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FeedAction {
    Like,
    Pass,
}

#[derive(Debug, Clone)]
pub struct CandidateFeed {
    candidates: Vec<Candidate>,
    tier: Tier,
    /// Indices into `candidates` matching `tier`, in list order.
    visible: Vec<usize>,
    cursor: usize,
}

impl CandidateFeed {
    pub fn new(candidates: Vec<Candidate>, tier: Tier) -> Self {
        let mut feed = Self {
            candidates,
            tier,
            visible: Vec::new(),
            cursor: 0,
        };
        feed.rebuild();
        feed
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn cursor(&self) -> Option<usize> {
        (!self.visible.is_empty()).then_some(self.cursor)
    }

    /// Number of candidates in the active tier.
    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn visible(&self) -> impl Iterator<Item = &Candidate> {
        self.visible.iter().map(move |&i| &self.candidates[i])
    }

    /// Switch to another tier. The cursor goes back to the first candidate
    /// of the new subset even when the tier is unchanged.
    pub fn set_tier_filter(&mut self, tier: Tier) {
        self.tier = tier;
        self.rebuild();
        info!(tier = %tier, visible = self.visible.len(), "Feed tier changed");
    }

    /// The candidate under the cursor. An out-of-range cursor falls back to
    /// the first candidate; `None` only when the subset is empty.
    pub fn current(&self) -> Option<&Candidate> {
        let idx = self
            .visible
            .get(self.cursor)
            .or_else(|| self.visible.first())?;
        self.candidates.get(*idx)
    }

    /// Move to the next candidate, wrapping past the end.
    pub fn advance(&mut self) -> Option<&Candidate> {
        if self.visible.is_empty() {
            return None;
        }
        self.cursor = if self.cursor + 1 < self.visible.len() {
            self.cursor + 1
        } else {
            0
        };
        self.current()
    }

    pub fn like(&mut self) -> Option<&Candidate> {
        self.act(FeedAction::Like)
    }

    pub fn pass(&mut self) -> Option<&Candidate> {
        self.act(FeedAction::Pass)
    }

    /// Back to the first candidate of the current subset.
    pub fn refresh(&mut self) {
        self.cursor = 0;
        debug!(tier = %self.tier, "Feed refreshed");
    }

    /// Replace the pool, e.g. after the directory answered with new
    /// filters applied.
    pub fn replace_candidates(&mut self, candidates: Vec<Candidate>) {
        self.candidates = candidates;
        self.rebuild();
    }

    fn act(&mut self, action: FeedAction) -> Option<&Candidate> {
        if let Some(candidate) = self.current() {
            info!(candidate = %candidate.id, action = ?action, "Feed action");
        }
        self.advance()
    }

    fn rebuild(&mut self) {
        let tier = self.tier;
        self.visible = self
            .candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| c.tier == tier)
            .map(|(i, _)| i)
            .collect();
        self.cursor = 0;
    }
}
