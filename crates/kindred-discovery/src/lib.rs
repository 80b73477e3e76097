//! # kindred-discovery
//!
//! The discovery feed: a cursor over a fixed candidate list, narrowed by
//! membership tier, plus the filter settings sent to the candidate
//! directory and the conversation-list search.

pub mod candidates;
pub mod chats;
pub mod feed;
pub mod filters;

pub use candidates::{seed_candidates, Candidate};
pub use chats::{search_conversations, ConversationSummary};
pub use feed::{CandidateFeed, FeedAction};
pub use filters::DiscoveryFilters;
