//! Application state owned by the client shell.
//!
//! Each screen keeps its own core: the feed, the filter sheet, the
//! conversation list and one chat driver per open conversation. Nothing here
//! is shared between conversations.

use std::collections::HashMap;

use tracing::{debug, info};

use kindred_chat::{ChatConfig, ChatSession};
use kindred_discovery::{
    search_conversations, CandidateFeed, ConversationSummary, DiscoveryFilters,
};
use kindred_shared::types::{ConversationId, ProfileId};

use crate::chat_driver::{spawn_chat_driver, ChatHandle};
use crate::collaborators::Collaborators;
use crate::config::ClientConfig;
use crate::error::ServiceError;

pub struct AppState {
    pub config: ClientConfig,
    pub collaborators: Collaborators,

    /// Set once onboarding committed a profile.
    pub profile_id: Option<ProfileId>,

    pub feed: CandidateFeed,
    pub filters: DiscoveryFilters,
    pub conversations: Vec<ConversationSummary>,

    /// Running chat drivers, keyed by conversation.
    chats: HashMap<ConversationId, ChatHandle>,
}

impl AppState {
    /// Create the state with an empty feed; call [`AppState::apply_filters`]
    /// to load candidates.
    pub fn new(config: ClientConfig, collaborators: Collaborators) -> Self {
        Self {
            feed: CandidateFeed::new(Vec::new(), config.default_tier),
            config,
            collaborators,
            profile_id: None,
            filters: DiscoveryFilters::default(),
            conversations: Vec::new(),
            chats: HashMap::new(),
        }
    }

    /// Ask the directory for candidates matching the current filters and
    /// restart the feed on them.
    pub async fn apply_filters(&mut self) -> Result<usize, ServiceError> {
        let candidates = self
            .collaborators
            .directory
            .list_candidates(&self.filters)
            .await?;
        self.feed.replace_candidates(candidates);
        info!(
            location = %self.filters.location,
            distance_km = self.filters.distance_km,
            visible = self.feed.len(),
            "Filters applied"
        );
        Ok(self.feed.len())
    }

    /// Open (or return the running) chat with `peer_name`.
    ///
    /// With `simulated` the session answers by itself; otherwise it talks to
    /// the messaging transport collaborator.
    pub fn open_chat(
        &mut self,
        conversation: ConversationId,
        peer_name: &str,
        simulated: bool,
    ) -> &mut ChatHandle {
        let config = self.config.chat_config();
        let transport = self.collaborators.transport.clone();
        self.chats.entry(conversation).or_insert_with(|| {
            debug!(conversation = %conversation.short(), simulated, "Opening chat");
            if simulated {
                let session = ChatSession::new(conversation, peer_name, config);
                spawn_chat_driver(session, None)
            } else {
                let config = ChatConfig {
                    simulate_peer: false,
                    ..config
                };
                let session = ChatSession::new(conversation, peer_name, config);
                spawn_chat_driver(session, Some(transport))
            }
        })
    }

    pub fn chat(&mut self, conversation: ConversationId) -> Option<&mut ChatHandle> {
        self.chats.get_mut(&conversation)
    }

    /// Leave a conversation. Dropping the handle stops its driver and
    /// cancels every pending timer of the session.
    pub fn close_chat(&mut self, conversation: ConversationId) -> Option<ChatHandle> {
        self.chats.remove(&conversation)
    }

    pub fn open_chats(&self) -> usize {
        self.chats.len()
    }

    pub fn search_chats(&self, query: &str) -> Vec<&ConversationSummary> {
        search_conversations(&self.conversations, query)
    }
}

#[cfg(test)]
mod tests {
    use kindred_chat::ChatEvent;
    use kindred_shared::types::Tier;

    use super::*;
    use crate::mock::in_memory_collaborators;

    fn state() -> AppState {
        let config = ClientConfig::default();
        let collaborators = in_memory_collaborators(&config);
        AppState::new(config, collaborators)
    }

    #[tokio::test]
    async fn test_apply_filters_loads_feed() {
        let mut state = state();
        assert!(state.feed.is_empty());
        assert_eq!(state.apply_filters().await.unwrap(), 3);
        assert_eq!(state.feed.current().unwrap().name, "Amara");

        state.filters.age_range = (24, 25);
        state.apply_filters().await.unwrap();
        state.feed.set_tier_filter(Tier::Executive);
        let names: Vec<_> = state.feed.visible().map(|c| c.name.clone()).collect();
        assert_eq!(names, ["Sarah", "Jessica"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_chat_lifecycle() {
        let mut state = state();
        let conversation = ConversationId::new();

        let handle = state.open_chat(conversation, "Amara", false);
        handle.send_text("hi").await;
        state.open_chat(conversation, "Amara", false);
        assert_eq!(state.open_chats(), 1);

        let ChatHandle {
            commands,
            mut events,
            ..
        } = state.close_chat(conversation).unwrap();
        assert_eq!(state.open_chats(), 0);
        drop(commands);

        let mut last = None;
        while let Some(event) = events.recv().await {
            last = Some(event);
        }
        assert_eq!(last, Some(ChatEvent::Closed));
    }

    #[test]
    fn test_search_chats() {
        let mut state = state();
        state.conversations = vec![
            ConversationSummary::new("Sarah Wilson", "Hey! How was your day?", "2m ago", 2, true),
            ConversationSummary::new("Rachel Davis", "That movie was amazing! 🎬", "2d ago", 0, false),
        ];
        assert_eq!(state.search_chats("movie")[0].name, "Rachel Davis");
        assert_eq!(state.search_chats("").len(), 2);
    }
}
