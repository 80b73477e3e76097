//! Conversation list and its search box.

use serde::{Deserialize, Serialize};

use kindred_shared::types::ConversationId;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub name: String,
    pub last_message: String,
    /// Pre-formatted relative time, e.g. `2m ago`.
    pub time: String,
    pub unread_count: u32,
    pub is_online: bool,
}

impl ConversationSummary {
    pub fn new(
        name: impl Into<String>,
        last_message: impl Into<String>,
        time: impl Into<String>,
        unread_count: u32,
        is_online: bool,
    ) -> Self {
        Self {
            id: ConversationId::new(),
            name: name.into(),
            last_message: last_message.into(),
            time: time.into(),
            unread_count,
            is_online,
        }
    }
}

/// Case-insensitive match on name or last message. A blank query returns
/// everything.
pub fn search_conversations<'a>(
    chats: &'a [ConversationSummary],
    query: &str,
) -> Vec<&'a ConversationSummary> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return chats.iter().collect();
    }
    chats
        .iter()
        .filter(|c| {
            c.name.to_lowercase().contains(&query)
                || c.last_message.to_lowercase().contains(&query)
        })
        .collect()
}

/// Badge count over the whole list.
pub fn total_unread(chats: &[ConversationSummary]) -> u32 {
    chats.iter().map(|c| c.unread_count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chats() -> Vec<ConversationSummary> {
        vec![
            ConversationSummary::new("Sarah Wilson", "Hey! How was your day?", "2m ago", 2, true),
            ConversationSummary::new(
                "Emma Johnson",
                "Looking forward to our coffee date!",
                "1h ago",
                0,
                true,
            ),
            ConversationSummary::new(
                "Jessica Brown",
                "Thanks for the lovely evening 😊",
                "3h ago",
                1,
                false,
            ),
        ]
    }

    #[test]
    fn test_search_name_and_message() {
        let chats = chats();
        let hits = search_conversations(&chats, "EMMA");
        assert_eq!(hits.len(), 1);
        let hits = search_conversations(&chats, "coffee");
        assert_eq!(hits[0].name, "Emma Johnson");
        assert!(search_conversations(&chats, "zzz").is_empty());
        assert_eq!(search_conversations(&chats, "  ").len(), 3);
    }

    #[test]
    fn test_total_unread() {
        assert_eq!(total_unread(&chats()), 3);
    }
}
