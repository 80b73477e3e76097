//! Chat message records and the small formatting helpers the conversation
//! view needs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use kindred_shared::constants::{MAX_VOICE_SECS, MIN_VOICE_SECS};
use kindred_shared::types::{Author, MessageId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageKind {
    Text,
    #[serde(rename_all = "camelCase")]
    Voice { duration_secs: u32 },
}

/// Transport state of a message. Ordered so that a transition can be
/// checked with `>`: it only ever moves forward.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryState {
    Pending,
    Delivered,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    pub author: Author,
    /// Empty for voice messages.
    pub body: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
    pub delivery: DeliveryState,
    pub read: bool,
}

impl ChatMessage {
    pub fn text(id: MessageId, author: Author, body: impl Into<String>) -> Self {
        Self {
            id,
            author,
            body: body.into(),
            kind: MessageKind::Text,
            created_at: Utc::now(),
            delivery: DeliveryState::Pending,
            read: false,
        }
    }

    pub fn voice(id: MessageId, author: Author, duration_secs: u32) -> Self {
        Self {
            id,
            author,
            body: String::new(),
            kind: MessageKind::Voice {
                duration_secs: clamp_voice_secs(duration_secs),
            },
            created_at: Utc::now(),
            delivery: DeliveryState::Pending,
            read: false,
        }
    }

    pub fn delivered(mut self) -> Self {
        self.delivery = DeliveryState::Delivered;
        self
    }

    pub fn is_voice(&self) -> bool {
        matches!(self.kind, MessageKind::Voice { .. })
    }

    pub fn is_outgoing(&self) -> bool {
        self.author == Author::Local
    }

    pub fn voice_duration(&self) -> Option<u32> {
        match self.kind {
            MessageKind::Voice { duration_secs } => Some(duration_secs),
            MessageKind::Text => None,
        }
    }

    /// Move to `state` if that is forward. Returns whether anything changed.
    pub(crate) fn promote(&mut self, state: DeliveryState) -> bool {
        if state > self.delivery {
            self.delivery = state;
            true
        } else {
            false
        }
    }
}

pub fn clamp_voice_secs(secs: u32) -> u32 {
    secs.clamp(MIN_VOICE_SECS, MAX_VOICE_SECS)
}

/// `m:ss`, as shown on voice bubbles and the recording indicator.
pub fn format_duration(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Coarse relative timestamp for message bubbles.
pub fn relative_time_label(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes().max(0);
    match minutes {
        0 => "Just now".to_string(),
        1..=59 => format!("{minutes}m ago"),
        60..=1439 => format!("{}h ago", minutes / 60),
        _ => format!("{}d ago", minutes / 1440),
    }
}
