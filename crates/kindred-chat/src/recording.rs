//! Transient state while a voice message is being recorded.

use serde::Serialize;

use kindred_shared::timers::TimerId;
use kindred_shared::types::ConversationId;

use crate::message::format_duration;

/// At most one per chat session. Ticks carry the generation they were
/// scheduled for, so a tick left over from an earlier recording is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSession {
    pub conversation: ConversationId,
    pub elapsed_secs: u32,
    pub(crate) generation: u64,
    pub(crate) tick: Option<TimerId>,
}

impl RecordingSession {
    pub(crate) fn new(conversation: ConversationId, generation: u64) -> Self {
        Self {
            conversation,
            elapsed_secs: 0,
            generation,
            tick: None,
        }
    }

    pub fn view(&self) -> RecordingView {
        RecordingView {
            active: true,
            elapsed_secs: self.elapsed_secs,
            label: format_duration(self.elapsed_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecordingView {
    pub active: bool,
    pub elapsed_secs: u32,
    pub label: String,
}

impl RecordingView {
    pub fn idle() -> Self {
        Self {
            active: false,
            elapsed_secs: 0,
            label: format_duration(0),
        }
    }
}
