use std::time::Duration;

use kindred_shared::constants::{
    AUTO_REPLY_DELAY, DELIVERY_DELAY, EMPTY_RECORDING_SECS, MAX_VOICE_SECS, TEXT_AUTO_REPLY,
    VOICE_AUTO_REPLY,
};

/// Tunables of a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Latency before an outgoing message is marked delivered.
    pub delivery_delay: Duration,

    /// Delay before the simulated peer answers.
    pub reply_delay: Duration,

    /// Recording auto-stops when it reaches this many seconds.
    pub max_recording_secs: u32,

    /// Duration given to a recording stopped before its first tick.
    pub empty_recording_secs: u32,

    /// When `false`, delivery receipts and replies come from a real
    /// transport via [`crate::ChatSession::acknowledge`] and
    /// [`crate::ChatSession::receive_peer_message`].
    pub simulate_peer: bool,

    pub text_reply: String,
    pub voice_reply: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            delivery_delay: DELIVERY_DELAY,
            reply_delay: AUTO_REPLY_DELAY,
            max_recording_secs: MAX_VOICE_SECS,
            empty_recording_secs: EMPTY_RECORDING_SECS,
            simulate_peer: true,
            text_reply: TEXT_AUTO_REPLY.to_string(),
            voice_reply: VOICE_AUTO_REPLY.to_string(),
        }
    }
}
