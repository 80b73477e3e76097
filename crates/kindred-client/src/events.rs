//! Events pushed to the presentation layer as JSON lines.

use serde::Serialize;

use kindred_shared::types::ConversationId;

pub const EVENT_STEP_CHANGED: &str = "step-changed";
pub const EVENT_OTP_COUNTDOWN: &str = "otp-countdown";
pub const EVENT_CHAT: &str = "chat";
pub const EVENT_FEED_CHANGED: &str = "feed-changed";
pub const EVENT_PROFILE_COMMITTED: &str = "profile-committed";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEventPayload<T> {
    pub conversation: ConversationId,
    pub event: T,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPayload {
    pub tier: String,
    pub candidate: Option<String>,
    pub visible: usize,
}

#[derive(Debug, Serialize)]
struct Envelope<'a, S> {
    event: &'a str,
    payload: S,
}

/// Serialize an event as one JSON line. Failures are logged and yield `None`.
pub fn render_event<S: Serialize>(event: &str, payload: S) -> Option<String> {
    match serde_json::to_string(&Envelope { event, payload }) {
        Ok(line) => Some(line),
        Err(e) => {
            tracing::error!(event, error = %e, "Failed to render event");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_event_envelope() {
        let line = render_event(
            EVENT_FEED_CHANGED,
            FeedPayload {
                tier: "signature".into(),
                candidate: Some("Amara".into()),
                visible: 3,
            },
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["event"], "feed-changed");
        assert_eq!(value["payload"]["candidate"], "Amara");
        assert_eq!(value["payload"]["visible"], 3);
    }
}
