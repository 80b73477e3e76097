//! Chat Session Simulator.
//!
//! Per outgoing message: `Composed -> Pending -> Delivered`, with an
//! optional peer reply appended later. The log is append-only and ordered
//! by creation; timer firing order can change delivery flags but never the
//! order of the log.

use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use kindred_shared::constants::RECORDING_TICK;
use kindred_shared::timers::TimerQueue;
use kindred_shared::types::{Author, ConversationId, MessageId};

use crate::config::ChatConfig;
use crate::error::{ChatError, Result};
use crate::message::{clamp_voice_secs, ChatMessage, DeliveryState};
use crate::recording::{RecordingSession, RecordingView};

#[derive(Debug, Clone, PartialEq, Eq)]
enum ChatTimer {
    Deliver(MessageId),
    AutoReply(String),
    RecordingTick { generation: u64 },
}

/// Notifications for the presentation layer, drained with
/// [`ChatSession::drain_events`].
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ChatEvent {
    Appended { id: MessageId },
    Delivered { id: MessageId },
    Read { id: MessageId },
    /// Emitted after every append.
    ScrollToEnd,
    RecordingStarted,
    RecordingTick { elapsed_secs: u32 },
    RecordingFinished { id: MessageId, duration_secs: u32 },
    RecordingCanceled,
    Closed,
}

#[derive(Debug)]
pub struct ChatSession {
    conversation: ConversationId,
    peer_name: String,
    config: ChatConfig,
    messages: Vec<ChatMessage>,
    last_id: u64,
    recording: Option<RecordingSession>,
    recording_generation: u64,
    timers: TimerQueue<ChatTimer>,
    events: Vec<ChatEvent>,
    /// Outgoing messages a real transport still has to carry.
    outgoing: Vec<MessageId>,
    closed: bool,
}

impl ChatSession {
    pub fn new(conversation: ConversationId, peer_name: impl Into<String>, config: ChatConfig) -> Self {
        Self {
            conversation,
            peer_name: peer_name.into(),
            config,
            messages: Vec::new(),
            last_id: 0,
            recording: None,
            recording_generation: 0,
            timers: TimerQueue::new(),
            events: Vec::new(),
            outgoing: Vec::new(),
            closed: false,
        }
    }

    /// Open a conversation that already has messages. History is sorted by
    /// id; new ids continue after the highest one.
    pub fn with_history(
        conversation: ConversationId,
        peer_name: impl Into<String>,
        config: ChatConfig,
        mut history: Vec<ChatMessage>,
    ) -> Self {
        history.sort_by_key(|m| m.id);
        let mut session = Self::new(conversation, peer_name, config);
        session.last_id = history.last().map(|m| m.id.0).unwrap_or(0);
        session.messages = history;
        session
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation
    }

    pub fn peer_name(&self) -> &str {
        &self.peer_name
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message(&self, id: MessageId) -> Option<&ChatMessage> {
        self.position(id).map(|i| &self.messages[i])
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn unread_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.author == Author::Peer && !m.read)
            .count()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    pub fn recording(&self) -> Option<&RecordingSession> {
        self.recording.as_ref()
    }

    pub fn recording_view(&self) -> RecordingView {
        self.recording
            .as_ref()
            .map(RecordingSession::view)
            .unwrap_or_else(RecordingView::idle)
    }

    /// Number of timers still waiting to fire.
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    /// Time until the next timer fires, for drivers that sleep in between.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.time_until_next()
    }

    pub fn drain_events(&mut self) -> Vec<ChatEvent> {
        std::mem::take(&mut self.events)
    }

    /// Ids of outgoing messages created since the last call, in creation
    /// order. Always empty while the peer is simulated. This includes
    /// voice messages finalized by a timer, not only those from an explicit
    /// send or stop.
    pub fn take_outgoing(&mut self) -> Vec<MessageId> {
        std::mem::take(&mut self.outgoing)
    }

    // -----------------------------------------------------------------------
    // Sending
    // -----------------------------------------------------------------------

    /// Send a text message. Blank input is ignored (`Ok(None)`), matching a
    /// disabled send button.
    pub fn send_text(&mut self, body: &str) -> Result<Option<MessageId>> {
        self.ensure_open()?;
        let body = body.trim();
        if body.is_empty() {
            return Ok(None);
        }
        let id = self.next_id();
        let message = ChatMessage::text(id, Author::Local, body);
        let reply = self.config.text_reply.clone();
        self.post_outgoing(message, reply);
        info!(
            msg_id = %id,
            conversation = %self.conversation.short(),
            "Message sent"
        );
        Ok(Some(id))
    }

    fn post_outgoing(&mut self, message: ChatMessage, reply: String) {
        let id = message.id;
        self.append(message);
        if self.config.simulate_peer {
            self.timers
                .schedule(self.config.delivery_delay, ChatTimer::Deliver(id));
            self.timers
                .schedule(self.config.reply_delay, ChatTimer::AutoReply(reply));
        } else {
            self.outgoing.push(id);
        }
    }

    // -----------------------------------------------------------------------
    // Incoming side
    // -----------------------------------------------------------------------

    /// Append a message written by the peer. Peer messages arrive delivered.
    pub fn receive_peer_message(&mut self, body: &str) -> Result<MessageId> {
        self.ensure_open()?;
        let id = self.next_id();
        self.append(ChatMessage::text(id, Author::Peer, body).delivered());
        debug!(msg_id = %id, "Peer message received");
        Ok(id)
    }

    /// Delivery receipt for an outgoing message. Returns `false` if it was
    /// already delivered.
    pub fn acknowledge(&mut self, id: MessageId) -> Result<bool> {
        self.ensure_open()?;
        let idx = self.position(id).ok_or(ChatError::UnknownMessage(id))?;
        Ok(self.promote(idx))
    }

    /// Mark the most recent peer message read. Older ones are left alone.
    pub fn mark_latest_received_read(&mut self) -> Option<MessageId> {
        let message = self
            .messages
            .iter_mut()
            .rev()
            .find(|m| m.author == Author::Peer)?;
        if message.read {
            return None;
        }
        message.read = true;
        let id = message.id;
        self.events.push(ChatEvent::Read { id });
        Some(id)
    }

    // -----------------------------------------------------------------------
    // Voice recording
    // -----------------------------------------------------------------------

    pub fn start_recording(&mut self) -> Result<()> {
        self.ensure_open()?;
        if self.recording.is_some() {
            return Err(ChatError::RecordingInProgress);
        }
        self.recording_generation += 1;
        let generation = self.recording_generation;
        let mut recording = RecordingSession::new(self.conversation, generation);
        recording.tick = Some(
            self.timers
                .schedule(RECORDING_TICK, ChatTimer::RecordingTick { generation }),
        );
        self.recording = Some(recording);
        self.events.push(ChatEvent::RecordingStarted);
        info!(conversation = %self.conversation.short(), "Voice recording started");
        Ok(())
    }

    /// Finish early with the elapsed duration. A recording stopped before
    /// its first tick gets `empty_recording_secs`.
    pub fn stop_recording(&mut self) -> Result<MessageId> {
        self.ensure_open()?;
        let recording = self.take_recording().ok_or(ChatError::NotRecording)?;
        let secs = match recording.elapsed_secs {
            0 => self.config.empty_recording_secs,
            n => n,
        };
        Ok(self.finalize_voice(secs))
    }

    /// Drop the recording without producing a message.
    pub fn cancel_recording(&mut self) -> bool {
        match self.take_recording() {
            Some(recording) => {
                self.events.push(ChatEvent::RecordingCanceled);
                debug!(elapsed = recording.elapsed_secs, "Voice recording canceled");
                true
            }
            None => false,
        }
    }

    fn take_recording(&mut self) -> Option<RecordingSession> {
        let mut recording = self.recording.take()?;
        if let Some(tick) = recording.tick.take() {
            self.timers.cancel(tick);
        }
        Some(recording)
    }

    fn finalize_voice(&mut self, secs: u32) -> MessageId {
        let secs = clamp_voice_secs(secs.min(self.config.max_recording_secs));
        let id = self.next_id();
        let reply = self.config.voice_reply.clone();
        self.post_outgoing(ChatMessage::voice(id, Author::Local, secs), reply);
        self.events.push(ChatEvent::RecordingFinished {
            id,
            duration_secs: secs,
        });
        info!(msg_id = %id, duration_secs = secs, "Voice message sent");
        id
    }

    fn on_recording_tick(&mut self, generation: u64) {
        let max = self.config.max_recording_secs;
        let Some(recording) = self.recording.as_mut() else {
            warn!(generation, "Recording tick without an active recording");
            return;
        };
        if recording.generation != generation {
            warn!(generation, "Stale recording tick ignored");
            return;
        }
        recording.tick = None;
        recording.elapsed_secs += 1;
        let elapsed = recording.elapsed_secs;
        self.events.push(ChatEvent::RecordingTick {
            elapsed_secs: elapsed,
        });

        if elapsed >= max {
            self.recording = None;
            debug!(elapsed, "Recording reached its limit");
            self.finalize_voice(elapsed);
        } else {
            let tick = self
                .timers
                .schedule(RECORDING_TICK, ChatTimer::RecordingTick { generation });
            if let Some(recording) = self.recording.as_mut() {
                recording.tick = Some(tick);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Clock and lifetime
    // -----------------------------------------------------------------------

    /// Advance the session clock, firing every timer that comes due.
    pub fn advance(&mut self, by: Duration) {
        if self.closed {
            return;
        }
        let target = self.timers.now() + by;
        while let Some(timer) = self.timers.pop_due(target) {
            match timer {
                ChatTimer::Deliver(id) => {
                    if let Some(idx) = self.position(id) {
                        self.promote(idx);
                    }
                }
                ChatTimer::AutoReply(body) => {
                    let id = self.next_id();
                    self.append(ChatMessage::text(id, Author::Peer, body).delivered());
                    debug!(msg_id = %id, "Auto-reply appended");
                }
                ChatTimer::RecordingTick { generation } => self.on_recording_tick(generation),
            }
        }
        self.timers.set_now(target);
    }

    /// Tear the session down: every pending timer is canceled and further
    /// operations fail with [`ChatError::Closed`].
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        let dropped = self.timers.cancel_all();
        self.recording = None;
        self.outgoing.clear();
        self.closed = true;
        self.events.push(ChatEvent::Closed);
        info!(
            conversation = %self.conversation.short(),
            dropped_timers = dropped,
            "Chat session closed"
        );
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(ChatError::Closed)
        } else {
            Ok(())
        }
    }

    /// Creation-time based and strictly increasing within the session.
    fn next_id(&mut self) -> MessageId {
        let now_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let id = now_ms.max(self.last_id + 1);
        self.last_id = id;
        MessageId(id)
    }

    fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, |m| m.id).ok()
    }

    fn append(&mut self, message: ChatMessage) {
        let id = message.id;
        self.messages.push(message);
        self.events.push(ChatEvent::Appended { id });
        self.events.push(ChatEvent::ScrollToEnd);
    }

    fn promote(&mut self, idx: usize) -> bool {
        let message = &mut self.messages[idx];
        let changed = message.promote(DeliveryState::Delivered);
        if changed {
            let id = message.id;
            self.events.push(ChatEvent::Delivered { id });
            debug!(msg_id = %id, "Message delivered");
        }
        changed
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> ChatSession {
        ChatSession::new(ConversationId::new(), "Amara", ChatConfig::default())
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_send_deliver_reply_scenario() {
        let mut chat = session();
        let id = chat.send_text("hi").unwrap().unwrap();

        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].delivery, DeliveryState::Pending);

        chat.advance(secs(1));
        assert_eq!(chat.message(id).unwrap().delivery, DeliveryState::Delivered);
        assert_eq!(chat.messages().len(), 1);

        chat.advance(secs(1));
        assert_eq!(chat.messages().len(), 2);
        let reply = &chat.messages()[1];
        assert_eq!(reply.author, Author::Peer);
        assert_eq!(reply.delivery, DeliveryState::Delivered);
        assert_eq!(reply.body, "That sounds lovely! 😊");
        assert_eq!(chat.pending_timers(), 0);
    }

    #[test]
    fn test_blank_text_ignored() {
        let mut chat = session();
        assert_eq!(chat.send_text("   \n").unwrap(), None);
        assert!(chat.messages().is_empty());
        assert_eq!(chat.pending_timers(), 0);
        assert!(chat.drain_events().is_empty());
    }

    #[test]
    fn test_append_emits_scroll() {
        let mut chat = session();
        let id = chat.send_text("hello").unwrap().unwrap();
        assert_eq!(
            chat.drain_events(),
            vec![ChatEvent::Appended { id }, ChatEvent::ScrollToEnd]
        );
    }

    #[test]
    fn test_ids_follow_call_order() {
        let mut chat = session();
        let a = chat.send_text("one").unwrap().unwrap();
        chat.advance(Duration::from_millis(500));
        let b = chat.send_text("two").unwrap().unwrap();
        chat.start_recording().unwrap();
        let c = chat.stop_recording().unwrap();
        assert!(a < b && b < c);

        chat.advance(secs(5));
        let ids: Vec<_> = chat.messages().iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        assert_eq!(&ids[..3], &[a, b, c]);
        assert_eq!(chat.messages().len(), 6);
        assert!(chat
            .messages()
            .iter()
            .all(|m| m.delivery == DeliveryState::Delivered));
    }

    #[test]
    fn test_recording_stop_uses_elapsed() {
        let mut chat = session();
        chat.start_recording().unwrap();
        chat.advance(secs(7));
        assert_eq!(chat.recording().unwrap().elapsed_secs, 7);
        let id = chat.stop_recording().unwrap();
        assert_eq!(chat.message(id).unwrap().voice_duration(), Some(7));
        assert!(!chat.is_recording());
        assert_eq!(chat.message(id).unwrap().delivery, DeliveryState::Pending);

        chat.advance(secs(2));
        assert_eq!(chat.messages().last().unwrap().body, "Nice voice message! 👍");
    }

    #[test]
    fn test_recording_stopped_at_zero_gets_default() {
        let mut chat = session();
        chat.start_recording().unwrap();
        let id = chat.stop_recording().unwrap();
        assert_eq!(chat.message(id).unwrap().voice_duration(), Some(5));
    }

    #[test]
    fn test_recording_auto_finalizes_once_at_limit() {
        let mut chat = session();
        chat.start_recording().unwrap();
        chat.drain_events();
        chat.advance(secs(120));

        let voices: Vec<_> = chat.messages().iter().filter(|m| m.is_voice()).collect();
        assert_eq!(voices.len(), 1);
        assert_eq!(voices[0].voice_duration(), Some(60));
        assert!(!chat.is_recording());

        let finished = chat
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, ChatEvent::RecordingFinished { .. }))
            .count();
        assert_eq!(finished, 1);
        assert_eq!(chat.stop_recording(), Err(ChatError::NotRecording));
    }

    #[test]
    fn test_stop_cancels_pending_tick() {
        let mut chat = ChatSession::new(
            ConversationId::new(),
            "Amara",
            ChatConfig {
                simulate_peer: false,
                ..ChatConfig::default()
            },
        );
        chat.start_recording().unwrap();
        chat.advance(Duration::from_millis(59_500));
        assert_eq!(chat.recording().unwrap().elapsed_secs, 59);
        chat.stop_recording().unwrap();
        assert_eq!(chat.pending_timers(), 0);

        chat.advance(secs(5));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].voice_duration(), Some(59));
    }

    #[test]
    fn test_second_recording_not_affected_by_first() {
        let mut chat = session();
        chat.start_recording().unwrap();
        chat.advance(Duration::from_millis(900));
        chat.cancel_recording();
        chat.start_recording().unwrap();
        chat.advance(Duration::from_millis(200));
        assert_eq!(chat.recording().unwrap().elapsed_secs, 0);
        chat.advance(Duration::from_millis(800));
        assert_eq!(chat.recording().unwrap().elapsed_secs, 1);
    }

    #[test]
    fn test_cancel_recording_appends_nothing() {
        let mut chat = session();
        assert!(!chat.cancel_recording());
        chat.start_recording().unwrap();
        assert_eq!(chat.start_recording(), Err(ChatError::RecordingInProgress));
        chat.advance(secs(3));
        assert!(chat.cancel_recording());
        chat.advance(secs(100));
        assert!(chat.messages().is_empty());
        assert_eq!(chat.recording_view(), RecordingView::idle());
    }

    #[test]
    fn test_close_cancels_everything() {
        let mut chat = session();
        chat.send_text("bye").unwrap();
        chat.start_recording().unwrap();
        assert_eq!(chat.pending_timers(), 3);

        chat.close();
        assert_eq!(chat.pending_timers(), 0);
        chat.advance(secs(10));
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.messages()[0].delivery, DeliveryState::Pending);
        assert_eq!(chat.send_text("again"), Err(ChatError::Closed));
        assert_eq!(chat.start_recording(), Err(ChatError::Closed));
    }

    #[test]
    fn test_external_transport_mode() {
        let mut chat = ChatSession::new(
            ConversationId::new(),
            "Amara",
            ChatConfig {
                simulate_peer: false,
                ..ChatConfig::default()
            },
        );
        let id = chat.send_text("hi").unwrap().unwrap();
        assert_eq!(chat.pending_timers(), 0);
        assert_eq!(chat.acknowledge(id), Ok(true));
        assert_eq!(chat.acknowledge(id), Ok(false));
        assert_eq!(
            chat.acknowledge(MessageId(1)),
            Err(ChatError::UnknownMessage(MessageId(1)))
        );
        let reply = chat.receive_peer_message("hey").unwrap();
        assert!(reply > id);
        assert_eq!(chat.unread_count(), 1);
        assert_eq!(chat.take_outgoing(), vec![id]);
        assert!(chat.take_outgoing().is_empty());
    }

    #[test]
    fn test_auto_finalized_voice_queued_for_transport() {
        let mut chat = ChatSession::new(
            ConversationId::new(),
            "Amara",
            ChatConfig {
                simulate_peer: false,
                ..ChatConfig::default()
            },
        );
        chat.start_recording().unwrap();
        chat.advance(secs(60));
        assert!(!chat.is_recording());

        let queued = chat.take_outgoing();
        assert_eq!(queued.len(), 1);
        assert_eq!(chat.message(queued[0]).unwrap().voice_duration(), Some(60));
    }

    #[test]
    fn test_simulated_peer_queues_nothing() {
        let mut chat = session();
        chat.send_text("hi").unwrap();
        chat.start_recording().unwrap();
        chat.advance(secs(61));
        assert!(chat.take_outgoing().is_empty());
    }

    #[test]
    fn test_read_only_latest_received() {
        let history = vec![
            ChatMessage::text(MessageId(1), Author::Peer, "Hey! How was your day?").delivered(),
            ChatMessage::text(MessageId(3), Author::Peer, "Pretty good!").delivered(),
            ChatMessage::text(MessageId(2), Author::Local, "It was great!").delivered(),
        ];
        let mut chat =
            ChatSession::with_history(ConversationId::new(), "Amara", ChatConfig::default(), history);
        assert_eq!(chat.messages()[2].id, MessageId(3));
        assert_eq!(chat.unread_count(), 2);

        assert_eq!(chat.mark_latest_received_read(), Some(MessageId(3)));
        assert_eq!(chat.mark_latest_received_read(), None);
        assert!(!chat.message(MessageId(1)).unwrap().read);
        assert_eq!(chat.unread_count(), 1);

        let id = chat.send_text("new").unwrap().unwrap();
        assert!(id > MessageId(3));
    }
}
