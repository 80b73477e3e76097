//! In-memory collaborators.
//!
//! They reproduce what the app does without a backend: a fixed demo OTP,
//! stock photos, a ticking face scan, the seed candidate list and a peer
//! that acknowledges and answers every message after a delay.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use kindred_chat::{ChatConfig, ChatMessage};
use kindred_discovery::{seed_candidates, Candidate, DiscoveryFilters};
use kindred_shared::constants::FACE_VERIFICATION_TICK;
use kindred_shared::types::{ConversationId, MediaRef, MessageId, ProfileId};
use kindred_shared::ProfileDraft;

use crate::collaborators::{
    AuthService, CandidateDirectory, CollaboratorResult, Collaborators, FaceVerifier,
    MediaSource, MessagingTransport, ProfileStore, TransportEvent,
};
use crate::config::ClientConfig;
use crate::error::CollaboratorError;

/// The only code [`MockAuth`] accepts.
pub const DEMO_OTP: &str = "12345";

const STOCK_PHOTOS: [&str; 5] = [
    "https://images.unsplash.com/photo-1507003211169-0a1dd7228f2d?w=400&h=400&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1566492031773-4f4e44671d66?w=400&h=400&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?w=400&h=400&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1519345182560-3f2917c472ef?w=400&h=400&fit=crop&crop=face",
    "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=400&h=400&fit=crop&crop=face",
];

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MockAuth {
    sent: Mutex<Vec<String>>,
}

impl MockAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers a code was sent to, oldest first.
    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AuthService for MockAuth {
    async fn send_otp(&self, phone_number: &str) -> CollaboratorResult<()> {
        self.sent
            .lock()
            .map_err(|_| CollaboratorError::Unavailable)?
            .push(phone_number.to_string());
        info!(phone = %phone_number, "OTP sent");
        Ok(())
    }

    async fn verify_otp(&self, phone_number: &str, code: &str) -> CollaboratorResult<bool> {
        let known = self
            .sent
            .lock()
            .map_err(|_| CollaboratorError::Unavailable)?
            .iter()
            .any(|p| p == phone_number);
        if !known {
            return Err(CollaboratorError::NotFound(phone_number.to_string()));
        }
        Ok(code == DEMO_OTP)
    }
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

/// Hands out the stock photos in turn, for the camera and the library alike.
#[derive(Debug, Default)]
pub struct MockMedia {
    next: AtomicUsize,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_photo(&self) -> MediaRef {
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        MediaRef::new(STOCK_PHOTOS[i % STOCK_PHOTOS.len()])
    }
}

#[async_trait]
impl MediaSource for MockMedia {
    async fn capture_image(&self) -> CollaboratorResult<MediaRef> {
        Ok(self.next_photo())
    }

    async fn pick_image(&self) -> CollaboratorResult<MediaRef> {
        Ok(self.next_photo())
    }
}

// ---------------------------------------------------------------------------
// Face verification
// ---------------------------------------------------------------------------

/// One progress point per tick until 100.
#[derive(Debug, Clone)]
pub struct SimulatedFaceVerifier {
    tick: Duration,
}

impl SimulatedFaceVerifier {
    pub fn new(tick: Duration) -> Self {
        Self { tick }
    }
}

impl Default for SimulatedFaceVerifier {
    fn default() -> Self {
        Self::new(FACE_VERIFICATION_TICK)
    }
}

#[async_trait]
impl FaceVerifier for SimulatedFaceVerifier {
    async fn run_verification(&self) -> CollaboratorResult<BoxStream<'static, u8>> {
        let tick = self.tick;
        let progress = stream::unfold(0u8, move |p| async move {
            if p >= 100 {
                return None;
            }
            tokio::time::sleep(tick).await;
            Some((p + 1, p + 1))
        });
        Ok(progress.boxed())
    }
}

// ---------------------------------------------------------------------------
// Profile persistence
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct StoredProfile {
    pub draft: ProfileDraft,
    pub committed_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: Mutex<HashMap<ProfileId, StoredProfile>>,
    fail_next: AtomicBool,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next commit fail with a network error.
    pub fn fail_next_commit(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }

    pub fn get(&self, id: ProfileId) -> Option<StoredProfile> {
        self.profiles.lock().ok()?.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().map(|p| p.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn commit_profile(&self, draft: &ProfileDraft) -> CollaboratorResult<ProfileId> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            warn!("Profile commit failed");
            return Err(CollaboratorError::Network("connection reset".into()));
        }
        let id = ProfileId(Uuid::new_v4());
        let stored = StoredProfile {
            draft: draft.clone(),
            committed_at: Utc::now(),
        };
        self.profiles
            .lock()
            .map_err(|_| CollaboratorError::Unavailable)?
            .insert(id, stored);
        info!(profile = %id, "Profile committed");
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Candidate directory
// ---------------------------------------------------------------------------

/// A fixed candidate list, narrowed by the age range of the filters.
#[derive(Debug, Clone)]
pub struct FixedCandidateDirectory {
    candidates: Vec<Candidate>,
}

impl FixedCandidateDirectory {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }
}

impl Default for FixedCandidateDirectory {
    fn default() -> Self {
        Self::new(seed_candidates())
    }
}

#[async_trait]
impl CandidateDirectory for FixedCandidateDirectory {
    async fn list_candidates(&self, filters: &DiscoveryFilters) -> CollaboratorResult<Vec<Candidate>> {
        let found: Vec<Candidate> = self
            .candidates
            .iter()
            .filter(|c| filters.matches(c))
            .cloned()
            .collect();
        debug!(
            location = %filters.location,
            min_age = filters.age_range.0,
            max_age = filters.age_range.1,
            count = found.len(),
            "Candidates listed"
        );
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Messaging
// ---------------------------------------------------------------------------

/// A peer living in the same process: every message is acknowledged after
/// the delivery delay and answered after the reply delay.
#[derive(Debug)]
pub struct LoopbackTransport {
    delivery_delay: Duration,
    reply_delay: Duration,
    text_reply: String,
    voice_reply: String,
    subscribers: Mutex<HashMap<ConversationId, mpsc::Sender<TransportEvent>>>,
}

impl LoopbackTransport {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            delivery_delay: config.delivery_delay,
            reply_delay: config.reply_delay,
            text_reply: config.text_reply.clone(),
            voice_reply: config.voice_reply.clone(),
            subscribers: Mutex::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl MessagingTransport for LoopbackTransport {
    async fn send_message(
        &self,
        conversation: ConversationId,
        message: &ChatMessage,
    ) -> CollaboratorResult<MessageId> {
        let tx = self
            .subscribers
            .lock()
            .map_err(|_| CollaboratorError::Unavailable)?
            .get(&conversation)
            .cloned()
            .ok_or_else(|| CollaboratorError::NotFound(conversation.short()))?;

        let id = message.id;
        let reply = if message.is_voice() {
            self.voice_reply.clone()
        } else {
            self.text_reply.clone()
        };
        let delivery_delay = self.delivery_delay;
        let reply_delay = self.reply_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delivery_delay).await;
            let _ = tx.send(TransportEvent::Delivered { id }).await;
            tokio::time::sleep(reply_delay.saturating_sub(delivery_delay)).await;
            let _ = tx.send(TransportEvent::Incoming { body: reply }).await;
        });

        debug!(msg_id = %id, conversation = %conversation.short(), "Loopback send");
        Ok(id)
    }

    fn subscribe(&self, conversation: ConversationId) -> mpsc::Receiver<TransportEvent> {
        let (tx, rx) = mpsc::channel(64);
        match self.subscribers.lock() {
            Ok(mut subscribers) => {
                subscribers.insert(conversation, tx);
            }
            Err(_) => warn!("Subscriber table poisoned"),
        }
        rx
    }
}

/// The full set of in-memory collaborators.
pub fn in_memory_collaborators(config: &ClientConfig) -> Collaborators {
    let chat = ChatConfig {
        simulate_peer: false,
        ..config.chat_config()
    };
    Collaborators {
        auth: Arc::new(MockAuth::new()),
        media: Arc::new(MockMedia::new()),
        faces: Arc::new(SimulatedFaceVerifier::default()),
        profiles: Arc::new(InMemoryProfileStore::new()),
        directory: Arc::new(FixedCandidateDirectory::default()),
        transport: Arc::new(LoopbackTransport::new(&chat)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auth_accepts_demo_code_only() {
        let auth = MockAuth::new();
        assert!(matches!(
            auth.verify_otp("+15551234567", DEMO_OTP).await,
            Err(CollaboratorError::NotFound(_))
        ));
        auth.send_otp("+15551234567").await.unwrap();
        assert!(auth.verify_otp("+15551234567", DEMO_OTP).await.unwrap());
        assert!(!auth.verify_otp("+15551234567", "54321").await.unwrap());
        assert_eq!(auth.sent_to(), vec!["+15551234567".to_string()]);
    }

    #[tokio::test]
    async fn test_media_cycles_stock_photos() {
        let media = MockMedia::new();
        let first = media.capture_image().await.unwrap();
        for _ in 0..4 {
            media.pick_image().await.unwrap();
        }
        assert_eq!(media.pick_image().await.unwrap(), first);
    }

    #[tokio::test(start_paused = true)]
    async fn test_face_verifier_streams_to_100() {
        let verifier = SimulatedFaceVerifier::default();
        let progress: Vec<u8> = verifier.run_verification().await.unwrap().collect().await;
        assert_eq!(progress.len(), 100);
        assert_eq!(progress.first(), Some(&1));
        assert_eq!(progress.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_profile_store_failure_then_success() {
        let store = InMemoryProfileStore::new();
        let draft = ProfileDraft::new();
        store.fail_next_commit();
        assert!(store.commit_profile(&draft).await.is_err());
        assert!(store.is_empty());

        let id = store.commit_profile(&draft).await.unwrap();
        assert_eq!(store.get(id).unwrap().draft, draft);
    }

    #[tokio::test]
    async fn test_directory_filters_by_age() {
        let directory = FixedCandidateDirectory::default();
        let all = directory
            .list_candidates(&DiscoveryFilters::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 6);

        let filters = DiscoveryFilters {
            age_range: (20, 25),
            ..DiscoveryFilters::default()
        };
        let young = directory.list_candidates(&filters).await.unwrap();
        let names: Vec<_> = young.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Sarah", "Jessica"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loopback_acknowledges_then_replies() {
        let transport = LoopbackTransport::new(&ChatConfig::default());
        let conversation = ConversationId::new();
        let message = ChatMessage::text(MessageId(7), kindred_shared::types::Author::Local, "hi");

        assert!(transport.send_message(conversation, &message).await.is_err());

        let mut rx = transport.subscribe(conversation);
        transport.send_message(conversation, &message).await.unwrap();
        assert_eq!(
            rx.recv().await,
            Some(TransportEvent::Delivered { id: MessageId(7) })
        );
        assert_eq!(
            rx.recv().await,
            Some(TransportEvent::Incoming {
                body: "That sounds lovely! 😊".into()
            })
        );
    }
}
