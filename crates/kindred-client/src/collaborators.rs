//! Boundary contracts to the services the cores depend on.
//!
//! None of these have a real backend yet; [`crate::mock`] provides the
//! in-memory versions used by the demo and the tests.

use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use kindred_chat::ChatMessage;
use kindred_discovery::{Candidate, DiscoveryFilters};
use kindred_shared::types::{ConversationId, MediaRef, MessageId, ProfileId};
use kindred_shared::ProfileDraft;

use crate::error::CollaboratorError;

pub type CollaboratorResult<T> = Result<T, CollaboratorError>;

/// Phone number verification.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Send a one-time code to `phone_number`.
    async fn send_otp(&self, phone_number: &str) -> CollaboratorResult<()>;

    /// Whether `code` is the one sent to `phone_number`.
    async fn verify_otp(&self, phone_number: &str, code: &str) -> CollaboratorResult<bool>;
}

/// Camera and photo library.
#[async_trait]
pub trait MediaSource: Send + Sync {
    async fn capture_image(&self) -> CollaboratorResult<MediaRef>;

    async fn pick_image(&self) -> CollaboratorResult<MediaRef>;
}

#[async_trait]
pub trait FaceVerifier: Send + Sync {
    /// Start a verification run. The stream yields progress in `0..=100`
    /// and ends after reaching 100.
    async fn run_verification(&self) -> CollaboratorResult<BoxStream<'static, u8>>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn commit_profile(&self, draft: &ProfileDraft) -> CollaboratorResult<ProfileId>;
}

#[async_trait]
pub trait CandidateDirectory: Send + Sync {
    async fn list_candidates(&self, filters: &DiscoveryFilters) -> CollaboratorResult<Vec<Candidate>>;
}

/// Pushed by a [`MessagingTransport`] for one conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TransportEvent {
    /// The peer's side acknowledged an outgoing message.
    Delivered { id: MessageId },
    /// The peer wrote something.
    Incoming { body: String },
}

#[async_trait]
pub trait MessagingTransport: Send + Sync {
    async fn send_message(
        &self,
        conversation: ConversationId,
        message: &ChatMessage,
    ) -> CollaboratorResult<MessageId>;

    /// Receipts and incoming messages for `conversation`. A new
    /// subscription replaces the previous one.
    fn subscribe(&self, conversation: ConversationId) -> mpsc::Receiver<TransportEvent>;
}

/// Every collaborator the client needs, shared between services.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthService>,
    pub media: Arc<dyn MediaSource>,
    pub faces: Arc<dyn FaceVerifier>,
    pub profiles: Arc<dyn ProfileStore>,
    pub directory: Arc<dyn CandidateDirectory>,
    pub transport: Arc<dyn MessagingTransport>,
}
