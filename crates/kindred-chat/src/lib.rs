//! # kindred-chat
//!
//! One conversation between the local user and a single peer: an
//! append-only message log with optimistic send, delivery acknowledgement,
//! a simulated peer reply, and voice-message recording bounded to a
//! minute. All delays run on the session's own timer queue, so tearing the
//! session down cancels every one of them.

pub mod config;
pub mod message;
pub mod recording;
pub mod session;

mod error;

pub use config::ChatConfig;
pub use error::{ChatError, Result};
pub use message::{ChatMessage, DeliveryState, MessageKind};
pub use session::{ChatEvent, ChatSession};
