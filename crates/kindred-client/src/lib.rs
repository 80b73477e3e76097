//! # kindred-client
//!
//! Glue between the sans-IO cores and the outside world:
//!
//! - **Collaborators**: async traits for authentication, media, face
//!   verification, profile persistence, the candidate directory and the
//!   messaging transport, with in-memory implementations
//! - **Chat driver**: a tokio task that owns a [`kindred_chat::ChatSession`]
//!   and runs its timers on the real clock
//! - **Onboarding service**: the wizard wired to the collaborators
//! - **Configuration** from environment variables and tracing setup

pub mod chat_driver;
pub mod collaborators;
pub mod config;
pub mod events;
pub mod mock;
pub mod onboarding;
pub mod state;

mod error;

pub use chat_driver::{spawn_chat_driver, ChatCommand, ChatHandle};
pub use config::ClientConfig;
pub use error::{CollaboratorError, ConfigError, ServiceError};

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str =
    "kindred_client=debug,kindred_chat=debug,kindred_onboarding=info,kindred_discovery=info,warn";

/// Install the global tracing subscriber. `RUST_LOG` takes precedence over
/// [`DEFAULT_LOG_FILTER`].
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .try_init();
}
