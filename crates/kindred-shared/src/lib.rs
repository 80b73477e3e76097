//! # kindred-shared
//!
//! Types shared by every Kindred crate: identifiers, the profile draft the
//! onboarding wizard assembles, validation errors, timing constants, and the
//! virtual-clock [`timers::TimerQueue`] that stands in for UI-thread timers.

pub mod constants;
pub mod error;
pub mod profile;
pub mod timers;
pub mod types;

pub use error::ValidationError;
pub use profile::ProfileDraft;
pub use timers::{TimerId, TimerQueue};
