use std::time::Duration;

/// Application name
pub const APP_NAME: &str = "Kindred";

/// Simulated transport acknowledgement latency for an outgoing chat message
pub const DELIVERY_DELAY: Duration = Duration::from_millis(1_000);

/// Delay before the simulated peer answers an outgoing chat message
pub const AUTO_REPLY_DELAY: Duration = Duration::from_millis(2_000);

/// Voice message recording granularity
pub const RECORDING_TICK: Duration = Duration::from_secs(1);

/// Voice messages are clamped to this range (seconds)
pub const MIN_VOICE_SECS: u32 = 1;
pub const MAX_VOICE_SECS: u32 = 60;

/// Longest voice prompt answer on the profile (seconds)
pub const MAX_VOICE_PROMPT_SECS: u32 = 30;

/// Duration used when a recording is stopped before the first tick
pub const EMPTY_RECORDING_SECS: u32 = 5;

/// OTP resend countdown
pub const OTP_RESEND_SECS: u32 = 60;

/// Number of digits in a one-time code
pub const OTP_LENGTH: usize = 5;

/// Minimum number of digits in a phone number
pub const MIN_PHONE_DIGITS: usize = 10;

/// Face verification progress tick (0..=100 in 100 ticks)
pub const FACE_VERIFICATION_TICK: Duration = Duration::from_millis(50);

/// Pause between 100% and the verification being reported complete
pub const FACE_VERIFICATION_SETTLE: Duration = Duration::from_millis(1_000);

/// Additional photo slots next to the main photo
pub const PHOTO_SLOTS: usize = 5;

/// Poll prompts always carry exactly this many options
pub const POLL_OPTIONS: usize = 3;

/// Maximum poll option length in characters
pub const MAX_POLL_OPTION_LEN: usize = 90;

/// Maximum written prompt answer length in characters
pub const MAX_PROMPT_ANSWER_LEN: usize = 300;

/// Default discovery age range
pub const DEFAULT_AGE_RANGE: (u8, u8) = (20, 40);

/// Default discovery distance in kilometres
pub const DEFAULT_DISTANCE_KM: u32 = 20;

/// Reply texts of the simulated peer
pub const TEXT_AUTO_REPLY: &str = "That sounds lovely! 😊";
pub const VOICE_AUTO_REPLY: &str = "Nice voice message! 👍";
