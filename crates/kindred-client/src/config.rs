//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the demo runs with zero configuration.
//! Invalid values are logged and ignored.

use std::str::FromStr;
use std::time::Duration;

use kindred_chat::ChatConfig;
use kindred_shared::constants::{
    AUTO_REPLY_DELAY, DELIVERY_DELAY, EMPTY_RECORDING_SECS, MAX_VOICE_SECS, MIN_VOICE_SECS,
    OTP_RESEND_SECS,
};
use kindred_shared::types::Tier;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Simulated acknowledgement latency for outgoing chat messages.
    /// Env: `KINDRED_DELIVERY_DELAY_MS`
    /// Default: `1000`
    pub delivery_delay: Duration,

    /// Delay before the simulated peer replies.
    /// Env: `KINDRED_REPLY_DELAY_MS`
    /// Default: `2000`
    pub reply_delay: Duration,

    /// Voice recordings auto-stop at this length.
    /// Env: `KINDRED_MAX_RECORDING_SECS` (1..=60)
    /// Default: `60`
    pub max_recording_secs: u32,

    /// Length given to a recording stopped before its first second.
    /// Env: `KINDRED_EMPTY_RECORDING_SECS` (1..=60)
    /// Default: `5`
    pub empty_recording_secs: u32,

    /// OTP resend countdown.
    /// Env: `KINDRED_OTP_RESEND_SECS`
    /// Default: `60`
    pub otp_resend_secs: u32,

    /// Tier the discovery feed opens with.
    /// Env: `KINDRED_DEFAULT_TIER`
    /// Default: `signature`
    pub default_tier: Tier,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            delivery_delay: DELIVERY_DELAY,
            reply_delay: AUTO_REPLY_DELAY,
            max_recording_secs: MAX_VOICE_SECS,
            empty_recording_secs: EMPTY_RECORDING_SECS,
            otp_resend_secs: OTP_RESEND_SECS,
            default_tier: Tier::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`] with an arbitrary source of values.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(ms) = read(&lookup, "KINDRED_DELIVERY_DELAY_MS", parse_u64) {
            config.delivery_delay = Duration::from_millis(ms);
        }
        if let Some(ms) = read(&lookup, "KINDRED_REPLY_DELAY_MS", parse_u64) {
            config.reply_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = read(&lookup, "KINDRED_MAX_RECORDING_SECS", parse_voice_secs) {
            config.max_recording_secs = secs;
        }
        if let Some(secs) = read(&lookup, "KINDRED_EMPTY_RECORDING_SECS", parse_voice_secs) {
            config.empty_recording_secs = secs;
        }
        if let Some(secs) = read(&lookup, "KINDRED_OTP_RESEND_SECS", parse_u32) {
            config.otp_resend_secs = secs;
        }
        if let Some(tier) = read(&lookup, "KINDRED_DEFAULT_TIER", parse_tier) {
            config.default_tier = tier;
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter.

        config
    }

    /// Settings for a simulated chat session.
    pub fn chat_config(&self) -> ChatConfig {
        ChatConfig {
            delivery_delay: self.delivery_delay,
            reply_delay: self.reply_delay,
            max_recording_secs: self.max_recording_secs,
            empty_recording_secs: self.empty_recording_secs,
            ..ChatConfig::default()
        }
    }
}

fn read<F, T>(
    lookup: &F,
    key: &'static str,
    parse: fn(&'static str, &str) -> Result<T, ConfigError>,
) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match parse(key, raw.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(error = %e, "Invalid configuration value, using default");
            None
        }
    }
}

fn parse_number<T: FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

fn parse_u64(key: &'static str, raw: &str) -> Result<u64, ConfigError> {
    parse_number(key, raw)
}

fn parse_u32(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    parse_number(key, raw)
}

fn parse_voice_secs(key: &'static str, raw: &str) -> Result<u32, ConfigError> {
    let secs: u32 = parse_number(key, raw)?;
    if !(MIN_VOICE_SECS..=MAX_VOICE_SECS).contains(&secs) {
        return Err(ConfigError::OutOfRange {
            key,
            value: u64::from(secs),
            min: u64::from(MIN_VOICE_SECS),
            max: u64::from(MAX_VOICE_SECS),
        });
    }
    Ok(secs)
}

fn parse_tier(key: &'static str, raw: &str) -> Result<Tier, ConfigError> {
    raw.parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = config_from(&[]);
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.delivery_delay, Duration::from_millis(1_000));
        assert_eq!(config.default_tier, Tier::Signature);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("KINDRED_DELIVERY_DELAY_MS", "250"),
            ("KINDRED_REPLY_DELAY_MS", " 500 "),
            ("KINDRED_MAX_RECORDING_SECS", "30"),
            ("KINDRED_DEFAULT_TIER", "premium-b"),
        ]);
        assert_eq!(config.delivery_delay, Duration::from_millis(250));
        assert_eq!(config.reply_delay, Duration::from_millis(500));
        assert_eq!(config.max_recording_secs, 30);
        assert_eq!(config.default_tier, Tier::Executive);

        let chat = config.chat_config();
        assert_eq!(chat.max_recording_secs, 30);
        assert!(chat.simulate_peer);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("KINDRED_DELIVERY_DELAY_MS", "soon"),
            ("KINDRED_MAX_RECORDING_SECS", "600"),
            ("KINDRED_EMPTY_RECORDING_SECS", "0"),
            ("KINDRED_DEFAULT_TIER", "gold"),
        ]);
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_voice_secs_range_error() {
        assert_eq!(
            parse_voice_secs("KINDRED_MAX_RECORDING_SECS", "61"),
            Err(ConfigError::OutOfRange {
                key: "KINDRED_MAX_RECORDING_SECS",
                value: 61,
                min: 1,
                max: 60,
            })
        );
    }
}
