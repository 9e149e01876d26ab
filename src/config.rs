//! Session configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a typed default so a bare environment yields a working
//! session. Parsing goes through a lookup closure, which lets tests feed a
//! fixed map instead of mutating the process environment.

use std::time::Duration;

pub const DEFAULT_ECHO_DELAY_MS: u64 = 300;
pub const DEFAULT_ECHO_JITTER_MS: u64 = 200;
pub const DEFAULT_UPDATE_LOG_CAPACITY: usize = 20;
pub const DEFAULT_EVENT_BUFFER_CAPACITY: usize = 256;

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
    #[error("{key} must be greater than zero")]
    ZeroCapacity { key: &'static str },
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Fixed part of the artificial round-trip delay.
    pub echo_delay: Duration,
    /// Upper bound of the uniform random delay added to `echo_delay`.
    pub echo_jitter: Duration,
    /// Tree updates kept before the oldest is evicted.
    pub update_log_capacity: usize,
    /// Per-subscriber buffer for delivered frames.
    pub event_buffer_capacity: usize,
    /// Seed for the activity generator and echo jitter. `None` draws from the OS.
    pub activity_seed: Option<u64>,
    /// Insert the hard-coded roster, messages and updates at start-up.
    pub seed_samples: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            echo_delay: Duration::from_millis(DEFAULT_ECHO_DELAY_MS),
            echo_jitter: Duration::from_millis(DEFAULT_ECHO_JITTER_MS),
            update_log_capacity: DEFAULT_UPDATE_LOG_CAPACITY,
            event_buffer_capacity: DEFAULT_EVENT_BUFFER_CAPACITY,
            activity_seed: None,
            seed_samples: true,
        }
    }
}

impl SessionConfig {
    /// Build typed session config from environment variables.
    ///
    /// Optional:
    /// - `ECHO_DELAY_MS`: default 300
    /// - `ECHO_JITTER_MS`: default 200
    /// - `UPDATE_LOG_CAPACITY`: default 20
    /// - `EVENT_BUFFER_CAPACITY`: default 256
    /// - `ACTIVITY_SEED`: unset means non-deterministic
    /// - `SEED_SAMPLE_DATA`: `true` (default) or `false`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a variable is present but unparsable, or a
    /// capacity is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`SessionConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let echo_delay_ms = parse_or(&lookup, "ECHO_DELAY_MS", DEFAULT_ECHO_DELAY_MS)?;
        let echo_jitter_ms = parse_or(&lookup, "ECHO_JITTER_MS", DEFAULT_ECHO_JITTER_MS)?;
        let update_log_capacity = parse_capacity(&lookup, "UPDATE_LOG_CAPACITY", DEFAULT_UPDATE_LOG_CAPACITY)?;
        let event_buffer_capacity = parse_capacity(&lookup, "EVENT_BUFFER_CAPACITY", DEFAULT_EVENT_BUFFER_CAPACITY)?;
        let activity_seed = match lookup("ACTIVITY_SEED") {
            Some(raw) => Some(parse_value("ACTIVITY_SEED", &raw)?),
            None => None,
        };
        let seed_samples = parse_bool(lookup("SEED_SAMPLE_DATA").as_deref(), true)?;

        Ok(Self {
            echo_delay: Duration::from_millis(echo_delay_ms),
            echo_jitter: Duration::from_millis(echo_jitter_ms),
            update_log_capacity,
            event_buffer_capacity,
            activity_seed,
            seed_samples,
        })
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn parse_value<T: std::str::FromStr>(key: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| ConfigError::Invalid { key, value: raw.to_string() })
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => parse_value(key, &raw),
        None => Ok(default),
    }
}

fn parse_capacity<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = parse_or(lookup, key, default)?;
    if value == 0 {
        return Err(ConfigError::ZeroCapacity { key });
    }
    Ok(value)
}

fn parse_bool(raw: Option<&str>, default: bool) -> Result<bool, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key: "SEED_SAMPLE_DATA", value: raw.to_string() }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
