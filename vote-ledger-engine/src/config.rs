//! Configuration types for the vote engine.
use std::env;
use std::str::FromStr;

use crate::errors::ConfigError;
use crate::scoring::DecayPolicy;

pub const VOTES_DECAY_HOURS: &str = "VOTES_DECAY_HOURS";
pub const VOTES_MAX_CONFLICT_RETRIES: &str = "VOTES_MAX_CONFLICT_RETRIES";
pub const VOTES_RECALCULATION_RETRIES: &str = "VOTES_RECALCULATION_RETRIES";
pub const VOTES_EVENT_BUFFER_SIZE: &str = "VOTES_EVENT_BUFFER_SIZE";
pub const VOTES_RATE_LIMITS_ENABLED: &str = "VOTES_RATE_LIMITS_ENABLED";

/// Configuration for the `VoteEngine`.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time-decay curve used for the ranking score.
    pub decay: DecayPolicy,
    /// How many times a cast is retried after a live-vote conflict in the store
    /// before the request fails with `ConcurrentConflict`.
    pub max_conflict_retries: usize,
    /// Retries of the post-write score recomputation before the item is queued
    /// for repair.
    pub recalculation_retries: usize,
    /// Capacity of the channel feeding the event dispatcher.
    pub event_buffer_size: usize,
    /// Whether voting rate limits are enforced.
    pub rate_limits_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decay: DecayPolicy::default(),
            max_conflict_retries: 3,
            recalculation_retries: 3,
            event_buffer_size: 1000,
            rate_limits_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Reads the configuration from the process environment.
    ///
    /// Unset variables keep their default value.
    ///
    /// # Returns
    ///
    /// * `Ok(EngineConfig)` - The resulting configuration
    /// * `Err(ConfigError)` - A variable is set but cannot be parsed or is out of range
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let decay_hours = parse_or(&lookup, VOTES_DECAY_HOURS, defaults.decay.decay_hours)?;
        if !(decay_hours.is_finite() && decay_hours > 0.0) {
            return Err(ConfigError::invalid(
                VOTES_DECAY_HOURS,
                &decay_hours.to_string(),
                "must be a positive number of hours",
            ));
        }

        let event_buffer_size =
            parse_or(&lookup, VOTES_EVENT_BUFFER_SIZE, defaults.event_buffer_size)?;
        if event_buffer_size == 0 {
            return Err(ConfigError::invalid(
                VOTES_EVENT_BUFFER_SIZE,
                "0",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            decay: DecayPolicy::new(decay_hours),
            max_conflict_retries: parse_or(
                &lookup,
                VOTES_MAX_CONFLICT_RETRIES,
                defaults.max_conflict_retries,
            )?,
            recalculation_retries: parse_or(
                &lookup,
                VOTES_RECALCULATION_RETRIES,
                defaults.recalculation_retries,
            )?,
            event_buffer_size,
            rate_limits_enabled: parse_or(
                &lookup,
                VOTES_RATE_LIMITS_ENABLED,
                defaults.rate_limits_enabled,
            )?,
        })
    }

    pub fn with_decay(mut self, decay: DecayPolicy) -> Self {
        self.decay = decay;
        self
    }

    pub fn with_max_conflict_retries(mut self, retries: usize) -> Self {
        self.max_conflict_retries = retries;
        self
    }

    pub fn with_recalculation_retries(mut self, retries: usize) -> Self {
        self.recalculation_retries = retries;
        self
    }

    pub fn with_event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = size;
        self
    }

    /// Disables voting rate limits for every request.
    pub fn without_rate_limits(mut self) -> Self {
        self.rate_limits_enabled = false;
        self
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::invalid(key, &raw, e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.decay, DecayPolicy::default());
        assert_eq!(config.max_conflict_retries, 3);
        assert_eq!(config.event_buffer_size, 1000);
        assert!(config.rate_limits_enabled);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = EngineConfig::from_lookup(lookup(&[
            (VOTES_DECAY_HOURS, "24"),
            (VOTES_MAX_CONFLICT_RETRIES, "5"),
            (VOTES_RECALCULATION_RETRIES, "1"),
            (VOTES_EVENT_BUFFER_SIZE, " 64 "),
            (VOTES_RATE_LIMITS_ENABLED, "false"),
        ]))
        .unwrap();

        assert_eq!(config.decay.decay_hours, 24.0);
        assert_eq!(config.max_conflict_retries, 5);
        assert_eq!(config.recalculation_retries, 1);
        assert_eq!(config.event_buffer_size, 64);
        assert!(!config.rate_limits_enabled);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(EngineConfig::from_lookup(lookup(&[(VOTES_DECAY_HOURS, "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[(VOTES_DECAY_HOURS, "soon")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[(VOTES_EVENT_BUFFER_SIZE, "0")])).is_err());
        assert!(EngineConfig::from_lookup(lookup(&[(VOTES_RATE_LIMITS_ENABLED, "yes")])).is_err());
    }
}
