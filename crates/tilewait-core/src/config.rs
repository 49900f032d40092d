//! Queue and drain policies.
//!
//! One authoritative set of constants. Log messages read these values
//! instead of repeating numbers in text.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Polling policy for `TileExampleQueue`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuePolicy {
    /// Sleep between poll cycles.
    pub poll_interval: Duration,

    /// Attempt ceiling: poll cycles an entry may survive before it is dropped.
    pub max_attempts: u32,

    /// Upper bound on how long `stop()` waits for the worker.
    pub stop_timeout: Duration,

    /// Whether `enqueue` starts the background worker.
    /// Hosts that drive cycles themselves with `run_cycle()` turn this off.
    pub autostart: bool,
}

impl Default for QueuePolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(120),
            max_attempts: 30,
            stop_timeout: Duration::from_secs(5),
            autostart: true,
        }
    }
}

impl QueuePolicy {
    /// Policy for callers that run cycles by hand.
    pub fn manual() -> Self {
        Self {
            autostart: false,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Total time an entry may wait before it is dropped.
    pub fn max_wait(&self) -> Duration {
        self.poll_interval * self.max_attempts
    }

    /// Read overrides from the environment; unset keys keep defaults.
    ///
    /// - `TILEWAIT_POLL_INTERVAL_SECS`
    /// - `TILEWAIT_MAX_ATTEMPTS`
    /// - `TILEWAIT_STOP_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            poll_interval: secs_or(&lookup, "TILEWAIT_POLL_INTERVAL_SECS", defaults.poll_interval)?,
            max_attempts: parse_or(&lookup, "TILEWAIT_MAX_ATTEMPTS", defaults.max_attempts)?,
            stop_timeout: secs_or(&lookup, "TILEWAIT_STOP_TIMEOUT_SECS", defaults.stop_timeout)?,
            autostart: defaults.autostart,
        })
    }
}

/// How long a deployment waits for the queue to empty before giving up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrainPolicy {
    pub max_wait: Duration,
    pub check_interval: Duration,
}

impl Default for DrainPolicy {
    fn default() -> Self {
        Self {
            max_wait: Duration::from_secs(30 * 60),
            check_interval: Duration::from_secs(30),
        }
    }
}

impl DrainPolicy {
    /// - `TILEWAIT_DRAIN_MAX_WAIT_SECS`
    /// - `TILEWAIT_DRAIN_CHECK_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            max_wait: secs_or(&lookup, "TILEWAIT_DRAIN_MAX_WAIT_SECS", defaults.max_wait)?,
            check_interval: secs_or(&lookup, "TILEWAIT_DRAIN_CHECK_SECS", defaults.check_interval)?,
        })
    }
}

fn parse_or<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn secs_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let secs = parse_or(lookup, key, default.as_secs())?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            key,
            value: secs.to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_documented_constants() {
        let policy = QueuePolicy::default();
        assert_eq!(policy.poll_interval, Duration::from_secs(120));
        assert_eq!(policy.max_attempts, 30);
        assert_eq!(policy.stop_timeout, Duration::from_secs(5));
        assert!(policy.autostart);
        // 30 cycles * 120s = 1 hour
        assert_eq!(policy.max_wait(), Duration::from_secs(3600));
    }

    #[test]
    fn empty_env_keeps_defaults() {
        let policy = QueuePolicy::from_lookup(env(&[])).unwrap();
        assert_eq!(policy, QueuePolicy::default());
        assert_eq!(DrainPolicy::from_lookup(env(&[])).unwrap(), DrainPolicy::default());
    }

    #[test]
    fn env_overrides_apply() {
        let policy = QueuePolicy::from_lookup(env(&[
            ("TILEWAIT_POLL_INTERVAL_SECS", "10"),
            ("TILEWAIT_MAX_ATTEMPTS", " 4 "),
        ]))
        .unwrap();
        assert_eq!(policy.poll_interval, Duration::from_secs(10));
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.stop_timeout, Duration::from_secs(5));
    }

    #[rstest]
    #[case("TILEWAIT_POLL_INTERVAL_SECS", "soon")]
    #[case("TILEWAIT_POLL_INTERVAL_SECS", "0")]
    #[case("TILEWAIT_MAX_ATTEMPTS", "-1")]
    #[case("TILEWAIT_STOP_TIMEOUT_SECS", "1.5")]
    fn invalid_values_are_rejected(#[case] key: &str, #[case] value: &str) {
        let err = QueuePolicy::from_lookup(env(&[(key, value)])).unwrap_err();
        let ConfigError::Invalid { key: bad_key, .. } = err;
        assert_eq!(bad_key, key);
    }

    #[test]
    fn drain_policy_reads_env() {
        let policy = DrainPolicy::from_lookup(env(&[
            ("TILEWAIT_DRAIN_MAX_WAIT_SECS", "60"),
            ("TILEWAIT_DRAIN_CHECK_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(policy.max_wait, Duration::from_secs(60));
        assert_eq!(policy.check_interval, Duration::from_secs(5));
    }
}
