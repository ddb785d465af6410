use std::time::Duration;

use serde::Deserialize;

/// Configuration for the delivery engine.
///
/// All fields have documented defaults, so an empty configuration block
/// yields a working engine.
#[derive(Debug, Clone, Deserialize)]
pub struct DeliveryConfig {
    /// Maximum number of messages selected per tick.
    ///
    /// Default: 10
    #[serde(default = "defaults::batch_limit")]
    pub batch_limit: usize,

    /// Delivery attempts allowed before a message is failed permanently.
    ///
    /// Default: 3
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Scheduler tick interval, in minutes.
    ///
    /// Default: 1
    #[serde(default = "defaults::interval_mins")]
    pub interval_mins: u64,

    /// Upper bound on a single outbound send, in seconds, so one slow
    /// tenant SMTP server cannot starve the rest of the batch.
    ///
    /// Default: 30
    #[serde(default = "defaults::send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            batch_limit: defaults::batch_limit(),
            max_retries: defaults::max_retries(),
            interval_mins: defaults::interval_mins(),
            send_timeout_secs: defaults::send_timeout_secs(),
        }
    }
}

impl DeliveryConfig {
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_mins * 60)
    }

    #[must_use]
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }
}

mod defaults {
    pub const fn batch_limit() -> usize {
        10
    }

    pub const fn max_retries() -> u32 {
        3
    }

    pub const fn interval_mins() -> u64 {
        1
    }

    pub const fn send_timeout_secs() -> u64 {
        30
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_defaults() {
        let config = DeliveryConfig::default();
        assert_eq!(config.batch_limit, 10);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.interval_mins, 1);
        assert_eq!(config.send_timeout_secs, 30);
        assert_eq!(config.interval(), Duration::from_secs(60));
        assert_eq!(config.send_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn partial_configuration_fills_in_defaults() {
        let config: DeliveryConfig =
            serde_json::from_str(r#"{"batch_limit": 25, "interval_mins": 5}"#).unwrap();
        assert_eq!(config.batch_limit, 25);
        assert_eq!(config.interval_mins, 5);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.send_timeout_secs, 30);
    }
}
