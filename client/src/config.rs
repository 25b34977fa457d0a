use embassy_time::Duration;
use serde::{Deserialize, Serialize};

/// Retry and queueing policy of a [`crate::state::MessageHandler`].
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct HandlerConfig {
    /// Retransmissions after the first submission.
    pub retry_count: u8,
    /// Fixed acknowledgement timeout. `None` asks the transport.
    pub ack_timeout_ms: Option<u64>,
    /// Bound of the queue holding messages the transport refused.
    pub queue_depth: usize,
    /// TTL for targets that do not set one. `None` defers to the transport.
    pub default_ttl: Option<u8>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            retry_count: 2,
            ack_timeout_ms: None,
            queue_depth: 32,
            default_ttl: None,
        }
    }
}

impl HandlerConfig {
    pub fn ack_timeout(&self) -> Option<Duration> {
        self.ack_timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HandlerConfig::default();
        assert_eq!(2, config.retry_count);
        assert_eq!(32, config.queue_depth);
        assert_eq!(None, config.ack_timeout());
        assert_eq!(None, config.default_ttl);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: HandlerConfig =
            serde_json::from_str(r#"{ "ack_timeout_ms": 500, "default_ttl": 7 }"#).unwrap();
        assert_eq!(2, config.retry_count);
        assert_eq!(Some(Duration::from_millis(500)), config.ack_timeout());
        assert_eq!(Some(7), config.default_ttl);
        assert_eq!(32, config.queue_depth);
    }
}
