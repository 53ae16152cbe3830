//! Global configuration model for the Conwatch service.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{ConwatchError, Result};

/// Root configuration for the Conwatch service.
///
/// All fields have documented defaults; absent values fall back to them
/// rather than failing startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConwatchConfig {
    /// Address the HTTP/WebSocket server listens on.
    pub listen_addr: SocketAddr,
    /// Minimum spacing between consecutive runtime polls.
    pub poll_interval: Duration,
    /// Bound of each session's outbound snapshot queue.
    pub queue_bound: usize,
    /// Explicit container runtime binary; `None` auto-detects.
    pub runtime_binary: Option<String>,
}

impl Default for ConwatchConfig {
    fn default() -> Self {
        Self {
            // The default address is a compile-time constant and always parses.
            listen_addr: constants::DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 1111))),
            poll_interval: Duration::from_secs(constants::DEFAULT_POLL_INTERVAL_SECS),
            queue_bound: constants::DEFAULT_QUEUE_BOUND,
            runtime_binary: None,
        }
    }
}

impl ConwatchConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the poll interval is zero or the queue bound
    /// leaves no room for even a single pending snapshot.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(ConwatchError::Config {
                message: "poll interval must be greater than zero".to_string(),
            });
        }
        if self.queue_bound == 0 {
            return Err(ConwatchError::Config {
                message: "queue bound must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ConwatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr.port(), 1111);
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.queue_bound, 8);
        assert!(config.runtime_binary.is_none());
    }

    #[test]
    fn zero_interval_rejected() {
        let config = ConwatchConfig {
            poll_interval: Duration::ZERO,
            ..ConwatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_queue_bound_rejected() {
        let config = ConwatchConfig {
            queue_bound: 0,
            ..ConwatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
