//! Client configuration.

use std::time::Duration;

use crate::RetryPolicy;

/// Where to send calls and how patient to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The single backend URL every action is posted to.
    pub endpoint: String,
    /// Deadline for establishing a connection.
    pub connect_timeout: Duration,
    /// Deadline for one whole attempt, including the body.
    pub timeout: Duration,
    /// Retry policy used when a call does not supply its own.
    pub retry: RetryPolicy,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            connect_timeout: Duration::from_secs(10),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("https://example.com/exec");
        assert_eq!(config.endpoint, "https://example.com/exec");
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = ClientConfig::new("https://example.com/exec")
            .with_retry(RetryPolicy::no_retry())
            .with_timeout(Duration::from_secs(5));
        assert_eq!(config.retry.max_retries, 0);
        assert_eq!(config.timeout, Duration::from_secs(5));
    }
}
