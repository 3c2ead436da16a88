use serde::{Deserialize, Serialize};

use crate::RetryPolicy;

/// Configures transport timeouts and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Connection-establishment timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Per-request timeout in milliseconds, covering the full exchange.
    pub request_timeout_ms: u64,
    /// Retry policy applied to transient failures.
    pub retry: RetryPolicy,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 10_000,
            request_timeout_ms: 15_000,
            retry: RetryPolicy::default(),
        }
    }
}
