use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::pipeline::{Next, Stage};
use crate::{Result, SturdyError};

/// Decides which failed attempts are retried and how long to back off.
///
/// Connection-level failures and `>= 500` responses are retried up to
/// [`max_retries`](Self::max_retries); 4xx statuses are retried only when
/// listed in [`retryable_status_codes`](Self::retryable_status_codes). The
/// delay before retry `n` (counting from zero) is
/// `2^n * base_backoff_ms` milliseconds, with no jitter and no cap.
///
/// A policy is immutable once constructed and shared read-only across every
/// request issued by a client; per-request mutable state lives in
/// [`RetryState`].
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// 4xx status codes retried in addition to the built-in `>= 500` rule.
    pub retryable_status_codes: BTreeSet<u16>,
    /// Base backoff in milliseconds; doubles on every retry.
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retryable_status_codes: BTreeSet::from([429]),
            base_backoff_ms: 1_000,
        }
    }
}

/// Attempt counter for one logical request.
///
/// Created fresh per request and discarded when the request resolves; never
/// shared across requests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RetryState {
    attempts_so_far: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Retries issued so far for this logical request.
    pub fn attempts_so_far(&self) -> u32 {
        self.attempts_so_far
    }

    /// Records one issued retry.
    pub fn record_retry(&mut self) {
        self.attempts_so_far += 1;
    }
}

impl RetryPolicy {
    /// Whether the outcome of the current attempt warrants another try.
    ///
    /// Once the attempt counter reaches the cap the outcome is final,
    /// whatever it is. Below the cap, connection errors and retryable
    /// statuses (raw responses and translated [`SturdyError::Http`] failures
    /// alike) are retried; every other failure is final.
    pub fn should_retry(&self, state: &RetryState, outcome: &Result<reqwest::Response>) -> bool {
        if state.attempts_so_far >= self.max_retries {
            return false;
        }
        match outcome {
            Ok(response) => self.retries_status(response.status().as_u16()),
            Err(SturdyError::Http { status, .. }) => self.retries_status(*status),
            Err(err) => err.is_connect(),
        }
    }

    /// Whether a response status alone warrants a retry.
    pub fn retries_status(&self, status: u16) -> bool {
        status >= 500 || self.retryable_status_codes.contains(&status)
    }

    /// Backoff before the next retry: `2^attempts_so_far * base_backoff_ms`.
    ///
    /// The shift is clamped at 63 bits and the multiply saturates, which is
    /// unreachable for any realistic retry cap.
    pub fn compute_delay(&self, state: &RetryState) -> Duration {
        let exp = state.attempts_so_far.min(63);
        Duration::from_millis(self.base_backoff_ms.saturating_mul(1u64 << exp))
    }
}

/// Outermost pipeline stage: re-issues failed attempts per a [`RetryPolicy`].
///
/// The backoff sleep suspends only the calling request's task; dropping the
/// request future aborts the in-flight attempt or sleep. Requests with
/// streaming bodies cannot be replayed and are sent exactly once, whatever
/// the policy says.
pub(crate) struct RetryStage {
    policy: RetryPolicy,
}

impl RetryStage {
    pub(crate) fn new(policy: RetryPolicy) -> Self {
        Self { policy }
    }
}

#[async_trait]
impl Stage for RetryStage {
    async fn handle(&self, request: reqwest::Request, next: Next<'_>) -> Result<reqwest::Response> {
        let mut state = RetryState::new();
        loop {
            let attempt = match request.try_clone() {
                Some(attempt) => attempt,
                // Streaming body: nothing left to replay after the first send.
                None => return next.run(request).await,
            };

            let outcome = next.clone().run(attempt).await;
            if !self.policy.should_retry(&state, &outcome) {
                return outcome;
            }

            let delay = self.policy.compute_delay(&state);
            #[cfg(feature = "tracing")]
            tracing::debug!("retrying request after {} ms", delay.as_millis());
            sleep(delay).await;
            state.record_retry();
        }
    }
}
