// ============================================
// File: crates/bless-transport/src/retry.rs
// ============================================
//! # Retry Policy
//!
//! ## Creation Reason
//! Every gateway call is wrapped in the same bounded retry: a fixed number
//! of attempts separated by a fixed pause.
//!
//! ## Attempt Timeline (default policy)
//! ```text
//!  attempt 1 ──✗── 5s ── attempt 2 ──✗── 5s ── ... ── attempt 5 ──✗──► Err
//!      │                     │
//!      └──✓──► Ok            └──✓──► Ok
//! ```
//!
//! ## ⚠️ Important Note for Next Developer
//! - No backoff, no jitter: the delay is the same before every retry
//! - There is no pause after the final attempt
//! - Local errors (`is_retryable() == false`) end the run immediately
//!
//! ## Last Modified
//! v0.1.0 - Initial retry policy

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Result, TransportError};
use crate::traits::Operation;

/// Default number of attempts per call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

// ============================================
// RetryPolicy
// ============================================

/// Fixed-delay bounded retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Zero behaves as one.
    pub max_attempts: u32,
    /// Pause between two attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Creates a policy with the given attempts and delay.
    #[must_use]
    pub const fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
        }
    }

    /// Retries without pausing.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self::fixed(max_attempts, Duration::ZERO)
    }

    /// A single attempt, no retry.
    #[must_use]
    pub const fn single() -> Self {
        Self::immediate(1)
    }

    /// Effective number of attempts.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        if self.max_attempts == 0 {
            1
        } else {
            self.max_attempts
        }
    }

    /// Runs `call` until it succeeds or the attempts are used up.
    ///
    /// `call` receives the 1-based attempt number.
    ///
    /// # Errors
    /// - The error itself if it is not retryable
    /// - `RetriesExhausted` wrapping the last error otherwise
    pub async fn run<T, F, Fut>(&self, operation: Operation, mut call: F) -> Result<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts();
        let mut attempt = 1;
        loop {
            match call(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(%operation, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) if attempt >= attempts => {
                    return Err(TransportError::RetriesExhausted {
                        operation,
                        attempts: attempt,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    warn!(
                        %operation,
                        attempt,
                        max_attempts = attempts,
                        error = %err,
                        "Attempt failed, retrying in {}s",
                        self.delay.as_secs()
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

// ============================================
// Tests
// ============================================
