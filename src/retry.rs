//! Retry policy executor with exponential backoff.

use anyhow::Error;
use log::{debug, info, warn};
use std::fmt;
use std::time::Duration;

/// Default maximum number of attempts for network operations.
pub const MAX_RETRIES: u32 = 3;

/// Base delay between retry attempts in milliseconds; doubles per retry.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Attempt bound for one executor invocation.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first. Zero means the
    /// request is never sent and the executor fails immediately.
    pub max_retries: u32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
        }
    }
}

/// Result of a single send attempt, as classified by the transport layer.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// Successful response; terminal.
    Success(T),
    /// Response that must be handed back to the caller unchanged; terminal.
    NonRetryable(T),
    /// Transport failure or retryable status; counted and retried.
    Transient(Error),
}

/// All attempts exhausted without a terminal outcome.
///
/// The message reports only the attempt count; the last transient failure
/// is kept as [`source`](std::error::Error::source) for diagnostics.
#[derive(Debug)]
pub struct ServiceTimeout {
    retries: u32,
    last_error: Option<Error>,
}

impl ServiceTimeout {
    /// The attempt bound that was exhausted.
    pub fn retries(&self) -> u32 {
        self.retries
    }
}

impl fmt::Display for ServiceTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed after {} retries", self.retries)
    }
}

impl std::error::Error for ServiceTimeout {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.last_error.as_ref().map(AsRef::as_ref)
    }
}

/// Delay before retry number `retry`, counted from 1: 1s, 2s, 4s, 8s, ...
pub fn backoff_delay(retry: u32) -> Duration {
    // Shift is capped so absurd attempt counts cannot overflow.
    let factor = 1u64 << retry.saturating_sub(1).min(16);
    Duration::from_millis(RETRY_DELAY_MS.saturating_mul(factor))
}

/// Runs `send` until it yields a terminal outcome or the attempt bound is
/// exhausted, waiting with exponential backoff between attempts.
///
/// The request is captured by the `send` closure; each invocation is one
/// attempt against the transport. The backoff wait is an awaitable timer,
/// so dropping the returned future cancels the in-flight attempt or wait
/// immediately.
pub async fn execute<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    send: F,
) -> Result<T, ServiceTimeout>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = AttemptOutcome<T>>,
{
    let mut attempt = 0u32;
    let mut last_error = None;

    while attempt < config.max_retries {
        match send().await {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::NonRetryable(value) => {
                debug!("{}: non-retryable response, handing back", operation_name);
                return Ok(value);
            }
            AttemptOutcome::Transient(e) => {
                warn!("{}: attempt {} failed: {}", operation_name, attempt + 1, e);
                last_error = Some(e);
            }
        }

        attempt += 1;
        if attempt < config.max_retries {
            let delay = backoff_delay(attempt);
            info!("{}: retrying in {} ms", operation_name, delay.as_millis());
            tokio::time::sleep(delay).await;
        }
    }

    Err(ServiceTimeout {
        retries: config.max_retries,
        last_error,
    })
}
