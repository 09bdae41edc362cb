//! HTTP client module applying the retry policy to reqwest requests.

mod client;

pub use client::{RetryClient, is_non_retryable_status};
