//! Client-side HTTP retry policy with exponential backoff.
//!
//! Wraps a reqwest [`Client`](reqwest::Client) so that transient failures
//! (transport errors and retryable non-2xx statuses) are resent with
//! exponentially increasing delays, while 400 and 404 responses are handed
//! back to the caller untouched.

pub mod http;
pub mod retry;
