//! HTTP client wrapper that applies the retry policy to reqwest requests.

use anyhow::{Context, Result, anyhow, ensure};
use log::debug;
use reqwest::{Client, Request, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::retry::{self, AttemptOutcome, RetryConfig};

/// Client-error statuses that a retry cannot fix. Responses with these
/// statuses are handed back to the caller untouched instead of retried.
pub fn is_non_retryable_status(status: StatusCode) -> bool {
    matches!(status, StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND)
}

/// Classifies one completed attempt. Dropping a retryable response here
/// releases its body and connection before the backoff wait.
fn classify_response(response: Response) -> AttemptOutcome<Response> {
    let status = response.status();
    if status.is_success() {
        AttemptOutcome::Success(response)
    } else if is_non_retryable_status(status) {
        AttemptOutcome::NonRetryable(response)
    } else {
        AttemptOutcome::Transient(anyhow!("HTTP {}", status))
    }
}

/// HTTP client with built-in retry and exponential backoff.
#[derive(Clone)]
pub struct RetryClient {
    client: Client,
    config: RetryConfig,
}

impl RetryClient {
    /// Wraps the given reqwest Client with the retry policy.
    pub fn new(client: Client, config: RetryConfig) -> Self {
        Self { client, config }
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Sends a request, retrying transient failures with exponential backoff.
    ///
    /// 2xx responses and the non-retryable client statuses (400, 404) are
    /// returned as responses; transport errors and other non-2xx statuses
    /// are retried until the attempt bound is hit, then surface as
    /// [`ServiceTimeout`](crate::retry::ServiceTimeout).
    ///
    /// The request body must be cloneable so every attempt can resend it.
    #[tracing::instrument(skip(self, request), fields(url = %request.url()))]
    pub async fn execute(&self, request: Request) -> Result<Response> {
        ensure!(
            request.try_clone().is_some(),
            "cannot retry a request with a streaming body"
        );

        let response = retry::execute(&self.config, "execute", || async {
            // checked above; a non-cloneable body never reaches this point
            let Some(request) = request.try_clone() else {
                return AttemptOutcome::Transient(anyhow!("request body is not cloneable"));
            };
            match self.client.execute(request).await {
                Ok(response) => classify_response(response),
                Err(e) => AttemptOutcome::Transient(e.into()),
            }
        })
        .await?;

        Ok(response)
    }

    /// Performs a GET request with retries.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, url: &str) -> Result<Response> {
        debug!("GET {}...", url);

        let request = self
            .client
            .get(url)
            .build()
            .context("Failed to build request")?;

        self.execute(request).await
    }

    /// Performs a GET request and deserializes the JSON response.
    /// Automatically retries on transient errors; a non-retryable 400/404
    /// response surfaces as an error here since it carries no value to parse.
    #[tracing::instrument(skip(self))]
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("GET JSON from {}...", url);

        let response = self.get(url).await?;
        let response = response
            .error_for_status()
            .context("Request failed with a non-retryable status")?;

        let result = response
            .json::<T>()
            .await
            .context("Failed to parse JSON response")?;

        Ok(result)
    }
}
