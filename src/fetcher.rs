use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::FetchError;
use crate::models::{GenerateRequest, GenerateResponse};
use crate::retry::{RetryPolicy, retry_with_backoff};
use crate::transport::Transport;

/// Issues one logical generate call as up to `policy.max_attempts` physical
/// attempts, each bounded by `attempt_timeout`. Elapsing the timeout drops
/// the in-flight future, which cancels the underlying request; the aborted
/// attempt counts as a retryable timeout and never applies its result.
pub struct ResilientFetcher {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
    attempt_timeout: Duration,
    system_instruction: String,
}

impl ResilientFetcher {
    pub fn new(
        transport: Arc<dyn Transport>,
        policy: RetryPolicy,
        attempt_timeout: Duration,
        system_instruction: String,
    ) -> Self {
        Self {
            transport,
            policy,
            attempt_timeout,
            system_instruction,
        }
    }

    pub async fn fetch(&self, query: &str) -> Result<GenerateResponse, FetchError> {
        let request = GenerateRequest::new(query, &self.system_instruction);
        let request = &request;

        retry_with_backoff(
            &self.policy,
            |err: &FetchError| err.is_retryable(),
            |attempt| async move {
                tracing::debug!(attempt = attempt + 1, "issuing generate request");
                match timeout(self.attempt_timeout, self.transport.generate(request)).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        tracing::debug!(attempt = attempt + 1, "attempt timed out");
                        Err(FetchError::Timeout)
                    }
                }
            },
        )
        .await
    }
}
