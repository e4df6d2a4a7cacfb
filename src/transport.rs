use async_trait::async_trait;
use reqwest::Client;

use crate::error::FetchError;
use crate::models::{GenerateRequest, GenerateResponse};

const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// One physical attempt against the generative-language API. Retry and
/// timeout live in the fetcher, not here, so mocks exercise the real
/// resilience path.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, FetchError>;
}

pub struct GeminiTransport {
    client: Client,
    url: String,
}

impl GeminiTransport {
    pub fn new(api_key: &str, model: &str) -> Self {
        Self {
            client: Client::new(),
            url: format!("{API_BASE_URL}/{model}:generateContent?key={api_key}"),
        }
    }
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, req: &GenerateRequest) -> Result<GenerateResponse, FetchError> {
        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "application/json")
            .json(req)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            // A 2xx body that fails to decode is treated like a dropped
            // connection: retry-worthy, not terminal.
            return response
                .json()
                .await
                .map_err(|e| FetchError::Network(format!("failed to decode response body: {e}")));
        }

        // 429 and the 5xx range are request-timing problems worth retrying;
        // any other non-2xx status means the request itself is bad.
        if status.as_u16() == 429 || status.is_server_error() {
            Err(FetchError::Transient {
                status: status.as_u16(),
            })
        } else {
            Err(FetchError::Terminal {
                status: status.as_u16(),
            })
        }
    }
}
