//! Hugging Face Inference API text-to-image client.

use super::{BackendError, ImageGenerator};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_MODEL: &str = "stabilityai/stable-diffusion-xl-base-1.0";

pub struct HuggingFaceClient {
    http: reqwest::Client,
    api_base: String,
    model: String,
    token: String,
    timeout: Duration,
}

impl HuggingFaceClient {
    pub fn new(token: &str, api_base: &str, model: &str, timeout: Duration) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            model: model.to_string(),
            token: token.to_string(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.api_base, self.model)
    }
}

#[async_trait]
impl ImageGenerator for HuggingFaceClient {
    async fn text_to_image(&self, prompt: &str) -> Result<Option<Vec<u8>>, BackendError> {
        debug!("Image request to model {}", self.model);

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.token)
            .timeout(self.timeout)
            .json(&json!({ "inputs": prompt }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(self.timeout)
                } else {
                    BackendError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // The API reports model loading and quota problems as JSON error bodies.
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Status { status, body });
        }

        let is_json = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"));
        let bytes = response.bytes().await?;
        if is_json {
            return Err(BackendError::Decode(
                String::from_utf8_lossy(&bytes).into_owned(),
            ));
        }

        if bytes.is_empty() {
            Ok(None)
        } else {
            Ok(Some(bytes.to_vec()))
        }
    }
}
