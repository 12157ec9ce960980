pub mod client;
pub mod gemini;
pub mod image;

use crate::generation::GenerationConfig;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use client::OpenAiClient;
pub use gemini::GeminiClient;
pub use image::HuggingFaceClient;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("openai-compatible backend error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),
}

/// Text generation backend. `Ok(None)` means the backend answered with nothing usable.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<Option<String>, BackendError>;
}

/// Image generation backend. `Ok(None)` means an empty payload.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn text_to_image(&self, prompt: &str) -> Result<Option<Vec<u8>>, BackendError>;
}

/// Outcome of a backend call, with the empty case separated from success.
#[derive(Debug)]
pub enum Generation<T> {
    Success(T),
    Empty,
    Failed(BackendError),
}

impl Generation<String> {
    /// Trim the text and fold whitespace-only results into `Empty`.
    pub fn from_text(result: Result<Option<String>, BackendError>) -> Self {
        match result {
            Ok(Some(text)) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    Generation::Empty
                } else {
                    Generation::Success(trimmed.to_string())
                }
            }
            Ok(None) => Generation::Empty,
            Err(e) => Generation::Failed(e),
        }
    }
}

impl Generation<Vec<u8>> {
    pub fn from_image(result: Result<Option<Vec<u8>>, BackendError>) -> Self {
        match result {
            Ok(Some(bytes)) if !bytes.is_empty() => Generation::Success(bytes),
            Ok(_) => Generation::Empty,
            Err(e) => Generation::Failed(e),
        }
    }
}
