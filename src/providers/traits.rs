use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("API request failed: Status {status}, Body: {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Text generation backend.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError>;

    async fn get_model_info(&self) -> Result<String, ModelError>;
}

/// Embedding backend. Returns one vector per input text, in order.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        self.embed_batch(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("no embedding returned".to_string()))
    }

    fn model_name(&self) -> &str;
}
