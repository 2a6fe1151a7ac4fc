use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::providers::traits::{CompletionProvider, EmbeddingProvider, ModelError};

/// Client for a local Ollama server. One instance serves either embeddings or
/// generation depending on the model it is built with.
#[derive(Clone)]
pub struct OllamaProvider {
    client: Client,
    url: String,
    model: String,
    timeout: Duration,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

impl OllamaProvider {
    pub fn new(url: &str, model: &str, timeout: Duration) -> Result<Self, ModelError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            timeout,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Probes the server's model listing.
    pub async fn health_check(&self) -> Result<(), ModelError> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.url))
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status: status.as_u16(), body });
        }
        Ok(())
    }

    async fn post_json<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<Value, ModelError> {
        let url = format!("{}{}", self.url, path);
        log::debug!("Ollama request to {} (model {})", url, self.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Api { status: status.as_u16(), body });
        }

        response.json::<Value>().await.map_err(|e| self.map_send_error(e))
    }

    fn map_send_error(&self, e: reqwest::Error) -> ModelError {
        if e.is_timeout() {
            ModelError::Timeout(self.timeout.as_secs())
        } else if e.is_decode() {
            ModelError::InvalidResponse(e.to_string())
        } else {
            ModelError::Http(e)
        }
    }
}

#[async_trait]
impl CompletionProvider for OllamaProvider {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
        };
        let response_json = self.post_json("/api/generate", &request).await?;

        if let Some(error) = response_json.get("error") {
            return Err(ModelError::InvalidResponse(format!("API returned error: {}", error)));
        }

        response_json
            .get("response")
            .and_then(|content| content.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| ModelError::InvalidResponse("missing `response` field".to_string()))
    }

    async fn get_model_info(&self) -> Result<String, ModelError> {
        Ok(self.model.clone())
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbedRequest {
            model: &self.model,
            input: texts,
        };
        let response_json = self.post_json("/api/embed", &request).await?;
        let parsed: EmbedResponse = serde_json::from_value(response_json)
            .map_err(|e| ModelError::InvalidResponse(format!("malformed embed response: {}", e)))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(ModelError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }
        Ok(parsed.embeddings)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
