use std::sync::Arc;

use crate::providers::traits::{EmbeddingProvider, ModelError};

/// Batches embedding requests and checks the shape of what comes back.
#[derive(Clone)]
pub struct EmbeddingGenerator {
    provider: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl EmbeddingGenerator {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, batch_size: usize) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
        }
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }

    pub async fn generate_embedding(&self, text: &str) -> Result<Vec<f32>, ModelError> {
        self.provider.embed(text).await
    }

    pub async fn generate_batch_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        let mut embeddings = Vec::with_capacity(texts.len());
        let batch_count = texts.len().div_ceil(self.batch_size);

        for (i, batch) in texts.chunks(self.batch_size).enumerate() {
            log::debug!(
                "Embedding batch {}/{} ({} texts) with {}",
                i + 1,
                batch_count,
                batch.len(),
                self.model_name()
            );
            let batch_embeddings = self.provider.embed_batch(batch).await?;
            if batch_embeddings.len() != batch.len() {
                return Err(ModelError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    batch_embeddings.len()
                )));
            }
            embeddings.extend(batch_embeddings);
        }

        if let Some(first) = embeddings.first() {
            let expected = first.len();
            if let Some(bad) = embeddings.iter().find(|e| e.len() != expected) {
                return Err(ModelError::DimensionMismatch {
                    expected,
                    actual: bad.len(),
                });
            }
        }

        Ok(embeddings)
    }
}
