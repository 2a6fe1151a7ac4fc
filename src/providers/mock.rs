//! Deterministic in-process providers for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::providers::traits::{CompletionProvider, EmbeddingProvider, ModelError};

pub const MOCK_DIMENSIONS: usize = 256;

/// Hashes lowercase words into a fixed-size bag-of-words vector.
#[derive(Default)]
pub struct BagOfWordsEmbedder {
    pub calls: AtomicUsize,
}

impl BagOfWordsEmbedder {
    pub fn vector(text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; MOCK_DIMENSIONS];
        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            vector[(hasher.finish() as usize) % MOCK_DIMENSIONS] += 1.0;
        }
        vector
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingProvider for BagOfWordsEmbedder {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|t| Self::vector(t)).collect())
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Records every prompt and answers with a canned reply.
pub struct RecordingCompletion {
    reply: String,
    pub prompts: Mutex<Vec<String>>,
}

impl RecordingCompletion {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().last().cloned()
    }
}

#[async_trait]
impl CompletionProvider for RecordingCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().push(prompt.to_string());
        Ok(self.reply.clone())
    }

    async fn get_model_info(&self) -> Result<String, ModelError> {
        Ok("recording".to_string())
    }
}

/// Fails every call as an unreachable service would.
pub struct FailingProvider;

#[async_trait]
impl CompletionProvider for FailingProvider {
    async fn complete(&self, _prompt: &str) -> Result<String, ModelError> {
        Err(ModelError::Api { status: 503, body: "model unavailable".to_string() })
    }

    async fn get_model_info(&self) -> Result<String, ModelError> {
        Err(ModelError::Api { status: 503, body: "model unavailable".to_string() })
    }
}

#[async_trait]
impl EmbeddingProvider for FailingProvider {
    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, ModelError> {
        Err(ModelError::Api { status: 503, body: "model unavailable".to_string() })
    }

    fn model_name(&self) -> &str {
        "failing"
    }
}
