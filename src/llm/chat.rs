use serde::Serialize;
use std::sync::Arc;

use crate::providers::traits::{CompletionProvider, ModelError};
use crate::providers::utils::split_reasoning;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedText {
    pub text: String,
    pub reasoning: Option<String>,
}

/// Sends rendered prompts to the language model.
#[derive(Clone)]
pub struct AnswerGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl AnswerGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub async fn generate(&self, prompt: &str) -> Result<GeneratedText, ModelError> {
        let raw = self.provider.complete(prompt).await?;
        let (text, reasoning) = split_reasoning(&raw);
        log::debug!(
            "Generated {} chars ({} chars of reasoning)",
            text.len(),
            reasoning.as_ref().map_or(0, |r| r.len())
        );
        Ok(GeneratedText { text, reasoning })
    }

    pub async fn model_info(&self) -> Result<String, ModelError> {
        self.provider.get_model_info().await
    }
}
