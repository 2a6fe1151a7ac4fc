pub mod ollama;
pub mod traits;
pub mod utils;

#[cfg(test)]
pub mod mock;

pub use ollama::OllamaProvider;
pub use traits::{CompletionProvider, EmbeddingProvider, ModelError};
