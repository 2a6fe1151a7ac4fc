pub mod chat;
pub mod embeddings;
pub mod prompt;

pub use chat::{AnswerGenerator, GeneratedText};
pub use embeddings::EmbeddingGenerator;
