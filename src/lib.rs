pub mod api;
pub mod commands;
pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod llm;
pub mod providers;
pub mod session;

// Re-export commonly used items
pub use config::{AppConfig, ReuploadPolicy};
pub use error::RagError;
pub use session::{RagContext, Session};
