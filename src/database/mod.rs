pub mod file_store;
pub mod vector_db;

pub use file_store::FileStore;
pub use vector_db::{ScoredChunk, VectorDB, VectorRecord};
