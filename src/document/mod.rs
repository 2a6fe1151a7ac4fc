pub mod chunker;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use chunker::TextChunker;
pub use loader::{DocumentLoader, PdfLoader};

/// An upload as received from a surface, before it touches storage.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentMetadata {
    pub source: PathBuf,
    /// 1-based page number within the source document.
    pub page: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSegment {
    pub text: String,
    pub metadata: SegmentMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Character offset of the chunk within its segment.
    pub start_index: usize,
    pub metadata: SegmentMetadata,
}
