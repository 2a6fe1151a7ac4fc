//! Upload-once, ask-many conversation over a single index.
//!
//! A [`RagContext`] holds the shared services (storage, loader, chunker and
//! model clients). Each [`Session`] owns its own [`VectorDB`], so sessions
//! never see each other's chunks.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AppConfig, ReuploadPolicy};
use crate::database::{FileStore, ScoredChunk, VectorDB};
use crate::document::{DocumentLoader, PdfLoader, TextChunker, UploadedFile};
use crate::error::{RagError, Result};
use crate::llm::{prompt, AnswerGenerator, EmbeddingGenerator};
use crate::providers::traits::{CompletionProvider, EmbeddingProvider};
use crate::providers::OllamaProvider;

pub struct RagContext {
    config: AppConfig,
    store: FileStore,
    loader: Arc<dyn DocumentLoader>,
    chunker: TextChunker,
    embeddings: EmbeddingGenerator,
    generator: AnswerGenerator,
}

impl RagContext {
    pub fn new(
        config: AppConfig,
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn EmbeddingProvider>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = TextChunker::new(config.chunk_size, config.chunk_overlap)?;
        Ok(Self {
            store: FileStore::new(&config.storage_root),
            embeddings: EmbeddingGenerator::new(embedder, config.embed_batch_size),
            generator: AnswerGenerator::new(completion),
            loader,
            chunker,
            config,
        })
    }

    /// Wires the PDF loader and the two Ollama models named in `config`.
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let embedder = OllamaProvider::new(&config.ollama_url, &config.embedding_model, config.request_timeout)?;
        let completion = OllamaProvider::new(&config.ollama_url, &config.chat_model, config.request_timeout)?;
        log::info!(
            "Using Ollama at {} (embeddings: {}, chat: {})",
            config.ollama_url,
            config.embedding_model,
            config.chat_model
        );
        Self::new(config, Arc::new(PdfLoader), Arc::new(embedder), Arc::new(completion))
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn generator(&self) -> &AnswerGenerator {
        &self.generator
    }

    pub fn new_session(self: &Arc<Self>) -> Session {
        Session {
            index: VectorDB::new(self.embeddings.clone()),
            ctx: Arc::clone(self),
            state: SessionState::Idle,
            turns: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexedDocument {
    pub filename: String,
    pub path: PathBuf,
    pub pages: usize,
    pub chunks: usize,
    pub indexed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SessionState {
    Idle,
    Indexed { documents: Vec<IndexedDocument> },
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    pub document: IndexedDocument,
    pub indexed_total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub text: String,
    pub reasoning: Option<String>,
    pub sources: Vec<ScoredChunk>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    #[serde(flatten)]
    pub state: SessionState,
    pub chunks: usize,
    pub turns: usize,
}

pub struct Session {
    ctx: Arc<RagContext>,
    index: VectorDB,
    state: SessionState,
    turns: usize,
}

impl Session {
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.state, SessionState::Indexed { .. })
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            state: self.state.clone(),
            chunks: self.index.len(),
            turns: self.turns,
        }
    }

    /// Saves, parses, chunks and indexes `file`. On any error the session
    /// keeps its previous state and index.
    pub async fn upload(&mut self, file: UploadedFile) -> Result<UploadReport> {
        let config = &self.ctx.config;
        validate_upload(&file, config.max_upload_bytes)?;

        let policy = config.reupload_policy;
        if self.is_indexed() && policy == ReuploadPolicy::Reject {
            return Err(RagError::Session(
                "a document is already indexed; reset the session before uploading another".to_string(),
            ));
        }

        let path = self.ctx.store.save(&file).await?;

        let loader = Arc::clone(&self.ctx.loader);
        let load_path = path.clone();
        let segments = tokio::task::spawn_blocking(move || loader.load(&load_path)).await??;

        let chunks = self.ctx.chunker.chunk(&segments);
        if chunks.is_empty() {
            return Err(RagError::Parse(format!(
                "{} contains no extractable text",
                file.name
            )));
        }
        let chunk_count = chunks.len();
        log::info!(
            "Split {} into {} chunk(s) across {} page(s)",
            file.name,
            chunk_count,
            segments.len()
        );

        let records = self.index.embed(chunks).await?;

        let document = IndexedDocument {
            filename: file.name,
            path,
            pages: segments.len(),
            chunks: chunk_count,
            indexed_at: Utc::now(),
        };

        let previous = std::mem::replace(&mut self.state, SessionState::Idle);
        let documents = match (previous, policy) {
            (SessionState::Indexed { mut documents }, ReuploadPolicy::Accumulate) => {
                if let Err(e) = self.index.insert(records) {
                    self.state = SessionState::Indexed { documents };
                    return Err(e.into());
                }
                documents.push(document.clone());
                documents
            }
            (previous, _) => {
                if let Err(e) = self.index.replace(records) {
                    self.state = previous;
                    return Err(e.into());
                }
                vec![document.clone()]
            }
        };
        self.state = SessionState::Indexed { documents };

        Ok(UploadReport {
            document,
            indexed_total: self.index.len(),
        })
    }

    /// Retrieves context for `query`, renders the prompt and generates an
    /// answer. Before any upload the context is simply empty.
    pub async fn ask(&mut self, query: &str) -> Result<Answer> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RagError::InvalidQuery("question is empty".to_string()));
        }

        let sources = self.index.search(query, self.ctx.config.top_k).await?;
        log::info!("Retrieved {} chunk(s) for query", sources.len());

        let rendered = prompt::build_from_results(query, &sources);
        let generated = self.ctx.generator.generate(&rendered).await?;
        self.turns += 1;

        Ok(Answer {
            query: query.to_string(),
            text: generated.text,
            reasoning: generated.reasoning,
            sources,
        })
    }

    pub fn reset(&mut self) {
        self.index.clear();
        self.state = SessionState::Idle;
        self.turns = 0;
        log::info!("Session reset");
    }
}

fn validate_upload(file: &UploadedFile, max_bytes: usize) -> Result<()> {
    crate::database::file_store::validate_file_name(&file.name)?;

    let is_pdf = std::path::Path::new(&file.name)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf {
        return Err(RagError::InvalidUpload(format!(
            "{} is not a PDF; only .pdf files are accepted",
            file.name
        )));
    }
    if file.bytes.is_empty() {
        return Err(RagError::InvalidUpload(format!("{} is empty", file.name)));
    }
    if file.bytes.len() > max_bytes {
        return Err(RagError::InvalidUpload(format!(
            "{} is {} bytes, above the {} byte limit",
            file.name,
            file.bytes.len(),
            max_bytes
        )));
    }
    Ok(())
}
