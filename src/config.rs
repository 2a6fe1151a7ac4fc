use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RagError, Result};

pub const DEFAULT_STORAGE_ROOT: &str = "document_store/pdfs";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

/// What a second upload does to a session that already holds a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReuploadPolicy {
    /// Drop the previous document's chunks and index the new one.
    #[default]
    Reset,
    /// Keep every uploaded document in the same index.
    Accumulate,
    /// Refuse the upload until the session is reset.
    Reject,
}

impl FromStr for ReuploadPolicy {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "reset" => Ok(Self::Reset),
            "accumulate" => Ok(Self::Accumulate),
            "reject" => Ok(Self::Reject),
            other => Err(RagError::Config(format!(
                "Unknown re-upload policy: {}. Available policies: reset, accumulate, reject",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub storage_root: PathBuf,
    pub ollama_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub top_k: usize,
    pub embed_batch_size: usize,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
    pub reupload_policy: ReuploadPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(DEFAULT_STORAGE_ROOT),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_model: DEFAULT_MODEL.to_string(),
            chat_model: DEFAULT_MODEL.to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 4,
            embed_batch_size: 32,
            request_timeout: Duration::from_secs(120),
            max_upload_bytes: 200 * MEGABYTE,
            reupload_policy: ReuploadPolicy::Reset,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let storage_root = env::var("NEXUS_STORAGE_ROOT")
            .map(PathBuf::from)
            .unwrap_or(defaults.storage_root);

        let ollama_url = env::var("OLLAMA_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.ollama_url);

        let embedding_model = env::var("NEXUS_EMBEDDING_MODEL").unwrap_or(defaults.embedding_model);
        let chat_model = env::var("NEXUS_CHAT_MODEL").unwrap_or(defaults.chat_model);

        let reupload_policy = match env::var("NEXUS_REUPLOAD_POLICY") {
            Ok(value) => value.parse().unwrap_or_else(|e| {
                log::warn!("{}; falling back to {:?}", e, defaults.reupload_policy);
                defaults.reupload_policy
            }),
            Err(_) => defaults.reupload_policy,
        };

        Self {
            storage_root,
            ollama_url,
            embedding_model,
            chat_model,
            chunk_size: env_parse("NEXUS_CHUNK_SIZE", defaults.chunk_size),
            chunk_overlap: env_parse("NEXUS_CHUNK_OVERLAP", defaults.chunk_overlap),
            top_k: env_parse("NEXUS_TOP_K", defaults.top_k),
            embed_batch_size: env_parse("NEXUS_EMBED_BATCH_SIZE", defaults.embed_batch_size),
            request_timeout: Duration::from_secs(env_parse(
                "NEXUS_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            max_upload_bytes: megabytes_to_bytes(
                env_parse("NEXUS_MAX_UPLOAD_MB", defaults.max_upload_bytes / MEGABYTE),
                defaults.max_upload_bytes,
            ),
            reupload_policy,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk size must be greater than zero".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".to_string()));
        }
        if self.embed_batch_size == 0 {
            return Err(RagError::Config("embedding batch size must be greater than zero".to_string()));
        }
        Ok(())
    }
}

const MEGABYTE: usize = 1024 * 1024;

fn megabytes_to_bytes(megabytes: usize, default: usize) -> usize {
    megabytes.checked_mul(MEGABYTE).unwrap_or_else(|| {
        log::warn!("Ignoring oversized NEXUS_MAX_UPLOAD_MB={}, using {} bytes", megabytes, default);
        default
    })
}

fn env_parse<T: FromStr + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}
