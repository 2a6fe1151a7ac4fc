use parking_lot::RwLock;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

use crate::document::Chunk;
use crate::llm::EmbeddingGenerator;
use crate::providers::traits::ModelError;

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// In-memory cosine-similarity index. Records live as long as the index.
#[derive(Clone)]
pub struct VectorDB {
    embeddings: EmbeddingGenerator,
    records: Arc<RwLock<Vec<VectorRecord>>>,
}

impl VectorDB {
    pub fn new(embeddings: EmbeddingGenerator) -> Self {
        Self {
            embeddings,
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Embeds `chunks` without touching the index.
    pub async fn embed(&self, chunks: Vec<Chunk>) -> Result<Vec<VectorRecord>, ModelError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self.embeddings.generate_batch_embeddings(&texts).await?;

        Ok(chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| VectorRecord { chunk, embedding })
            .collect())
    }

    /// Embeds and inserts `chunks`. Nothing is inserted if any embedding fails.
    pub async fn add(&self, chunks: Vec<Chunk>) -> Result<usize, ModelError> {
        let records = self.embed(chunks).await?;
        self.insert(records)
    }

    pub fn insert(&self, records: Vec<VectorRecord>) -> Result<usize, ModelError> {
        let mut guard = self.records.write();
        check_dimensions(guard.first(), &records)?;
        let added = records.len();
        guard.extend(records);
        log::info!("Indexed {} chunk(s), {} total", added, guard.len());
        Ok(added)
    }

    /// Swaps the whole index for `records`.
    pub fn replace(&self, records: Vec<VectorRecord>) -> Result<usize, ModelError> {
        check_dimensions(None, &records)?;
        let mut guard = self.records.write();
        *guard = records;
        log::info!("Index replaced, {} chunk(s)", guard.len());
        Ok(guard.len())
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// Returns up to `k` chunks, most similar first. An empty index returns
    /// an empty result without calling the embedding service.
    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, ModelError> {
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let query_embedding = self.embeddings.generate_embedding(query).await?;

        let records = self.records.read();
        if let Some(first) = records.first() {
            if first.embedding.len() != query_embedding.len() {
                return Err(ModelError::DimensionMismatch {
                    expected: first.embedding.len(),
                    actual: query_embedding.len(),
                });
            }
        }

        let mut scored: Vec<ScoredChunk> = records
            .iter()
            .map(|record| ScoredChunk {
                chunk: record.chunk.clone(),
                score: cosine_similarity(&query_embedding, &record.embedding),
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

fn check_dimensions(existing: Option<&VectorRecord>, records: &[VectorRecord]) -> Result<(), ModelError> {
    let expected = match existing.or_else(|| records.first()) {
        Some(record) => record.embedding.len(),
        None => return Ok(()),
    };
    match records.iter().find(|r| r.embedding.len() != expected) {
        Some(bad) => Err(ModelError::DimensionMismatch {
            expected,
            actual: bad.embedding.len(),
        }),
        None => Ok(()),
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
