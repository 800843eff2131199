//! Exact similarity retrieval.
//!
//! One linear pass over the stored chunk embeddings: embed the
//! question, optionally blend in conversation memory, score every
//! comparable candidate by cosine similarity, apply the additive
//! path-hint boost, then rank and truncate.

use std::sync::Arc;
use std::time::Instant;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::core::config::RetrievalConfig;
use crate::core::embedding::EmbeddingGateway;
use crate::core::error::{Result, TesseraError};
use crate::core::search::hint::{extract_path_hint, path_matches_hint};
use crate::core::search::vector::{blend, cosine_similarity};
use crate::core::storage::ChunkStore;
use crate::core::types::{RetrievalRequest, RetrievalResponse, ScoredChunk};

/// Similarity retrieval service
pub struct SimilarityRetriever {
    embedder: Arc<dyn EmbeddingGateway>,
    store: Arc<dyn ChunkStore>,
    config: RetrievalConfig,
}

impl SimilarityRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingGateway>,
        store: Arc<dyn ChunkStore>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            embedder,
            store,
            config,
        }
    }

    /// Resolve the effective result limit for a request
    fn limit(&self, top_k: Option<usize>) -> Result<usize> {
        match top_k {
            Some(0) => Err(TesseraError::InvalidArgument(
                "top_k must be positive".to_string(),
            )),
            Some(k) => Ok(k.min(self.config.max_k)),
            None => Ok(self.config.default_k.min(self.config.max_k)),
        }
    }

    /// Retrieve the chunks most similar to a question.
    ///
    /// Scores are cosine similarity plus the path-hint boost and are
    /// not clamped, so a boosted score may exceed 1.0. An empty result
    /// is a valid outcome.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` for a blank or over-long question or `top_k == 0`
    /// - the gateway's error if the question cannot be embedded
    /// - `Cancelled` if `cancel` fires during the candidate scan
    pub async fn retrieve(
        &self,
        request: RetrievalRequest,
        cancel: &CancellationToken,
    ) -> Result<RetrievalResponse> {
        let start = Instant::now();

        let question = request.question.trim();
        if question.is_empty() {
            return Err(TesseraError::InvalidArgument(
                "Question cannot be empty".to_string(),
            ));
        }

        let length = question.chars().count();
        if length > self.config.max_query_length {
            return Err(TesseraError::InvalidArgument(format!(
                "Question is {length} characters; the limit is {}",
                self.config.max_query_length
            )));
        }

        let k = self.limit(request.top_k)?;

        if cancel.is_cancelled() {
            return Err(TesseraError::Cancelled);
        }

        let mut query_vector = self.embedder.embed(question).await?;
        let path_hint = extract_path_hint(question);

        let mut memory_blended = false;
        if let Some(memory) = request.memory_embedding.as_deref() {
            match blend(&query_vector, memory, self.config.memory_blend_alpha) {
                Some(blended) => {
                    query_vector = blended;
                    memory_blended = true;
                }
                None => tracing::debug!(
                    "Skipping memory blend: query has {} dims, memory has {}",
                    query_vector.len(),
                    memory.len()
                ),
            }
        }

        let mut candidates = Vec::new();
        let mut candidates_scored = 0usize;
        let mut mismatched = 0usize;

        let mut stream = self.store.stream_chunks(request.repo_ids.as_deref());
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TesseraError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk?;

            if !chunk.has_embedding() {
                continue;
            }
            if chunk.embedding.len() != query_vector.len() {
                mismatched += 1;
                continue;
            }
            candidates_scored += 1;

            let mut score = cosine_similarity(&query_vector, &chunk.embedding);
            if let Some(hint) = path_hint.as_deref() {
                if path_matches_hint(chunk.path(), hint) {
                    score += self.config.path_hint_boost;
                }
            }

            if score > 0.0 {
                candidates.push(ScoredChunk { chunk, score });
            }
        }

        if mismatched > 0 {
            tracing::warn!(
                "Excluded {} chunks whose embedding dimensions differ from the query ({})",
                mismatched,
                query_vector.len()
            );
        }

        // Stable: ties keep enumeration order
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        candidates.truncate(k);

        let duration_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            "Retrieved {} of {} scored candidates in {}ms",
            candidates.len(),
            candidates_scored,
            duration_ms
        );

        Ok(RetrievalResponse {
            question: request.question,
            results: candidates,
            path_hint,
            memory_blended,
            candidates_scored,
            duration_ms,
        })
    }
}
