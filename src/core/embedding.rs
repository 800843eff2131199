//! Embedding service contract.
//!
//! The embedding model lives outside this crate. Indexing treats a
//! failed call as "skip this chunk"; retrieval treats a failed query
//! embedding as a hard failure.

use async_trait::async_trait;

use crate::core::error::Result;

/// Turns text into a fixed-length vector
#[async_trait]
pub trait EmbeddingGateway: Send + Sync {
    /// Embed one piece of text.
    ///
    /// Failures should be reported as
    /// [`TesseraError::EmbeddingFailed`](crate::core::error::TesseraError::EmbeddingFailed).
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Model identifier, for logs
    fn model_name(&self) -> &str {
        "unknown"
    }
}
