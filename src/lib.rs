//! Tessera - incremental code indexing and similarity retrieval
//!
//! Splits a repository into token-budgeted chunks, embeds them through
//! an external embedding service, and answers questions by scoring the
//! stored embeddings against the question's vector.
//!
//! # Architecture
//!
//! - **core**: everything
//!   - config, error, types, xdg
//!   - indexer (policy selection, chunking, hashing, pipeline)
//!   - storage (store contract, per-file transactions)
//!   - search (cosine scoring, path hints, retriever)
//!   - memory (conversation memory vector)
//!   - services (service container)
//!
//! # Key Features
//!
//! - Adaptive chunk policies for dense formats (JSON, solution files)
//! - UTF-8 safe chunking (character-based, never panics)
//! - Unchanged files are skipped by content hash
//! - Exact linear-scan retrieval with memory blending
//! - Cooperative cancellation throughout

pub mod core;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::embedding::EmbeddingGateway;
pub use core::error::{Result, TesseraError};
pub use core::indexer::IncrementalIndexer;
pub use core::memory::ConversationMemory;
pub use core::search::SimilarityRetriever;
pub use core::services::Services;
pub use core::storage::{ChunkStore, InMemoryStore};
pub use core::types::*;
