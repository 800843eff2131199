//! Unified service container for tessera
//!
//! Holds the shared store, embedding gateway and configuration, and
//! builds the per-request indexers, retrievers and per-session
//! conversation memories on top of them.

use crate::core::config::Config;
use crate::core::embedding::EmbeddingGateway;
use crate::core::error::Result;
use crate::core::indexer::{ChunkSpecSelector, FileWalker, IncrementalIndexer};
use crate::core::memory::ConversationMemory;
use crate::core::search::SimilarityRetriever;
use crate::core::storage::ChunkStore;
use std::sync::Arc;

/// Unified services container
#[derive(Clone)]
pub struct Services {
    /// Chunk storage shared by indexing and retrieval
    pub store: Arc<dyn ChunkStore>,

    /// External embedding service
    pub embedder: Arc<dyn EmbeddingGateway>,

    /// Retrieval service
    pub retriever: Arc<SimilarityRetriever>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl Services {
    /// Create services from configuration and the two external
    /// collaborators
    pub fn new(
        config: Config,
        store: Arc<dyn ChunkStore>,
        embedder: Arc<dyn EmbeddingGateway>,
    ) -> Self {
        let retriever = Arc::new(SimilarityRetriever::new(
            Arc::clone(&embedder),
            Arc::clone(&store),
            config.retrieval.clone(),
        ));

        Self {
            store,
            embedder,
            retriever,
            config: Arc::new(config),
        }
    }

    /// Create an indexer using the configured patterns
    pub fn create_indexer(&self) -> Result<IncrementalIndexer> {
        self.create_indexer_with_patterns(
            self.config.indexing.include_patterns.clone(),
            self.config.indexing.exclude_patterns.clone(),
        )
    }

    /// Create an indexer with request-specific patterns
    pub fn create_indexer_with_patterns(
        &self,
        include_patterns: Vec<String>,
        exclude_patterns: Vec<String>,
    ) -> Result<IncrementalIndexer> {
        let indexing = &self.config.indexing;
        let walker = FileWalker::new(
            include_patterns,
            exclude_patterns,
            indexing.max_file_size_mb,
        )?;
        let selector = ChunkSpecSelector::new(
            indexing.max_tokens,
            indexing.overlap_tokens,
            indexing.hard_max_chars,
        )
        .with_sample_chars(indexing.sample_chars);

        Ok(IncrementalIndexer::new(
            walker,
            selector,
            Arc::clone(&self.embedder),
            Arc::clone(&self.store),
        ))
    }

    /// Start a new conversation; each session gets its own memory
    pub fn new_conversation(&self) -> ConversationMemory {
        ConversationMemory::new(Arc::clone(&self.embedder), self.config.memory.max_turns)
    }
}
