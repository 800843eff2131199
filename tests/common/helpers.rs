// Test helper functions

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessera::core::config::Config;
use tessera::core::embedding::EmbeddingGateway;
use tessera::core::error::{Result, TesseraError};
use tessera::core::services::Services;
use tessera::core::storage::InMemoryStore;
use tessera::core::types::IndexStats;
use tokio_util::sync::CancellationToken;

/// Topic words the keyword embedder projects onto
pub const VOCABULARY: &[&str] = &["auth", "database", "render", "parse", "license"];

/// Deterministic fake embedding: one dimension per vocabulary word
/// (occurrence count) plus a small constant dimension so no vector
/// has zero norm.
#[derive(Default)]
pub struct KeywordEmbedder {
    calls: AtomicUsize,
}

#[allow(dead_code)] // Used in integration tests
impl KeywordEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let lower = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| lower.matches(word).count() as f32)
            .collect();
        vector.push(0.1);
        vector
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingGateway for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Self::vector_for(text))
    }

    fn model_name(&self) -> &str {
        "keyword-test"
    }
}

/// Gateway that always fails
#[allow(dead_code)] // Used in integration tests
pub struct FailingEmbedder;

#[async_trait]
impl EmbeddingGateway for FailingEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(TesseraError::EmbeddingFailed("connection refused".to_string()))
    }
}

/// Test services plus direct handles to the concrete fakes
#[allow(dead_code)] // Used in integration tests
pub struct TestServices {
    pub services: Services,
    pub store: Arc<InMemoryStore>,
    pub embedder: Arc<KeywordEmbedder>,
}

/// Create test services with an in-memory store and keyword embedder
#[allow(dead_code)] // Used in integration tests
pub fn create_test_services() -> TestServices {
    create_test_services_with_config(Config::default())
}

#[allow(dead_code)] // Used in integration tests
pub fn create_test_services_with_config(config: Config) -> TestServices {
    let store = Arc::new(InMemoryStore::new());
    let embedder = Arc::new(KeywordEmbedder::new());
    let services = Services::new(config, store.clone(), embedder.clone());

    TestServices {
        services,
        store,
        embedder,
    }
}

/// Index a test repository with the configured patterns
#[allow(dead_code)] // Used in integration tests
pub async fn index_test_repository(
    services: &Services,
    repo_path: &Path,
    repo_id: &str,
) -> IndexStats {
    let indexer = services
        .create_indexer()
        .expect("Failed to create indexer");
    indexer
        .index_repository(repo_id, repo_path, &CancellationToken::new())
        .await
        .expect("Failed to index repository")
}

/// Assert that index stats are valid
#[allow(dead_code)] // Used in integration tests
pub fn assert_valid_stats(stats: &IndexStats) {
    assert!(
        stats.files_indexed > 0,
        "Expected files_indexed > 0, got {}",
        stats.files_indexed
    );
    assert!(
        stats.chunks_created >= stats.files_indexed,
        "Expected chunks_created ({}) >= files_indexed ({})",
        stats.chunks_created,
        stats.files_indexed
    );
    assert_eq!(
        stats.files_seen,
        stats.files_indexed + stats.files_unchanged + stats.files_failed,
        "Every seen file should be accounted for"
    );
    assert!(!stats.cancelled);
}
