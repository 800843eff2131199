// Incremental indexing tests
//
// Hash-based skipping, contiguous re-indexing, per-chunk failure
// tolerance, cancellation, and resuming from a snapshot.

use crate::common::{
    assert_valid_stats, create_test_services, index_test_repository, FailingEmbedder,
    KeywordEmbedder, TestRepo,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tessera::core::config::Config;
use tessera::core::embedding::EmbeddingGateway;
use tessera::core::error::Result;
use tessera::core::services::Services;
use tessera::core::storage::{ChunkStore, InMemoryStore};
use tessera::core::types::FileKey;
use tokio_util::sync::CancellationToken;

fn long_database_module(functions: usize) -> String {
    (0..functions)
        .map(|i| format!("pub fn database_query_{i}() -> u32 {{ {i} }}\n"))
        .collect()
}

#[tokio::test]
async fn test_first_run_indexes_everything() {
    let repo = TestRepo::small();
    let test = create_test_services();

    let stats = index_test_repository(&test.services, repo.path(), "demo").await;

    assert_valid_stats(&stats);
    // target/ is excluded by default
    assert_eq!(stats.files_seen, 7);
    assert_eq!(stats.files_indexed, 7);
    assert_eq!(stats.files_unchanged, 0);
    assert_eq!(test.store.file_count().unwrap(), 7);
    assert_eq!(test.store.chunk_count().unwrap(), stats.chunks_created);
}

#[tokio::test]
async fn test_file_records_carry_hash_and_language() {
    let repo = TestRepo::small();
    let test = create_test_services();
    index_test_repository(&test.services, repo.path(), "demo").await;

    let record = test
        .store
        .file_record(&FileKey::new("demo", "src/auth.rs"))
        .await
        .unwrap()
        .expect("record for src/auth.rs");
    assert_eq!(record.path, "src/auth.rs");
    assert_eq!(record.language, "rust");
    assert_eq!(record.content_hash.len(), 64);
    assert!(record.content.contains("authenticate"));

    let license = test
        .store
        .file_record(&FileKey::new("demo", "LICENSE"))
        .await
        .unwrap()
        .expect("record for LICENSE");
    assert_eq!(license.language, "text");
}

#[tokio::test]
async fn test_unchanged_files_cause_no_writes() {
    let repo = TestRepo::small();
    let test = create_test_services();

    index_test_repository(&test.services, repo.path(), "demo").await;
    let counters_after_first = test.store.counters();
    let embeds_after_first = test.embedder.calls();

    let stats = index_test_repository(&test.services, repo.path(), "demo").await;

    assert_eq!(stats.files_unchanged, 7);
    assert_eq!(stats.files_indexed, 0);
    assert_eq!(stats.chunks_created, 0);
    assert_eq!(test.store.counters(), counters_after_first);
    assert_eq!(test.embedder.calls(), embeds_after_first);
}

#[tokio::test]
async fn test_changed_file_is_replaced_contiguously() {
    let repo = TestRepo::small();
    let test = create_test_services();
    index_test_repository(&test.services, repo.path(), "demo").await;

    let key = FileKey::new("demo", "src/db.rs");
    let before = test.store.counters();

    repo.write("src/db.rs", &long_database_module(300));
    let stats = index_test_repository(&test.services, repo.path(), "demo").await;
    assert_eq!(stats.files_indexed, 1);
    assert_eq!(stats.files_unchanged, 6);

    let chunks = test.store.chunks_for(&key).unwrap();
    assert!(chunks.len() > 1, "expected several chunks, got {}", chunks.len());
    let indices: Vec<usize> = chunks.iter().map(|c| c.chunk_index).collect();
    assert_eq!(indices, (0..chunks.len()).collect::<Vec<_>>());
    assert!(chunks.iter().all(|c| !c.content.contains("Pool::open")));

    let after = test.store.counters();
    assert_eq!(after.commits, before.commits + 1);
    assert_eq!(after.deletes, before.deletes + 1);
    assert_eq!(after.inserts, before.inserts + chunks.len());

    // Shrinking the file drops the extra chunks
    repo.write("src/db.rs", "pub fn connect() {}\n");
    index_test_repository(&test.services, repo.path(), "demo").await;

    let chunks = test.store.chunks_for(&key).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].chunk_index, 0);
    assert_eq!(chunks[0].content, "pub fn connect() {}\n");
}

#[tokio::test]
async fn test_repositories_are_isolated() {
    let repo = TestRepo::small();
    let test = create_test_services();

    index_test_repository(&test.services, repo.path(), "first").await;
    let stats = index_test_repository(&test.services, repo.path(), "second").await;

    // Same files under a new repository id are new files
    assert_eq!(stats.files_indexed, 7);
    assert_eq!(test.store.file_count().unwrap(), 14);
}

#[tokio::test]
async fn test_embedding_failures_do_not_abort_the_run() {
    let repo = TestRepo::small();
    let store = Arc::new(InMemoryStore::new());
    let services = Services::new(Config::default(), store.clone(), Arc::new(FailingEmbedder));

    let stats = index_test_repository(&services, repo.path(), "demo").await;

    assert_eq!(stats.files_indexed, 7);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.chunks_created, 0);
    assert!(stats.chunks_failed >= 7);
    assert_eq!(store.chunk_count().unwrap(), 0);
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let repo = TestRepo::small();
    let test = create_test_services();
    let indexer = test.services.create_indexer().unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = indexer
        .index_repository("demo", repo.path(), &cancel)
        .await
        .unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(test.store.counters().commits, 0);
}

/// Cancels the run from inside the embedding call numbered `limit`
struct CancelAfter {
    limit: usize,
    calls: AtomicUsize,
    cancel: CancellationToken,
}

#[async_trait]
impl EmbeddingGateway for CancelAfter {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) + 1 == self.limit {
            self.cancel.cancel();
        }
        Ok(KeywordEmbedder::vector_for(text))
    }
}

#[tokio::test]
async fn test_cancelled_mid_run_keeps_committed_files() {
    // One chunk per file, visited in path order
    let repo = TestRepo::with_files(&[
        ("src/a.rs", "pub fn a() {}\n"),
        ("src/b.rs", "pub fn b() {}\n"),
        ("src/c.rs", "pub fn c() {}\n"),
        ("src/d.rs", "pub fn d() {}\n"),
    ]);
    let cancel = CancellationToken::new();
    let embedder = Arc::new(CancelAfter {
        limit: 3,
        calls: AtomicUsize::new(0),
        cancel: cancel.clone(),
    });
    let store = Arc::new(InMemoryStore::new());
    let services = Services::new(Config::default(), store.clone(), embedder.clone());

    let stats = services
        .create_indexer()
        .unwrap()
        .index_repository("demo", repo.path(), &cancel)
        .await
        .unwrap();

    assert!(stats.cancelled);
    assert_eq!(stats.files_seen, 4);
    assert_eq!(stats.files_indexed, 2);
    assert!(stats.files_indexed < stats.files_seen);
    assert_eq!(store.counters().commits, 2);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 3);

    for committed in ["src/a.rs", "src/b.rs"] {
        let key = FileKey::new("demo", committed);
        assert!(store.stored_hash(&key).await.unwrap().is_some());
        assert_eq!(store.chunks_for(&key).unwrap().len(), 1);
    }

    // The interrupted file and everything after it is left for the next run
    for pending in ["src/c.rs", "src/d.rs"] {
        let key = FileKey::new("demo", pending);
        assert_eq!(store.stored_hash(&key).await.unwrap(), None);
        assert!(store.chunks_for(&key).unwrap().is_empty());
    }

    let resumed = index_test_repository(&services, repo.path(), "demo").await;
    assert_eq!(resumed.files_unchanged, 2);
    assert_eq!(resumed.files_indexed, 2);
    assert!(!resumed.cancelled);
}

#[tokio::test]
async fn test_empty_repo_id_is_rejected() {
    let repo = TestRepo::small();
    let test = create_test_services();
    let indexer = test.services.create_indexer().unwrap();

    let err = indexer
        .index_repository("  ", repo.path(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn test_missing_root_is_an_error() {
    let test = create_test_services();
    let indexer = test.services.create_indexer().unwrap();

    let err = indexer
        .index_repository(
            "demo",
            std::path::Path::new("/nonexistent/tessera/repo"),
            &CancellationToken::new(),
        )
        .await
        .unwrap_err();
    assert!(err.is_bad_request());
}

#[tokio::test]
async fn test_snapshot_resume_skips_unchanged_files() {
    let repo = TestRepo::small();
    let test = create_test_services();
    index_test_repository(&test.services, repo.path(), "demo").await;

    let snapshot_dir = tempfile::tempdir().unwrap();
    let snapshot = snapshot_dir.path().join("index.json");
    test.store.save_snapshot(&snapshot).unwrap();

    let restored = Arc::new(InMemoryStore::load_snapshot(&snapshot).unwrap());
    assert_eq!(restored.chunk_count().unwrap(), test.store.chunk_count().unwrap());

    let services = Services::new(
        Config::default(),
        restored.clone(),
        Arc::new(KeywordEmbedder::new()),
    );
    let stats = index_test_repository(&services, repo.path(), "demo").await;

    assert_eq!(stats.files_unchanged, 7);
    assert_eq!(restored.counters().commits, 0);
}
