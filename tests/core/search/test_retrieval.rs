// End-to-end retrieval tests: index a repository with the keyword
// embedder, then query it.

use crate::common::{create_test_services, index_test_repository, TestRepo, TestServices};
use tessera::core::error::TesseraError;
use tessera::core::types::{Chunk, FileKey, RetrievalRequest};
use tokio_util::sync::CancellationToken;

async fn indexed_demo() -> (TestRepo, TestServices) {
    let repo = TestRepo::small();
    let test = create_test_services();
    index_test_repository(&test.services, repo.path(), "demo").await;
    (repo, test)
}

#[tokio::test]
async fn test_most_relevant_file_ranks_first() {
    let (_repo, test) = indexed_demo().await;

    let response = test
        .services
        .retriever
        .retrieve(
            RetrievalRequest::new("where is the auth password check?"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!response.is_empty());
    assert_eq!(response.results[0].chunk.path(), "src/auth.rs");
    assert_eq!(response.question, "where is the auth password check?");
    assert!(response.path_hint.is_none());
}

#[tokio::test]
async fn test_top_k_limits_and_orders_results() {
    let (_repo, test) = indexed_demo().await;

    let response = test
        .services
        .retriever
        .retrieve(
            RetrievalRequest::new("auth and database").with_top_k(3),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.results.len(), 3);
    assert!(response
        .results
        .windows(2)
        .all(|pair| pair[0].score >= pair[1].score));
}

#[tokio::test]
async fn test_path_hint_breaks_near_ties() {
    let (_repo, test) = indexed_demo().await;

    let response = test
        .services
        .retriever
        .retrieve(
            RetrievalRequest::new("what does render.rs do with auth?"),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(response.path_hint.as_deref(), Some("render.rs"));
    assert_eq!(response.results[0].chunk.path(), "src/render.rs");
    assert_eq!(response.results[1].chunk.path(), "src/auth.rs");
}

#[tokio::test]
async fn test_mismatched_dimensions_never_returned() {
    let (_repo, test) = indexed_demo().await;

    // Left over from an older embedding model
    test.store
        .seed(vec![Chunk {
            file: FileKey::new("demo", "src/legacy_auth.rs"),
            chunk_index: 0,
            content: "auth auth auth".to_string(),
            embedding: vec![1.0, 0.0, 0.0],
        }])
        .unwrap();

    let response = test
        .services
        .retriever
        .retrieve(
            RetrievalRequest::new("auth").with_top_k(100),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!response.is_empty());
    assert!(response
        .results
        .iter()
        .all(|r| r.chunk.path() != "src/legacy_auth.rs"));
}

#[tokio::test]
async fn test_empty_question_does_no_work() {
    let (_repo, test) = indexed_demo().await;
    let calls_before = test.embedder.calls();

    let err = test
        .services
        .retriever
        .retrieve(RetrievalRequest::new(""), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, TesseraError::InvalidArgument(_)));
    assert_eq!(test.embedder.calls(), calls_before);
}

#[tokio::test]
async fn test_empty_store_is_no_results() {
    let test = create_test_services();

    let response = test
        .services
        .retriever
        .retrieve(RetrievalRequest::new("auth"), &CancellationToken::new())
        .await
        .unwrap();

    assert!(response.is_empty());
    assert_eq!(response.candidates_scored, 0);
}

#[tokio::test]
async fn test_repo_scope_excludes_other_repositories() {
    let (repo, test) = indexed_demo().await;
    index_test_repository(&test.services, repo.path(), "mirror").await;

    let response = test
        .services
        .retriever
        .retrieve(
            RetrievalRequest::new("auth")
                .with_top_k(50)
                .with_repos(vec!["mirror".to_string()]),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert!(!response.is_empty());
    assert!(response
        .results
        .iter()
        .all(|r| r.chunk.file.repo_id == "mirror"));
}
