// Conversation memory feeding retrieval

use crate::common::{create_test_services, index_test_repository, TestRepo};
use tessera::core::types::{ConversationTurn, RetrievalRequest};
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn test_memory_steers_ambiguous_follow_up() {
    let repo = TestRepo::small();
    let test = create_test_services();
    index_test_repository(&test.services, repo.path(), "demo").await;

    let retriever = &test.services.retriever;
    let follow_up = "how does it connect?";

    let without_memory = retriever
        .retrieve(RetrievalRequest::new(follow_up), &CancellationToken::new())
        .await
        .unwrap();
    assert_ne!(without_memory.results[0].chunk.path(), "src/db.rs");

    let mut conversation = test.services.new_conversation();
    conversation.add_turn(ConversationTurn::new(
        "How do we open the database?",
        "connect() opens the database pool.",
    ));
    let memory = conversation.combined_embedding().await.unwrap();
    assert!(memory.is_some());

    let with_memory = retriever
        .retrieve(
            RetrievalRequest::new(follow_up).with_memory(memory),
            &CancellationToken::new(),
        )
        .await
        .unwrap();
    assert!(with_memory.memory_blended);
    assert_eq!(with_memory.results[0].chunk.path(), "src/db.rs");
}

#[tokio::test]
async fn test_memory_cache_survives_retrievals() {
    let test = create_test_services();
    let mut conversation = test.services.new_conversation();

    conversation.add_turn(ConversationTurn::new("auth?", "see authenticate()"));
    let first = conversation.combined_embedding().await.unwrap();
    let calls = test.embedder.calls();

    let second = conversation.combined_embedding().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(test.embedder.calls(), calls);

    conversation.clear();
    assert_eq!(conversation.combined_embedding().await.unwrap(), None);
    assert_eq!(conversation.summary(), None);
}

#[tokio::test]
async fn test_conversation_keeps_configured_turn_limit() {
    let test = create_test_services();
    let mut conversation = test.services.new_conversation();
    let limit = test.services.config.memory.max_turns;

    for i in 0..limit + 3 {
        conversation.add_turn(ConversationTurn::new(format!("q{i}"), format!("a{i}")));
    }

    assert_eq!(conversation.len(), limit);
    let first = conversation.turns().next().unwrap();
    assert_eq!(first.question, "q3");
    assert!(conversation.summary().unwrap().starts_with("Q: q3\nA: a3"));
}
