//! Per-session conversation memory.
//!
//! A bounded FIFO of question/answer turns plus a cached memory
//! vector: the normalized mean of the turns' embeddings. The cache is
//! session-local; every conversation owns its own `ConversationMemory`.

use std::collections::VecDeque;
use std::fmt::Write as _;
use std::sync::Arc;

use crate::core::embedding::EmbeddingGateway;
use crate::core::error::Result;
use crate::core::search::vector::normalize;
use crate::core::types::ConversationTurn;

/// Bounded conversation history with a cached combined embedding
pub struct ConversationMemory {
    embedder: Arc<dyn EmbeddingGateway>,
    max_turns: usize,
    turns: VecDeque<ConversationTurn>,
    cached: Option<Vec<f32>>,
}

impl ConversationMemory {
    /// Create an empty memory holding at most `max_turns` turns
    /// (at least one)
    pub fn new(embedder: Arc<dyn EmbeddingGateway>, max_turns: usize) -> Self {
        let max_turns = max_turns.max(1);
        Self {
            embedder,
            max_turns,
            turns: VecDeque::with_capacity(max_turns),
            cached: None,
        }
    }

    pub fn max_turns(&self) -> usize {
        self.max_turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Turns from oldest to newest
    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    /// Record a turn, evicting the oldest when full
    pub fn add_turn(&mut self, turn: ConversationTurn) {
        if self.turns.len() == self.max_turns {
            self.turns.pop_front();
        }
        self.turns.push_back(turn);
        self.cached = None;
    }

    /// Forget every turn and the cached vector
    pub fn clear(&mut self) {
        self.turns.clear();
        self.cached = None;
    }

    /// Recent turns as plain text for an answer-generation prompt
    pub fn summary(&self) -> Option<String> {
        if self.turns.is_empty() {
            return None;
        }

        let mut out = String::new();
        for turn in &self.turns {
            // Writing to a String cannot fail
            let _ = writeln!(out, "Q: {}", turn.question.trim());
            let _ = writeln!(out, "A: {}", turn.answer.trim());
        }
        Some(out.trim_end().to_string())
    }

    /// Normalized mean of the turns' embeddings.
    ///
    /// Returns `Ok(None)` when there is no memory: no turns, or no
    /// turn produced a usable embedding. Embeddings whose length
    /// differs from the first accepted one are skipped, as are turns
    /// whose embedding call fails. A zero mean yields an all-zero
    /// vector. The result is cached until the next `add_turn` or
    /// `clear`.
    pub async fn combined_embedding(&mut self) -> Result<Option<Vec<f32>>> {
        if let Some(cached) = &self.cached {
            return Ok(Some(cached.clone()));
        }
        if self.turns.is_empty() {
            return Ok(None);
        }

        let mut sum: Option<Vec<f32>> = None;
        let mut accepted = 0usize;

        for turn in &self.turns {
            let embedding = match self.embedder.embed(&turn.embedding_text()).await {
                Ok(embedding) => embedding,
                Err(e) => {
                    tracing::warn!("Skipping conversation turn in memory vector: {}", e);
                    continue;
                }
            };

            match sum.as_mut() {
                None => {
                    // An empty first vector leaves nothing to average
                    if embedding.is_empty() {
                        break;
                    }
                    sum = Some(embedding);
                    accepted = 1;
                }
                Some(acc) if acc.len() == embedding.len() => {
                    for (a, x) in acc.iter_mut().zip(&embedding) {
                        *a += x;
                    }
                    accepted += 1;
                }
                Some(acc) => {
                    tracing::debug!(
                        "Skipping turn embedding with {} dims (expected {})",
                        embedding.len(),
                        acc.len()
                    );
                }
            }
        }

        let Some(sum) = sum else {
            return Ok(None);
        };

        let count = accepted as f32;
        let mean: Vec<f32> = sum.into_iter().map(|x| x / count).collect();
        let combined = normalize(&mean);

        self.cached = Some(combined.clone());
        Ok(Some(combined))
    }
}
