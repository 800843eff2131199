//! Core data types for Tessera.
//!
//! This module defines the data structures shared by the indexer,
//! the storage contract and the retriever: chunking policies,
//! stored chunks and file records, scored results, conversation
//! turns, and the request/response pairs for retrieval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How content is cut into units before budgeting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitMode {
    /// Newline-terminated lines
    LineBased,

    /// Runs ending at the next structural punctuation character
    SeparatorBased,
}

/// Token and character budgets chosen for a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkPolicy {
    /// Maximum estimated tokens per chunk
    pub max_tokens: usize,

    /// Tokens carried from the end of one chunk into the next
    pub overlap_tokens: usize,

    /// Hard ceiling on characters (not bytes) per chunk
    pub hard_max_chars: usize,

    /// Unit splitting mode
    pub mode: SplitMode,
}

impl ChunkPolicy {
    /// Smallest token budget a policy may carry
    pub const MIN_MAX_TOKENS: usize = 32;

    /// Smallest character ceiling a policy may carry
    pub const MIN_HARD_MAX_CHARS: usize = 256;

    pub fn new(
        max_tokens: usize,
        overlap_tokens: usize,
        hard_max_chars: usize,
        mode: SplitMode,
    ) -> Self {
        Self {
            max_tokens,
            overlap_tokens,
            hard_max_chars,
            mode,
        }
        .clamped()
    }

    /// Force the policy back inside its invariants.
    ///
    /// `max_tokens >= 32`, `hard_max_chars >= 256` and
    /// `overlap_tokens <= max_tokens / 3`.
    pub fn clamped(self) -> Self {
        let max_tokens = self.max_tokens.max(Self::MIN_MAX_TOKENS);
        Self {
            max_tokens,
            overlap_tokens: self.overlap_tokens.min(max_tokens / 3),
            hard_max_chars: self.hard_max_chars.max(Self::MIN_HARD_MAX_CHARS),
            mode: self.mode,
        }
    }
}

/// Identity of a file inside a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FileKey {
    /// Repository identifier
    pub repo_id: String,

    /// Path relative to the repository root, `/`-separated
    pub path: String,
}

impl FileKey {
    pub fn new(repo_id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            repo_id: repo_id.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo_id, self.path)
    }
}

/// A stored, embeddable piece of a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Owning file
    pub file: FileKey,

    /// Zero-based position within the owning file
    pub chunk_index: usize,

    /// The chunk text
    pub content: String,

    /// Embedding vector (empty if none was computed)
    #[serde(default)]
    pub embedding: Vec<f32>,
}

impl Chunk {
    /// Path of the owning file, relative to its repository
    pub fn path(&self) -> &str {
        &self.file.path
    }

    pub fn has_embedding(&self) -> bool {
        !self.embedding.is_empty()
    }
}

/// Last indexed state of a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the repository root
    pub path: String,

    /// Hex digest of the content at indexing time
    pub content_hash: String,

    /// Language tag inferred from the path
    pub language: String,

    /// Content at indexing time
    pub content: String,

    /// When this record was written
    pub indexed_at: DateTime<Utc>,
}

/// A chunk with its relevance score for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,

    /// Cosine similarity plus any path-hint boost (higher = more relevant)
    pub score: f32,
}

/// One question/answer exchange in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
}

impl ConversationTurn {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }

    /// Text sent to the embedding service for this turn
    pub fn embedding_text(&self) -> String {
        format!("{}\n{}", self.question, self.answer)
    }
}

/// Statistics from an indexing run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Repository identifier
    pub repo_id: String,

    /// Files reported by the walker
    pub files_seen: usize,

    /// Files whose hash changed (or were new) and were re-chunked
    pub files_indexed: usize,

    /// Files skipped because their hash matched the stored one
    pub files_unchanged: usize,

    /// Files that could not be read or committed
    pub files_failed: usize,

    /// Chunks inserted across all files
    pub chunks_created: usize,

    /// Chunks dropped because their embedding call failed
    pub chunks_failed: usize,

    /// True if the run stopped early on a cancellation request
    pub cancelled: bool,

    /// Indexing duration in milliseconds
    pub duration_ms: u64,
}

/// Request for similarity retrieval
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalRequest {
    /// Natural-language question (must not be blank)
    pub question: String,

    /// Number of results (defaults to the configured `default_k`)
    #[serde(default)]
    pub top_k: Option<usize>,

    /// Restrict candidates to these repositories
    #[serde(default)]
    pub repo_ids: Option<Vec<String>>,

    /// Conversation memory vector to blend into the query
    #[serde(default)]
    pub memory_embedding: Option<Vec<f32>>,
}

impl RetrievalRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            ..Self::default()
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn with_repos(mut self, repo_ids: Vec<String>) -> Self {
        self.repo_ids = Some(repo_ids);
        self
    }

    pub fn with_memory(mut self, memory_embedding: Option<Vec<f32>>) -> Self {
        self.memory_embedding = memory_embedding;
        self
    }
}

/// Ranked retrieval output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResponse {
    /// The question as it was asked
    pub question: String,

    /// Results ordered by descending score
    pub results: Vec<ScoredChunk>,

    /// Path hint extracted from the question, if any
    pub path_hint: Option<String>,

    /// Whether a memory vector was blended into the query
    pub memory_blended: bool,

    /// Candidates with a comparable embedding
    pub candidates_scored: usize,

    /// Retrieval duration in milliseconds
    pub duration_ms: u64,
}

impl RetrievalResponse {
    /// True for the "no results" outcome
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}
