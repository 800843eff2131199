//! Incremental indexing module.
//!
//! Turns repository files into embedded chunks. Key features:
//!
//! - Adaptive chunk policies (dense formats get small budgets)
//! - Token- and character-budgeted chunking with whole-unit overlap
//! - SHA-256 change detection so unchanged files cost one lookup
//! - Per-file all-or-nothing commits with cooperative cancellation
//!
//! # Safety
//!
//! All character budgets and re-splits work on `char` boundaries,
//! so multi-byte content (emoji, CJK) never panics.

pub mod chunker;
pub mod hasher;
pub mod language;
pub mod pipeline;
pub mod policy;
pub mod tokens;
pub mod walker;

pub use chunker::{Chunks, TextChunk, TokenAwareChunker};
pub use hasher::ContentHasher;
pub use pipeline::{FileOutcome, IncrementalIndexer};
pub use policy::{ChunkSpecSelector, ContentSignals};
pub use tokens::{ApproxTokenCounter, CharTokenCounter, TokenCounter};
pub use walker::{DiscoveredFile, FileWalker};
