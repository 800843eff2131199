//! Chunk storage contract.
//!
//! The indexer and the retriever are independent consumers of the
//! same [`ChunkStore`]. Reads are a stored-hash lookup and a lazy
//! chunk stream; writes for one file are bundled into a
//! [`FileTransaction`] that the store applies all-or-nothing, so a
//! failure mid-file never leaves chunk indices non-contiguous.
//!
//! # Architecture
//!
//! - **ChunkStore**: async read/write contract
//! - **FileTransaction**: delete/insert/set-hash ops for one file
//! - **InMemoryStore**: bundled implementation with JSON snapshots

mod memory;
mod transaction;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::core::error::Result;
use crate::core::types::{Chunk, FileKey, FileRecord};

pub use memory::{InMemoryStore, StoreCounters};
pub use transaction::{FileTransaction, WriteOp};

/// Lazy sequence of stored chunks
pub type ChunkStream<'a> = BoxStream<'a, Result<Chunk>>;

/// Storage read/write contract
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Content hash recorded the last time `key` was indexed
    async fn stored_hash(&self, key: &FileKey) -> Result<Option<String>>;

    /// Stored record for `key`, if any
    async fn file_record(&self, key: &FileKey) -> Result<Option<FileRecord>>;

    /// Apply every op in `tx` atomically
    async fn commit(&self, tx: FileTransaction) -> Result<()>;

    /// Stream all chunks, optionally restricted to some repositories.
    ///
    /// Order is stable for an unchanged store.
    fn stream_chunks<'a>(&'a self, repo_ids: Option<&'a [String]>) -> ChunkStream<'a>;
}
