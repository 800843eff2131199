//! Per-file write batches.

use crate::core::types::{Chunk, FileKey, FileRecord};

/// One storage write
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Remove every chunk owned by the file
    DeleteChunksForFile,

    /// Insert one chunk
    InsertChunk(Chunk),

    /// Record the file's new content hash (and the rest of its record)
    SetFileRecord(FileRecord),
}

/// All writes for one file, applied all-or-nothing by the store.
///
/// Chunks pushed through [`FileTransaction::push_chunk`] get
/// contiguous zero-based indices in push order.
#[derive(Debug, Clone, PartialEq)]
pub struct FileTransaction {
    key: FileKey,
    ops: Vec<WriteOp>,
    next_index: usize,
}

impl FileTransaction {
    pub fn new(key: FileKey) -> Self {
        Self {
            key,
            ops: Vec::new(),
            next_index: 0,
        }
    }

    /// Start a transaction that replaces every chunk of `key`
    pub fn replace(key: FileKey) -> Self {
        let mut tx = Self::new(key);
        tx.ops.push(WriteOp::DeleteChunksForFile);
        tx
    }

    pub fn key(&self) -> &FileKey {
        &self.key
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }

    /// Whether the transaction starts by deleting existing chunks
    pub fn deletes_existing(&self) -> bool {
        self.ops
            .iter()
            .any(|op| matches!(op, WriteOp::DeleteChunksForFile))
    }

    /// Number of chunks queued so far
    pub fn chunk_count(&self) -> usize {
        self.next_index
    }

    /// Queue a chunk at the next index
    pub fn push_chunk(&mut self, content: String, embedding: Vec<f32>) -> usize {
        let chunk_index = self.next_index;
        self.ops.push(WriteOp::InsertChunk(Chunk {
            file: self.key.clone(),
            chunk_index,
            content,
            embedding,
        }));
        self.next_index += 1;
        chunk_index
    }

    /// Queue the record (and content hash) to store for the file
    pub fn set_record(&mut self, record: FileRecord) {
        self.ops.push(WriteOp::SetFileRecord(record));
    }
}
