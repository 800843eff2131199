//! Incremental indexing pipeline.
//!
//! Coordinates the per-repository indexing workflow:
//! 1. Walk the repository root
//! 2. Read each file and hash its content
//! 3. Skip files whose hash matches the stored one
//! 4. Select a chunk policy, chunk, and embed each chunk
//! 5. Commit delete + inserts + new hash as one transaction
//!
//! Files are processed one at a time so embedding calls are never
//! issued concurrently and per-file writes cannot interleave.
//! Cancellation is checked before the file read, during the stored
//! hash lookup, before every embedding call and before the commit. A cancelled file commits
//! nothing, so the next run picks it up again.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::core::embedding::EmbeddingGateway;
use crate::core::error::{Result, TesseraError};
use crate::core::indexer::{
    language, ChunkSpecSelector, ContentHasher, DiscoveredFile, FileWalker, TokenAwareChunker,
};
use crate::core::storage::{ChunkStore, FileTransaction};
use crate::core::types::{FileKey, FileRecord, IndexStats};

/// What happened to a single file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Hash matched; nothing was read from or written to storage
    /// beyond the hash lookup
    Unchanged,

    /// Chunks were replaced
    Indexed {
        chunks_created: usize,
        chunks_failed: usize,
    },
}

/// Orchestrates incremental indexing of a repository
pub struct IncrementalIndexer {
    walker: FileWalker,
    selector: ChunkSpecSelector,
    chunker: TokenAwareChunker,
    hasher: ContentHasher,
    embedder: Arc<dyn EmbeddingGateway>,
    store: Arc<dyn ChunkStore>,
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(TesseraError::Cancelled);
    }
    Ok(())
}

impl IncrementalIndexer {
    /// Create a new indexer
    ///
    /// # Arguments
    ///
    /// * `walker` - File discovery with include/exclude patterns
    /// * `selector` - Chunk policy selection seeded with the
    ///   configured defaults
    /// * `embedder` - Embedding service
    /// * `store` - Chunk storage
    pub fn new(
        walker: FileWalker,
        selector: ChunkSpecSelector,
        embedder: Arc<dyn EmbeddingGateway>,
        store: Arc<dyn ChunkStore>,
    ) -> Self {
        Self {
            walker,
            selector,
            chunker: TokenAwareChunker::new(),
            hasher: ContentHasher,
            embedder,
            store,
        }
    }

    /// Index every matching file under `root`.
    ///
    /// Errors on individual files are logged and counted but do not
    /// stop the run. A cancellation request stops the run at the next
    /// check and is reported through `IndexStats::cancelled`; files
    /// already committed stay committed.
    pub async fn index_repository(
        &self,
        repo_id: &str,
        root: &Path,
        cancel: &CancellationToken,
    ) -> Result<IndexStats> {
        let start = Instant::now();

        if repo_id.trim().is_empty() {
            return Err(TesseraError::InvalidArgument(
                "Repository id cannot be empty".to_string(),
            ));
        }
        check_cancelled(cancel)?;

        tracing::info!("Starting file collection from {:?}", root);
        let files = self.collect_files(root.to_path_buf()).await?;
        tracing::info!(
            "Found {} files to index in {} (embedding model: {})",
            files.len(),
            repo_id,
            self.embedder.model_name()
        );

        let mut stats = IndexStats {
            repo_id: repo_id.to_string(),
            files_seen: files.len(),
            ..IndexStats::default()
        };

        for (idx, file) in files.iter().enumerate() {
            if idx % 100 == 0 && idx > 0 {
                tracing::info!("Progress: {}/{} files processed", idx, files.len());
            }

            match self.index_file(repo_id, file, cancel).await {
                Ok(FileOutcome::Unchanged) => {
                    stats.files_unchanged += 1;
                }
                Ok(FileOutcome::Indexed {
                    chunks_created,
                    chunks_failed,
                }) => {
                    stats.files_indexed += 1;
                    stats.chunks_created += chunks_created;
                    stats.chunks_failed += chunks_failed;
                }
                Err(e) if e.is_cancelled() => {
                    tracing::info!(
                        "Indexing of {} cancelled at {} ({}/{} files done)",
                        repo_id,
                        file.relative,
                        idx,
                        files.len()
                    );
                    stats.cancelled = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("Failed to index {}: {}", file.relative, e);
                    stats.files_failed += 1;
                }
            }
        }

        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Indexing {} complete: {} indexed, {} unchanged, {} failed, \
             {} chunks created ({} embedding failures) in {}ms",
            repo_id,
            stats.files_indexed,
            stats.files_unchanged,
            stats.files_failed,
            stats.chunks_created,
            stats.chunks_failed,
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Walk on the blocking pool; walkdir is synchronous
    async fn collect_files(&self, root: PathBuf) -> Result<Vec<DiscoveredFile>> {
        let walker = self.walker.clone();
        tokio::task::spawn_blocking(move || walker.collect_files(&root))
            .await
            .map_err(|e| TesseraError::IndexingFailed(format!("File walk aborted: {e}")))?
    }

    /// Index one file: hash, compare, and re-chunk if changed
    pub async fn index_file(
        &self,
        repo_id: &str,
        file: &DiscoveredFile,
        cancel: &CancellationToken,
    ) -> Result<FileOutcome> {
        let key = FileKey::new(repo_id, file.relative.as_str());

        check_cancelled(cancel)?;
        let content = read_text(&file.absolute).await?;

        let stored = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TesseraError::Cancelled),
            stored = self.store.stored_hash(&key) => stored?,
        };
        let Some(hash) = self.hasher.has_changed(stored.as_deref(), &content) else {
            tracing::debug!("Unchanged: {}", key);
            return Ok(FileOutcome::Unchanged);
        };

        let extension = language::extension_of(&file.relative);
        let policy = self
            .selector
            .select(&file.relative, extension.as_deref(), &content);

        let mut tx = FileTransaction::replace(key.clone());
        let mut chunks_failed = 0;

        for (position, piece) in self.chunker.chunks(&content, policy).enumerate() {
            check_cancelled(cancel)?;
            match self.embedder.embed(&piece.text).await {
                Ok(embedding) => {
                    tx.push_chunk(piece.text, embedding);
                }
                Err(e) => {
                    tracing::warn!(
                        "Skipping chunk {} of {}: embedding failed: {}",
                        position,
                        key,
                        e
                    );
                    chunks_failed += 1;
                }
            }
        }

        let chunks_created = tx.chunk_count();
        tx.set_record(FileRecord {
            path: file.relative.clone(),
            content_hash: hash,
            language: language::language_for_path(&file.relative).to_string(),
            content,
            indexed_at: Utc::now(),
        });

        check_cancelled(cancel)?;
        self.store.commit(tx).await?;

        tracing::debug!(
            "Indexed {} ({} chunks, {:?}, {} tokens max)",
            key,
            chunks_created,
            policy.mode,
            policy.max_tokens
        );

        Ok(FileOutcome::Indexed {
            chunks_created,
            chunks_failed,
        })
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path).await.map_err(|e| {
        // Invalid UTF-8 usually means a binary file
        if e.kind() == std::io::ErrorKind::InvalidData {
            TesseraError::IndexingFailed(format!("Skipping non-UTF-8 file: {path:?}"))
        } else {
            TesseraError::IndexingFailed(format!("Failed to read {path:?}: {e}"))
        }
    })
}
