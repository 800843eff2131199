//! In-memory chunk store.
//!
//! Keeps file records and chunks in a `BTreeMap` keyed by
//! [`FileKey`], so streaming order is stable (repository, then
//! path, then chunk index). Snapshots are written as pretty JSON,
//! the same way session metadata is persisted elsewhere.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::core::error::{Result, TesseraError};
use crate::core::storage::{ChunkStore, ChunkStream, FileTransaction, WriteOp};
use crate::core::types::{Chunk, FileKey, FileRecord};

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct FileEntry {
    record: Option<FileRecord>,
    chunks: Vec<Chunk>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    files: Vec<(FileKey, FileEntry)>,
}

/// Write operations applied so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreCounters {
    pub commits: usize,
    pub deletes: usize,
    pub inserts: usize,
    pub hash_writes: usize,
}

/// Chunk store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    files: RwLock<BTreeMap<FileKey, FileEntry>>,
    commits: AtomicUsize,
    deletes: AtomicUsize,
    inserts: AtomicUsize,
    hash_writes: AtomicUsize,
}

fn poisoned<T>(_: T) -> TesseraError {
    TesseraError::StorageError("store lock poisoned".to_string())
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, BTreeMap<FileKey, FileEntry>>> {
        self.files.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<FileKey, FileEntry>>> {
        self.files.write().map_err(poisoned)
    }

    /// Applied write counts since creation
    pub fn counters(&self) -> StoreCounters {
        StoreCounters {
            commits: self.commits.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            hash_writes: self.hash_writes.load(Ordering::Relaxed),
        }
    }

    /// Number of files with a stored record
    pub fn file_count(&self) -> Result<usize> {
        Ok(self.read()?.values().filter(|e| e.record.is_some()).count())
    }

    /// Total stored chunks
    pub fn chunk_count(&self) -> Result<usize> {
        Ok(self.read()?.values().map(|e| e.chunks.len()).sum())
    }

    /// Chunks of one file, in index order
    pub fn chunks_for(&self, key: &FileKey) -> Result<Vec<Chunk>> {
        Ok(self
            .read()?
            .get(key)
            .map(|e| e.chunks.clone())
            .unwrap_or_default())
    }

    /// Insert chunks directly, bypassing the indexer
    pub fn seed(&self, chunks: Vec<Chunk>) -> Result<()> {
        let mut files = self.write()?;
        for chunk in chunks {
            files.entry(chunk.file.clone()).or_default().chunks.push(chunk);
        }
        Ok(())
    }

    /// Apply a transaction to a copy of the file's entry.
    ///
    /// Fails without side effects if the resulting chunk indices
    /// would not be exactly `0..N`.
    fn apply(entry: &FileEntry, tx: FileTransaction) -> Result<(FileEntry, StoreCounters)> {
        let key = tx.key().clone();
        let mut next = entry.clone();
        let mut counts = StoreCounters::default();

        for op in tx.into_ops() {
            match op {
                WriteOp::DeleteChunksForFile => {
                    next.chunks.clear();
                    counts.deletes += 1;
                }
                WriteOp::InsertChunk(chunk) => {
                    if chunk.file != key {
                        return Err(TesseraError::StorageError(format!(
                            "Chunk for {} in transaction for {}",
                            chunk.file, key
                        )));
                    }
                    if chunk.chunk_index != next.chunks.len() {
                        return Err(TesseraError::StorageError(format!(
                            "Non-contiguous chunk index {} for {} (expected {})",
                            chunk.chunk_index,
                            key,
                            next.chunks.len()
                        )));
                    }
                    next.chunks.push(chunk);
                    counts.inserts += 1;
                }
                WriteOp::SetFileRecord(record) => {
                    next.record = Some(record);
                    counts.hash_writes += 1;
                }
            }
        }

        Ok((next, counts))
    }

    /// Write the whole store to `path` as JSON
    pub fn save_snapshot(&self, path: &Path) -> Result<()> {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            files: self
                .read()?
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(path, json)?;

        tracing::debug!("Saved snapshot of {} files to {:?}", snapshot.files.len(), path);
        Ok(())
    }

    /// Load a store previously written by [`InMemoryStore::save_snapshot`]
    pub fn load_snapshot(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&contents)?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(TesseraError::StorageError(format!(
                "Snapshot {:?} has version {} (supported: {})",
                path, snapshot.version, SNAPSHOT_VERSION
            )));
        }

        tracing::debug!(
            "Loaded snapshot of {} files saved at {}",
            snapshot.files.len(),
            snapshot.saved_at
        );

        Ok(Self {
            files: RwLock::new(snapshot.files.into_iter().collect()),
            ..Self::default()
        })
    }
}

#[async_trait]
impl ChunkStore for InMemoryStore {
    async fn stored_hash(&self, key: &FileKey) -> Result<Option<String>> {
        Ok(self
            .read()?
            .get(key)
            .and_then(|e| e.record.as_ref())
            .map(|r| r.content_hash.clone()))
    }

    async fn file_record(&self, key: &FileKey) -> Result<Option<FileRecord>> {
        Ok(self.read()?.get(key).and_then(|e| e.record.clone()))
    }

    async fn commit(&self, tx: FileTransaction) -> Result<()> {
        let key = tx.key().clone();
        let mut files = self.write()?;

        let current = files.get(&key).cloned().unwrap_or_default();
        let (next, counts) = Self::apply(&current, tx)?;
        files.insert(key, next);
        drop(files);

        self.commits.fetch_add(1, Ordering::Relaxed);
        self.deletes.fetch_add(counts.deletes, Ordering::Relaxed);
        self.inserts.fetch_add(counts.inserts, Ordering::Relaxed);
        self.hash_writes
            .fetch_add(counts.hash_writes, Ordering::Relaxed);
        Ok(())
    }

    fn stream_chunks<'a>(&'a self, repo_ids: Option<&'a [String]>) -> ChunkStream<'a> {
        let keys: Result<Vec<FileKey>> = self.read().map(|files| {
            files
                .keys()
                .filter(|k| repo_ids.is_none_or(|ids| ids.contains(&k.repo_id)))
                .cloned()
                .collect()
        });

        let keys = match keys {
            Ok(keys) => keys,
            Err(e) => return stream::once(async move { Err(e) }).boxed(),
        };

        // One file's chunks are cloned at a time; the lock is never
        // held across a yield
        stream::iter(keys)
            .flat_map(move |key| {
                let batch: Vec<Result<Chunk>> = match self.read() {
                    Ok(files) => files
                        .get(&key)
                        .map(|e| e.chunks.iter().cloned().map(Ok).collect())
                        .unwrap_or_default(),
                    Err(e) => vec![Err(e)],
                };
                stream::iter(batch)
            })
            .boxed()
    }
}
