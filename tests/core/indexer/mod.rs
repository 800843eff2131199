//! Indexer layer tests
//!
//! Incremental indexing against the in-memory store, adaptive policy
//! selection on real-looking files, and UTF-8 safe chunking.

mod test_incremental;
