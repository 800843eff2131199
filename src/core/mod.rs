//! Core domain logic
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **embedding**: Embedding service contract
//! - **indexer**: Policy selection, chunking, hashing, incremental pipeline
//! - **storage**: Chunk store contract and in-memory store
//! - **search**: Vector math, path hints, similarity retrieval
//! - **memory**: Per-session conversation memory
//! - **services**: Unified service container

pub mod config;
pub mod embedding;
pub mod error;
pub mod indexer;
pub mod memory;
pub mod search;
pub mod services;
pub mod storage;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use embedding::EmbeddingGateway;
pub use error::{Result, TesseraError};
pub use memory::ConversationMemory;
pub use services::Services;
