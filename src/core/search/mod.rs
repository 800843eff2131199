//! Similarity search over stored chunk embeddings.
//!
//! Retrieval is an exact linear scan; there is no approximate index.

pub mod hint;
mod retriever;
pub mod vector;

pub use hint::extract_path_hint;
pub use retriever::SimilarityRetriever;
pub use vector::cosine_similarity;
