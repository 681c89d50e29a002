//! Section store on Milvus.
//!
//! Maps knowledge sections (title, heading, content, embedding) onto a
//! Milvus collection and maps similarity-search hits back to sections.
//! Indexing, ranking and consistency all stay on the server.

pub mod columns;
pub mod config;
pub mod loader;
pub mod milvus_store;
pub mod schema;
pub mod similarity;
pub mod types;
pub mod vector_store;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::StoreConfig;
pub use milvus_store::MilvusStore;
pub use types::{CollectionInfo, Embedding, Section, Similarity};
pub use vector_store::VectorStore;
