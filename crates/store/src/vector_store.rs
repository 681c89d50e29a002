//! Vector store abstraction for sections.

use crate::loader;
use crate::types::{Section, Similarity};
use sectiondb_core::AppResult;
use std::path::Path;

/// Trait for section stores backed by a vector database.
#[async_trait::async_trait]
pub trait VectorStore: Send + Sync {
    /// Store sections with their embeddings.
    ///
    /// Returns the number of rows written.
    async fn insert(&self, sections: &[Section]) -> AppResult<u64>;

    /// Find the `top_k` stored sections nearest to `embedding`.
    ///
    /// Results are ordered as the server ranks them, nearest first.
    async fn query(&self, embedding: &[f64], top_k: usize) -> AppResult<Vec<Similarity>>;

    /// Read a JSON array of sections from `path` and insert them.
    async fn load_json(&self, path: &Path) -> AppResult<u64> {
        let sections = loader::read_sections(path).await?;
        self.insert(&sections).await
    }
}
