//! Milvus client abstraction.
//!
//! The trait covers exactly the database calls sectiondb issues. It lets
//! the store run against the REST transport or the recording mock.

use crate::column::Column;
use crate::types::{
    CollectionSchema, ConsistencyLevel, IndexParams, LoadState, SearchRequest, SearchResult,
};
use sectiondb_core::AppResult;

/// Trait for Milvus transports.
#[async_trait::async_trait]
pub trait MilvusClient: Send + Sync {
    /// Get the transport name (e.g., "rest", "mock").
    fn transport_name(&self) -> &str;

    /// Check whether a collection exists.
    async fn has_collection(&self, collection: &str) -> AppResult<bool>;

    /// Create a collection from a schema.
    ///
    /// # Arguments
    /// * `schema` - Schema, including the collection name
    /// * `shards` - Number of shards
    /// * `consistency` - Default consistency level for searches
    async fn create_collection(
        &self,
        schema: &CollectionSchema,
        shards: u32,
        consistency: ConsistencyLevel,
    ) -> AppResult<()>;

    /// Drop a collection and all of its data.
    async fn drop_collection(&self, collection: &str) -> AppResult<()>;

    /// Release a collection from query node memory.
    async fn release_collection(&self, collection: &str) -> AppResult<()>;

    /// Load a collection into query node memory.
    async fn load_collection(&self, collection: &str) -> AppResult<()>;

    /// Get the loading state of a collection.
    async fn get_load_state(&self, collection: &str) -> AppResult<LoadState>;

    /// Get the number of stored rows.
    async fn collection_row_count(&self, collection: &str) -> AppResult<u64>;

    /// Create an index on a field.
    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        index: &IndexParams,
    ) -> AppResult<()>;

    /// Insert equal-length columns.
    ///
    /// # Returns
    /// The number of rows inserted
    async fn insert(&self, collection: &str, columns: &[Column]) -> AppResult<u64>;

    /// Search with a single query vector.
    async fn search(&self, request: &SearchRequest) -> AppResult<SearchResult>;
}
