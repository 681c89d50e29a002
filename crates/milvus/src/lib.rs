//! Milvus client crate for sectiondb.
//!
//! Provides a transport-agnostic abstraction over the Milvus operations
//! sectiondb needs: collection lifecycle, index creation, columnar insert
//! and single-vector search.
//!
//! # Transports
//! - **REST**: Milvus RESTful API v2 (default)
//! - **Mock**: recording in-memory client for tests
//!
//! # Example
//! ```no_run
//! use sectiondb_milvus::{MilvusClient, providers::RestClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = RestClient::new("localhost:19530");
//! let exists = client.has_collection("handbook").await?;
//! println!("exists: {}", exists);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod column;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::MilvusClient;
pub use column::Column;
pub use factory::create_client;
pub use providers::{MockCall, MockClient, RestClient};
pub use types::{
    CollectionSchema, ConsistencyLevel, DataType, FieldSchema, IndexParams, IndexType, LoadState,
    MetricType, SearchRequest, SearchResult, TypeParams,
};
