//! Recording in-memory Milvus client.
//!
//! Tracks which collections exist and are loaded, records every call, and
//! answers searches with a canned result. It never ranks vectors itself.
//! Loads can be made to lag behind the load call, like a real server
//! finishing a load in the background.

use crate::client::MilvusClient;
use crate::column::{self, Column};
use crate::types::{
    CollectionSchema, ConsistencyLevel, IndexParams, LoadState, SearchRequest, SearchResult,
};
use sectiondb_core::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Server code Milvus uses for an unknown collection.
const COLLECTION_NOT_FOUND: i64 = 100;

/// Server code Milvus uses when searching a collection that is not loaded.
const COLLECTION_NOT_LOADED: i64 = 101;

/// A call received by the mock, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    HasCollection(String),
    CreateCollection {
        schema: CollectionSchema,
        shards: u32,
        consistency: ConsistencyLevel,
    },
    DropCollection(String),
    ReleaseCollection(String),
    LoadCollection(String),
    GetLoadState(String),
    RowCount(String),
    CreateIndex {
        collection: String,
        field: String,
        index: IndexParams,
    },
    Insert {
        collection: String,
        columns: Vec<Column>,
    },
    Search(SearchRequest),
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<MockCall>,
    collections: HashSet<String>,
    loaded: HashSet<String>,
    /// Collections still loading, with the polls left before they finish
    loading: HashMap<String, u32>,
    /// Polls a load takes to finish; zero loads on the spot
    load_polls: u32,
    row_counts: HashMap<String, u64>,
    search_result: SearchResult,
}

/// Mock client for tests and dry runs.
#[derive(Debug, Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    /// Create a mock with no collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend a collection already exists.
    pub fn with_collection(self, name: impl Into<String>) -> Self {
        self.lock().collections.insert(name.into());
        self
    }

    /// Answer every search with this result.
    pub fn with_search_result(self, result: SearchResult) -> Self {
        self.lock().search_result = result;
        self
    }

    /// Keep each load pending for this many load state polls.
    pub fn with_load_polls(self, polls: u32) -> Self {
        self.lock().load_polls = polls;
        self
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    /// Whether a collection currently exists.
    pub fn has(&self, name: &str) -> bool {
        self.lock().collections.contains(name)
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record a call and hand back the state for further handling.
    fn record(&self, call: MockCall) -> MutexGuard<'_, MockState> {
        let mut state = self.lock();
        state.calls.push(call);
        state
    }
}

fn not_found(collection: &str) -> AppError {
    AppError::Milvus {
        code: COLLECTION_NOT_FOUND,
        message: format!("collection not found[collection={}]", collection),
    }
}

fn ensure_exists(state: &MockState, collection: &str) -> AppResult<()> {
    if state.collections.contains(collection) {
        Ok(())
    } else {
        Err(not_found(collection))
    }
}

#[async_trait::async_trait]
impl MilvusClient for MockClient {
    fn transport_name(&self) -> &str {
        "mock"
    }

    async fn has_collection(&self, collection: &str) -> AppResult<bool> {
        let state = self.record(MockCall::HasCollection(collection.to_string()));
        Ok(state.collections.contains(collection))
    }

    async fn create_collection(
        &self,
        schema: &CollectionSchema,
        shards: u32,
        consistency: ConsistencyLevel,
    ) -> AppResult<()> {
        let mut state = self.record(MockCall::CreateCollection {
            schema: schema.clone(),
            shards,
            consistency,
        });
        if !state.collections.insert(schema.collection_name.clone()) {
            return Err(AppError::Milvus {
                code: 65535,
                message: format!("collection {} already exists", schema.collection_name),
            });
        }
        Ok(())
    }

    async fn drop_collection(&self, collection: &str) -> AppResult<()> {
        let mut state = self.record(MockCall::DropCollection(collection.to_string()));
        state.collections.remove(collection);
        state.loaded.remove(collection);
        state.loading.remove(collection);
        state.row_counts.remove(collection);
        Ok(())
    }

    async fn release_collection(&self, collection: &str) -> AppResult<()> {
        let mut state = self.record(MockCall::ReleaseCollection(collection.to_string()));
        ensure_exists(&state, collection)?;
        state.loaded.remove(collection);
        state.loading.remove(collection);
        Ok(())
    }

    async fn load_collection(&self, collection: &str) -> AppResult<()> {
        let mut state = self.record(MockCall::LoadCollection(collection.to_string()));
        ensure_exists(&state, collection)?;
        if state.loaded.contains(collection) {
            return Ok(());
        }

        if state.load_polls == 0 {
            state.loaded.insert(collection.to_string());
        } else {
            let polls = state.load_polls;
            state.loading.insert(collection.to_string(), polls);
        }
        Ok(())
    }

    async fn get_load_state(&self, collection: &str) -> AppResult<LoadState> {
        let mut state = self.record(MockCall::GetLoadState(collection.to_string()));
        if !state.collections.contains(collection) {
            return Ok(LoadState::NotExist);
        }

        if let Some(remaining) = state.loading.get_mut(collection) {
            if *remaining > 0 {
                *remaining -= 1;
                return Ok(LoadState::Loading);
            }
            state.loading.remove(collection);
            state.loaded.insert(collection.to_string());
        }

        if state.loaded.contains(collection) {
            Ok(LoadState::Loaded)
        } else {
            Ok(LoadState::NotLoad)
        }
    }

    async fn collection_row_count(&self, collection: &str) -> AppResult<u64> {
        let state = self.record(MockCall::RowCount(collection.to_string()));
        ensure_exists(&state, collection)?;
        Ok(state.row_counts.get(collection).copied().unwrap_or(0))
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        index: &IndexParams,
    ) -> AppResult<()> {
        let state = self.record(MockCall::CreateIndex {
            collection: collection.to_string(),
            field: field.to_string(),
            index: index.clone(),
        });
        ensure_exists(&state, collection)
    }

    async fn insert(&self, collection: &str, columns: &[Column]) -> AppResult<u64> {
        let mut state = self.record(MockCall::Insert {
            collection: collection.to_string(),
            columns: columns.to_vec(),
        });
        ensure_exists(&state, collection)?;

        let rows = column::row_count(columns)? as u64;
        *state.row_counts.entry(collection.to_string()).or_insert(0) += rows;
        Ok(rows)
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<SearchResult> {
        let state = self.record(MockCall::Search(request.clone()));
        ensure_exists(&state, &request.collection_name)?;

        if !state.loaded.contains(&request.collection_name) {
            return Err(AppError::Milvus {
                code: COLLECTION_NOT_LOADED,
                message: format!(
                    "collection not loaded[collection={}]",
                    request.collection_name
                ),
            });
        }

        Ok(state.search_result.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricType;

    #[tokio::test]
    async fn test_mock_tracks_collections() {
        let client = MockClient::new().with_collection("docs");
        assert_eq!(client.transport_name(), "mock");
        assert!(client.has_collection("docs").await.unwrap());
        assert!(!client.has_collection("other").await.unwrap());

        assert!(matches!(
            client.release_collection("other").await,
            Err(AppError::Milvus { code: 100, .. })
        ));

        client.load_collection("docs").await.unwrap();
        let state = client.get_load_state("docs").await.unwrap();
        assert_eq!(state, LoadState::Loaded);

        client.drop_collection("docs").await.unwrap();
        assert_eq!(
            client.get_load_state("docs").await.unwrap(),
            LoadState::NotExist
        );
        assert_eq!(client.calls().len(), 7);
    }

    #[tokio::test]
    async fn test_mock_load_finishes_after_polls() {
        let client = MockClient::new().with_collection("kb").with_load_polls(2);
        client.load_collection("kb").await.unwrap();

        let request = SearchRequest {
            collection_name: "kb".to_string(),
            partitions: Vec::new(),
            expr: String::new(),
            output_fields: Vec::new(),
            vector: vec![0.0],
            anns_field: "embedding".to_string(),
            metric_type: MetricType::L2,
            top_k: 1,
            params: Default::default(),
        };
        assert!(matches!(
            client.search(&request).await,
            Err(AppError::Milvus { code: 101, .. })
        ));

        let mut states = Vec::new();
        for _ in 0..3 {
            states.push(client.get_load_state("kb").await.unwrap());
        }
        assert_eq!(
            states,
            vec![LoadState::Loading, LoadState::Loading, LoadState::Loaded]
        );
        assert!(client.search(&request).await.is_ok());

        client.release_collection("kb").await.unwrap();
        let state = client.get_load_state("kb").await.unwrap();
        assert_eq!(state, LoadState::NotLoad);
    }

    #[tokio::test]
    async fn test_mock_counts_inserted_rows() {
        let client = MockClient::new().with_collection("docs");
        let columns = vec![Column::int64("id", vec![0, 1, 2])];

        assert_eq!(client.insert("docs", &columns).await.unwrap(), 3);
        assert_eq!(client.insert("docs", &columns).await.unwrap(), 3);
        assert_eq!(client.collection_row_count("docs").await.unwrap(), 6);
    }
}
