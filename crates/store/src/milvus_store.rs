//! Milvus-backed section store.

use crate::columns::{sections_to_columns, to_f32};
use crate::config::StoreConfig;
use crate::schema::{self, EMBEDDING_FIELD, OUTPUT_FIELDS};
use crate::similarity::similarities_from_result;
use crate::types::{CollectionInfo, Section, Similarity};
use crate::vector_store::VectorStore;
use sectiondb_core::{AppError, AppResult};
use sectiondb_milvus::{create_client, LoadState, MilvusClient, SearchRequest};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Delay between load state polls while a collection loads.
const LOAD_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Section store on a Milvus collection.
///
/// Holds one client handle; every operation is a sequence of calls on it.
pub struct MilvusStore {
    client: Arc<dyn MilvusClient>,
    config: StoreConfig,
}

impl MilvusStore {
    /// Connect to the server over REST and provision the collection.
    ///
    /// # Example
    /// ```no_run
    /// use sectiondb_store::{MilvusStore, StoreConfig};
    ///
    /// # async fn example() -> sectiondb_core::AppResult<()> {
    /// let store = MilvusStore::connect(StoreConfig::new("handbook").with_dim(384)).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(config: StoreConfig) -> AppResult<Self> {
        let config = config.normalized()?;
        let client = create_client("rest", &config.settings())?;
        Self::with_client(client, config).await
    }

    /// Provision the collection through an existing client.
    ///
    /// Releases the collection first, ignoring failures (it may not exist
    /// yet), then creates it if it is absent.
    pub async fn with_client(
        client: Arc<dyn MilvusClient>,
        config: StoreConfig,
    ) -> AppResult<Self> {
        let config = config.normalized()?;
        let store = Self { client, config };

        tracing::info!(
            "Connecting to collection '{}' via {} (dim {})",
            store.config.collection_name,
            store.client.transport_name(),
            store.config.dim
        );

        if let Err(e) = store
            .client
            .release_collection(&store.config.collection_name)
            .await
        {
            tracing::debug!("Ignoring release failure on connect: {}", e);
        }

        store.create_collection_if_not_exists().await?;
        Ok(store)
    }

    /// Build a store over REST without touching the server.
    ///
    /// For inspection and admin calls that must not provision the collection.
    pub fn open(config: StoreConfig) -> AppResult<Self> {
        let config = config.normalized()?;
        let client = create_client("rest", &config.settings())?;
        Ok(Self { client, config })
    }

    /// Get the effective configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn collection(&self) -> &str {
        &self.config.collection_name
    }

    /// Create the collection unless it exists. Returns whether it was created.
    async fn create_collection_if_not_exists(&self) -> AppResult<bool> {
        if self.client.has_collection(self.collection()).await? {
            tracing::debug!("Collection '{}' already exists", self.collection());
            return Ok(false);
        }

        let schema = schema::section_schema(self.collection(), self.config.dim);
        self.client
            .create_collection(&schema, schema::SHARDS, schema::CONSISTENCY)
            .await?;

        tracing::info!("Created collection '{}'", self.collection());
        Ok(true)
    }

    /// Load the collection and wait until the server reports it loaded.
    ///
    /// The load request returns once the load is scheduled, and searches
    /// fail until it completes.
    async fn load_and_wait(&self) -> AppResult<()> {
        self.client.load_collection(self.collection()).await?;

        let timeout = self.config.load_timeout();
        let deadline = Instant::now() + timeout;
        loop {
            match self.client.get_load_state(self.collection()).await? {
                LoadState::Loaded => return Ok(()),
                LoadState::NotExist => {
                    return Err(AppError::Config(format!(
                        "Collection '{}' does not exist",
                        self.collection()
                    )))
                }
                state => tracing::debug!("Collection '{}' is {}", self.collection(), state),
            }

            if Instant::now() >= deadline {
                return Err(AppError::Timeout(format!(
                    "collection '{}' not loaded after {}s",
                    self.collection(),
                    timeout.as_secs()
                )));
            }
            sleep(LOAD_POLL_INTERVAL).await;
        }
    }

    /// Drop the collection and everything in it.
    pub async fn drop_collection(&self) -> AppResult<()> {
        tracing::info!("Dropping collection '{}'", self.collection());
        self.client.drop_collection(self.collection()).await
    }

    /// Number of rows stored in the collection.
    pub async fn row_count(&self) -> AppResult<u64> {
        self.client.collection_row_count(self.collection()).await
    }

    /// Existence, load state and size of the collection.
    pub async fn describe(&self) -> AppResult<CollectionInfo> {
        let exists = self.client.has_collection(self.collection()).await?;
        let (load_state, row_count) = if exists {
            let state = self.client.get_load_state(self.collection()).await?;
            (state, Some(self.row_count().await?))
        } else {
            (LoadState::NotExist, None)
        };

        Ok(CollectionInfo {
            name: self.collection().to_string(),
            exists,
            load_state,
            row_count,
            dim: self.config.dim,
        })
    }
}

#[async_trait::async_trait]
impl VectorStore for MilvusStore {
    async fn insert(&self, sections: &[Section]) -> AppResult<u64> {
        if sections.is_empty() {
            tracing::info!("No sections to insert");
            return Ok(0);
        }

        // Index changes require a released collection
        self.client.release_collection(self.collection()).await?;

        let columns = sections_to_columns(sections, self.config.dim as usize)?;

        let index = schema::embedding_index();
        self.client
            .create_index(self.collection(), EMBEDDING_FIELD, &index)
            .await?;

        let inserted = self.client.insert(self.collection(), &columns).await?;

        tracing::info!(
            "Inserted {} sections into '{}'",
            inserted,
            self.collection()
        );
        Ok(inserted)
    }

    async fn query(&self, embedding: &[f64], top_k: usize) -> AppResult<Vec<Similarity>> {
        if top_k == 0 {
            return Err(AppError::InvalidInput(
                "top_k must be at least 1".to_string(),
            ));
        }
        if embedding.len() != self.config.dim as usize {
            return Err(AppError::InvalidInput(format!(
                "Query embedding has dimension {}, expected {}",
                embedding.len(),
                self.config.dim
            )));
        }

        // Searches need the collection in memory
        self.load_and_wait().await?;

        let request = SearchRequest {
            collection_name: self.collection().to_string(),
            partitions: Vec::new(),
            expr: String::new(),
            output_fields: OUTPUT_FIELDS.iter().map(|f| f.to_string()).collect(),
            vector: to_f32(embedding),
            anns_field: EMBEDDING_FIELD.to_string(),
            metric_type: schema::METRIC,
            top_k,
            params: BTreeMap::new(),
        };

        let result = self.client.search(&request).await?;
        let similarities = similarities_from_result(&result)?;

        tracing::debug!(
            "Query on '{}' returned {} of top-{}",
            self.collection(),
            similarities.len(),
            top_k
        );
        Ok(similarities)
    }
}
