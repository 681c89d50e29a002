//! Store configuration.

use sectiondb_core::config::{DEFAULT_ADDR, DEFAULT_DIM, DEFAULT_TIMEOUT_SECS};
use sectiondb_core::{AppError, AppResult, MilvusSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Connection and collection settings for a [`crate::MilvusStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Collection name (required)
    pub collection_name: String,

    /// Milvus server address; defaults to `localhost:19530`
    #[serde(default)]
    pub addr: String,

    /// Embedding dimension; defaults to 1536
    #[serde(default)]
    pub dim: u32,

    /// Bearer token
    #[serde(default)]
    pub token: Option<String>,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// HTTP request timeout in seconds, also the limit on waiting for a
    /// collection load; 0 disables the request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl StoreConfig {
    /// Config for a collection with default address and dimension.
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            addr: String::new(),
            dim: 0,
            token: None,
            database: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the embedding dimension.
    pub fn with_dim(mut self, dim: u32) -> Self {
        self.dim = dim;
        self
    }

    /// Set the server address.
    pub fn with_addr(mut self, addr: impl Into<String>) -> Self {
        self.addr = addr.into();
        self
    }

    /// Set the request and load timeout in seconds.
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// How long to wait for a collection to finish loading.
    pub fn load_timeout(&self) -> Duration {
        match self.timeout_secs {
            0 => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            secs => Duration::from_secs(secs),
        }
    }

    /// Fill unset fields with defaults and check the collection name.
    pub fn normalized(mut self) -> AppResult<Self> {
        if self.collection_name.trim().is_empty() {
            return Err(AppError::Config("Collection name is required".to_string()));
        }
        if self.addr.trim().is_empty() {
            self.addr = DEFAULT_ADDR.to_string();
        }
        if self.dim == 0 {
            self.dim = DEFAULT_DIM;
        }
        Ok(self)
    }

    /// Connection settings for the client factory.
    pub fn settings(&self) -> MilvusSettings {
        MilvusSettings {
            addr: self.addr.clone(),
            token: self.token.clone(),
            database: self.database.clone(),
            collection: self.collection_name.clone(),
            dim: self.dim,
            timeout_secs: self.timeout_secs,
        }
    }
}

impl From<MilvusSettings> for StoreConfig {
    fn from(settings: MilvusSettings) -> Self {
        Self {
            collection_name: settings.collection,
            addr: settings.addr,
            dim: settings.dim,
            token: settings.token,
            database: settings.database,
            timeout_secs: settings.timeout_secs,
        }
    }
}
