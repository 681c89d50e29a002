//! Configuration management for sectiondb.
//!
//! Configuration is merged from multiple sources, lowest precedence first:
//! - Built-in defaults
//! - Config file (`sectiondb.yaml` in the working directory, or `SECTIONDB_CONFIG`)
//! - Environment variables
//! - Command-line flags

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Default Milvus server address.
pub const DEFAULT_ADDR: &str = "localhost:19530";

/// Default embedding dimension (OpenAI embedding size).
pub const DEFAULT_DIM: u32 = 1536;

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "sectiondb.yaml";

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Config file the settings were read from, if any
    pub config_file: Option<PathBuf>,

    /// Milvus connection and collection settings
    pub milvus: MilvusSettings,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Milvus connection and collection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MilvusSettings {
    /// Server address, with or without scheme
    pub addr: String,

    /// Bearer token (`user:password` or API key)
    pub token: Option<String>,

    /// Database name; server default when unset
    pub database: Option<String>,

    /// Target collection name
    pub collection: String,

    /// Embedding dimension
    pub dim: u32,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MilvusSettings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            token: None,
            database: None,
            collection: String::new(),
            dim: DEFAULT_DIM,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    milvus: Option<MilvusSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MilvusSection {
    addr: Option<String>,
    token: Option<String>,
    database: Option<String>,
    collection: Option<String>,
    dim: Option<u32>,
    #[serde(rename = "timeoutSecs")]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            milvus: MilvusSettings::default(),
            log_level: None,
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration, reading the given config file when provided.
    ///
    /// An explicitly named file must exist; the implicit `sectiondb.yaml`
    /// is only read when present.
    ///
    /// Environment variables:
    /// - `SECTIONDB_CONFIG`: Path to config file
    /// - `SECTIONDB_ADDR`: Milvus server address
    /// - `SECTIONDB_COLLECTION`: Collection name
    /// - `SECTIONDB_DIM`: Embedding dimension
    /// - `SECTIONDB_TOKEN`: Bearer token
    /// - `SECTIONDB_DATABASE`: Database name
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use sectiondb_core::config::AppConfig;
    ///
    /// let config = AppConfig::load_from(None).expect("Failed to load config");
    /// println!("Collection: {}", config.milvus.collection);
    /// ```
    pub fn load_from(config_file: Option<&Path>) -> AppResult<Self> {
        let mut config = Self::default();

        let explicit = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var("SECTIONDB_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if !path.exists() {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            config = config.merge_yaml(&path)?;
        } else {
            let implicit = PathBuf::from(DEFAULT_CONFIG_FILE);
            if implicit.exists() {
                config = config.merge_yaml(&implicit)?;
            }
        }

        // Environment variables override YAML config
        if let Ok(addr) = std::env::var("SECTIONDB_ADDR") {
            config.milvus.addr = addr;
        }

        if let Ok(collection) = std::env::var("SECTIONDB_COLLECTION") {
            config.milvus.collection = collection;
        }

        if let Ok(dim) = std::env::var("SECTIONDB_DIM") {
            config.milvus.dim = match dim.parse() {
                Ok(dim) => dim,
                Err(e) => {
                    return Err(AppError::Config(format!(
                        "Invalid SECTIONDB_DIM '{}': {}",
                        dim, e
                    )))
                }
            };
        }

        if let Ok(token) = std::env::var("SECTIONDB_TOKEN") {
            config.milvus.token = Some(token);
        }

        if let Ok(database) = std::env::var("SECTIONDB_DATABASE") {
            config.milvus.database = Some(database);
        }

        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge a YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();
        result.config_file = Some(path.to_path_buf());

        if let Some(milvus) = config_file.milvus {
            if let Some(addr) = milvus.addr {
                result.milvus.addr = addr;
            }
            if let Some(collection) = milvus.collection {
                result.milvus.collection = collection;
            }
            if let Some(dim) = milvus.dim {
                result.milvus.dim = dim;
            }
            if let Some(timeout) = milvus.timeout_secs {
                result.milvus.timeout_secs = timeout;
            }
            result.milvus.token = milvus.token.or(result.milvus.token);
            result.milvus.database = milvus.database.or(result.milvus.database);
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// Command-line flags take precedence over the config file and
    /// environment variables.
    pub fn with_overrides(
        mut self,
        addr: Option<String>,
        collection: Option<String>,
        dim: Option<u32>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(addr) = addr {
            self.milvus.addr = addr;
        }

        if let Some(collection) = collection {
            self.milvus.collection = collection;
        }

        if let Some(dim) = dim {
            self.milvus.dim = dim;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Validate the settings needed to reach a collection.
    pub fn validate(&self) -> AppResult<()> {
        if self.milvus.addr.trim().is_empty() {
            return Err(AppError::Config("Milvus address is empty".to_string()));
        }

        if self.milvus.collection.trim().is_empty() {
            return Err(AppError::Config(
                "Collection name is required (--collection or SECTIONDB_COLLECTION)".to_string(),
            ));
        }

        if self.milvus.dim == 0 {
            return Err(AppError::Config(
                "Embedding dimension must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
