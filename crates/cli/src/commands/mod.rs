//! Command handlers for the sectiondb CLI.

pub mod drop;
pub mod load;
pub mod query;
pub mod stats;

// Re-export command types for convenience
pub use drop::DropCommand;
pub use load::LoadCommand;
pub use query::QueryCommand;
pub use stats::StatsCommand;

use sectiondb_core::{config::AppConfig, AppResult};
use sectiondb_store::StoreConfig;

/// Store settings from the validated application config.
pub(crate) fn store_config(config: &AppConfig) -> AppResult<StoreConfig> {
    config.validate()?;
    Ok(StoreConfig::from(config.milvus.clone()))
}
