//! Stats command handler.
//!
//! Shows whether the collection exists, its load state and row count.

use clap::Args;
use sectiondb_core::config::AppConfig;
use sectiondb_store::MilvusStore;

/// Show collection statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing stats command");

        let store = MilvusStore::open(super::store_config(config)?)?;
        let info = store.describe().await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            println!("Collection: {}", info.name);
            println!("  Exists: {}", info.exists);
            println!("  Load state: {}", info.load_state);
            if let Some(rows) = info.row_count {
                println!("  Rows: {}", rows);
            }
            println!("  Dimension: {}", info.dim);
        }

        Ok(())
    }
}
