//! Load command handler.
//!
//! Provisions the collection and inserts sections from a JSON file.

use anyhow::Context;
use clap::Args;
use sectiondb_core::config::AppConfig;
use sectiondb_store::{MilvusStore, VectorStore};
use std::path::PathBuf;
use std::time::Instant;

/// Insert sections from a JSON file
#[derive(Args, Debug)]
pub struct LoadCommand {
    /// JSON file holding an array of sections
    pub file: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl LoadCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing load command for {:?}", self.file);
        let start = Instant::now();

        let store = MilvusStore::connect(super::store_config(config)?).await?;
        let inserted = store
            .load_json(&self.file)
            .await
            .with_context(|| format!("Failed to load sections from {:?}", self.file))?;

        let duration = start.elapsed().as_secs_f64();

        if self.json {
            let output = serde_json::json!({
                "collection": store.config().collection_name,
                "file": self.file,
                "inserted": inserted,
                "durationSecs": duration,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            println!(
                "Inserted {} sections into '{}' in {:.2}s",
                inserted,
                store.config().collection_name,
                duration
            );
        }

        Ok(())
    }
}
