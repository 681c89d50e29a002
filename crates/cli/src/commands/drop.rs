//! Drop command handler.

use clap::Args;
use sectiondb_core::config::AppConfig;
use sectiondb_store::MilvusStore;

/// Drop the collection and all stored sections
#[derive(Args, Debug)]
pub struct DropCommand {
    /// Confirm the drop
    #[arg(short, long)]
    pub yes: bool,
}

impl DropCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        let store = MilvusStore::open(super::store_config(config)?)?;
        let collection = &store.config().collection_name;

        if !self.yes {
            anyhow::bail!("Refusing to drop '{}' without --yes", collection);
        }

        tracing::info!("Executing drop command for '{}'", collection);
        store.drop_collection().await?;
        println!("Dropped collection '{}'", collection);

        Ok(())
    }
}
