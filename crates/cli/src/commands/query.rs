//! Query command handler.
//!
//! Runs a top-k similarity search with a precomputed embedding.

use anyhow::Context;
use clap::Args;
use sectiondb_core::config::AppConfig;
use sectiondb_store::{Embedding, MilvusStore, VectorStore};
use std::path::{Path, PathBuf};

/// Search the collection with an embedding
#[derive(Args, Debug)]
pub struct QueryCommand {
    /// File holding the query embedding as a JSON array (`-` for stdin)
    #[arg(short, long)]
    pub embedding: PathBuf,

    /// Number of sections to return
    #[arg(short = 'k', long, default_value = "5")]
    pub top_k: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl QueryCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing query command (top-{})", self.top_k);

        let embedding = read_embedding(&self.embedding)?;
        let store = MilvusStore::connect(super::store_config(config)?).await?;
        let similarities = store.query(&embedding, self.top_k).await?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&similarities)?);
        } else if similarities.is_empty() {
            println!("No matching sections");
        } else {
            for similarity in &similarities {
                let section = &similarity.section;
                println!(
                    "[{}] {:.4}  {} > {}",
                    similarity.id, similarity.score, section.title, section.heading
                );
                println!("    {}", section.content);
            }
        }

        Ok(())
    }
}

/// Read an embedding from a file or stdin.
fn read_embedding(path: &Path) -> anyhow::Result<Embedding> {
    let raw = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read embedding from stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read embedding file {:?}", path))?
    };

    serde_json::from_str(&raw).context("Embedding must be a JSON array of numbers")
}
