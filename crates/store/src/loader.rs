//! Section files on disk.

use crate::types::Section;
use sectiondb_core::{AppError, AppResult};
use std::path::Path;

/// Read a JSON array of sections from a file.
pub async fn read_sections(path: &Path) -> AppResult<Vec<Section>> {
    let data = tokio::fs::read(path).await?;

    let sections: Vec<Section> = serde_json::from_slice(&data).map_err(|e| {
        AppError::Serialization(format!("Failed to parse sections in {:?}: {}", path, e))
    })?;

    tracing::debug!("Read {} sections from {:?}", sections.len(), path);
    Ok(sections)
}
