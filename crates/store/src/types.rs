//! Section document model.

use sectiondb_milvus::LoadState;
use serde::{Deserialize, Serialize};

/// Embedding vector as produced by embedding APIs.
pub type Embedding = Vec<f64>;

/// A piece of knowledge: where it sits in a document, its text and its
/// embedding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Document title
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub title: String,

    /// Heading within the document
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub heading: String,

    /// Section text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,

    /// Embedding of the content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embedding: Embedding,
}

impl Section {
    /// Create a section without an embedding.
    pub fn new(
        title: impl Into<String>,
        heading: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            heading: heading.into(),
            content: content.into(),
            embedding: Vec::new(),
        }
    }

    /// Attach an embedding.
    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = embedding;
        self
    }
}

/// A stored section returned by a similarity search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Similarity {
    #[serde(flatten)]
    pub section: Section,

    /// Primary key of the stored row
    pub id: i64,

    /// Distance reported by the server (L2, smaller is closer)
    pub score: f64,
}

/// Snapshot of the target collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    pub name: String,
    pub exists: bool,
    pub load_state: LoadState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    pub dim: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_section_json_omits_empty_fields() {
        let section = Section::new("Guide", "", "Body");
        let value = serde_json::to_value(&section).unwrap();
        assert_eq!(value, json!({"title": "Guide", "content": "Body"}));
    }

    #[test]
    fn test_section_parses_partial_json() {
        let section: Section =
            serde_json::from_value(json!({"heading": "Install", "embedding": [0.5, 1]})).unwrap();
        assert_eq!(section.title, "");
        assert_eq!(section.heading, "Install");
        assert_eq!(section.embedding, vec![0.5, 1.0]);
    }

    #[test]
    fn test_collection_info_json() {
        let info = CollectionInfo {
            name: "handbook".to_string(),
            exists: true,
            load_state: LoadState::Loaded,
            row_count: Some(3),
            dim: 4,
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({
                "name": "handbook",
                "exists": true,
                "loadState": "LoadStateLoaded",
                "rowCount": 3,
                "dim": 4
            })
        );
    }

    #[test]
    fn test_similarity_flattens_section() {
        let similarity = Similarity {
            section: Section::new("Guide", "Install", "Run the installer"),
            id: 4,
            score: 0.25,
        };
        let value = serde_json::to_value(&similarity).unwrap();
        assert_eq!(
            value,
            json!({
                "title": "Guide",
                "heading": "Install",
                "content": "Run the installer",
                "id": 4,
                "score": 0.25
            })
        );
    }
}
