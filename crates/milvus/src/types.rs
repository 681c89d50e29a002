//! Collection, index and search types.
//!
//! These mirror the entities the Milvus server understands. Their `serde`
//! representations match the REST v2 wire format.

use crate::column::Column;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Column data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Int64,
    VarChar,
    FloatVector,
}

impl DataType {
    /// Get the canonical Milvus type name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int64 => "Int64",
            Self::VarChar => "VarChar",
            Self::FloatVector => "FloatVector",
        }
    }
}

/// Type parameters attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeParams {
    /// Maximum length of a VarChar value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,

    /// Dimension of a vector field
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dim: Option<u32>,
}

impl TypeParams {
    fn is_empty(&self) -> bool {
        self.max_length.is_none() && self.dim.is_none()
    }
}

/// A single field in a collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "fieldName")]
    pub name: String,

    #[serde(rename = "dataType")]
    pub data_type: DataType,

    #[serde(
        rename = "isPrimary",
        default,
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub primary_key: bool,

    #[serde(
        rename = "elementTypeParams",
        default,
        skip_serializing_if = "TypeParams::is_empty"
    )]
    pub type_params: TypeParams,
}

impl FieldSchema {
    /// Int64 primary key field.
    pub fn primary_int64(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::Int64,
            primary_key: true,
            type_params: TypeParams::default(),
        }
    }

    /// VarChar field with a maximum length.
    pub fn varchar(name: impl Into<String>, max_length: u32) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::VarChar,
            primary_key: false,
            type_params: TypeParams {
                max_length: Some(max_length),
                dim: None,
            },
        }
    }

    /// FloatVector field with a fixed dimension.
    pub fn float_vector(name: impl Into<String>, dim: u32) -> Self {
        Self {
            name: name.into(),
            data_type: DataType::FloatVector,
            primary_key: false,
            type_params: TypeParams {
                max_length: None,
                dim: Some(dim),
            },
        }
    }
}

/// Collection schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection name (sent outside the schema body)
    #[serde(skip)]
    pub collection_name: String,

    #[serde(rename = "autoId")]
    pub auto_id: bool,

    #[serde(rename = "enabledDynamicField")]
    pub enable_dynamic_field: bool,

    pub fields: Vec<FieldSchema>,
}

impl CollectionSchema {
    /// Create an empty schema for the named collection.
    pub fn new(collection_name: impl Into<String>) -> Self {
        Self {
            collection_name: collection_name.into(),
            auto_id: false,
            enable_dynamic_field: false,
            fields: Vec::new(),
        }
    }

    /// Append a field.
    pub fn with_field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Consistency level used as the collection's default for searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsistencyLevel {
    Strong,
    Session,
    Bounded,
    Eventually,
}

/// Distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MetricType {
    L2,
    #[serde(rename = "IP")]
    Ip,
    #[serde(rename = "COSINE")]
    Cosine,
}

/// Vector index type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "FLAT")]
    Flat,
    #[serde(rename = "IVF_FLAT")]
    IvfFlat,
    #[serde(rename = "HNSW")]
    Hnsw,
    #[serde(rename = "AUTOINDEX")]
    AutoIndex,
}

impl IndexType {
    /// Get the canonical Milvus index name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "FLAT",
            Self::IvfFlat => "IVF_FLAT",
            Self::Hnsw => "HNSW",
            Self::AutoIndex => "AUTOINDEX",
        }
    }
}

/// Index definition for a vector field.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexParams {
    pub index_type: IndexType,
    pub metric_type: MetricType,
    /// Build parameters (e.g. `nlist`)
    pub params: BTreeMap<String, serde_json::Value>,
}

impl IndexParams {
    /// IVF_FLAT index with the given cluster count.
    pub fn ivf_flat(metric_type: MetricType, nlist: u32) -> Self {
        let mut params = BTreeMap::new();
        params.insert("nlist".to_string(), serde_json::json!(nlist));
        Self {
            index_type: IndexType::IvfFlat,
            metric_type,
            params,
        }
    }
}

/// Loading state of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    #[serde(rename = "LoadStateNotExist")]
    NotExist,
    #[serde(rename = "LoadStateNotLoad")]
    NotLoad,
    #[serde(rename = "LoadStateLoading")]
    Loading,
    #[serde(rename = "LoadStateLoaded")]
    Loaded,
}

impl LoadState {
    /// Short name without the wire prefix.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotExist => "NotExist",
            Self::NotLoad => "NotLoad",
            Self::Loading => "Loading",
            Self::Loaded => "Loaded",
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single-vector similarity search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub collection_name: String,
    /// Partitions to search; empty means all
    pub partitions: Vec<String>,
    /// Boolean filter expression; empty means none
    pub expr: String,
    pub output_fields: Vec<String>,
    pub vector: Vec<f32>,
    pub anns_field: String,
    pub metric_type: MetricType,
    pub top_k: usize,
    /// Search parameters (e.g. `nprobe`); empty for flat search
    pub params: BTreeMap<String, serde_json::Value>,
}

/// Result of one query vector: row-aligned columns plus scores.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub result_count: usize,
    pub scores: Vec<f32>,
    pub fields: Vec<Column>,
}

impl SearchResult {
    /// Look up a result column by name.
    pub fn field(&self, name: &str) -> Option<&Column> {
        self.fields.iter().find(|c| c.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_schema_wire_format() {
        let field = FieldSchema::varchar("title", 50);
        let value = serde_json::to_value(&field).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "fieldName": "title",
                "dataType": "VarChar",
                "elementTypeParams": {"max_length": 50}
            })
        );

        let pk = serde_json::to_value(FieldSchema::primary_int64("id")).unwrap();
        assert_eq!(
            pk,
            serde_json::json!({"fieldName": "id", "dataType": "Int64", "isPrimary": true})
        );
    }

    #[test]
    fn test_schema_lookup() {
        let schema = CollectionSchema::new("docs")
            .with_field(FieldSchema::primary_int64("id"))
            .with_field(FieldSchema::float_vector("embedding", 8));

        assert_eq!(
            schema.field("embedding").and_then(|f| f.type_params.dim),
            Some(8)
        );
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn test_ivf_flat_params() {
        let index = IndexParams::ivf_flat(MetricType::L2, 128);
        assert_eq!(index.index_type, IndexType::IvfFlat);
        assert_eq!(index.params.get("nlist"), Some(&serde_json::json!(128)));
    }

    #[test]
    fn test_load_state_parsing() {
        let state: LoadState = serde_json::from_str("\"LoadStateLoaded\"").unwrap();
        assert_eq!(state, LoadState::Loaded);
        assert_eq!(state.to_string(), "Loaded");

        let state: LoadState = serde_json::from_str("\"LoadStateLoading\"").unwrap();
        assert_eq!(state, LoadState::Loading);
    }

    #[test]
    fn test_enum_wire_names() {
        let wire = |value: serde_json::Value| value.as_str().unwrap_or_default().to_string();

        for index in [
            IndexType::Flat,
            IndexType::IvfFlat,
            IndexType::Hnsw,
            IndexType::AutoIndex,
        ] {
            assert_eq!(wire(serde_json::to_value(index).unwrap()), index.as_str());
        }
        for data_type in [DataType::Int64, DataType::VarChar, DataType::FloatVector] {
            let name = wire(serde_json::to_value(data_type).unwrap());
            assert_eq!(name, data_type.as_str());
        }

        let metrics = [MetricType::L2, MetricType::Ip, MetricType::Cosine];
        let names: Vec<String> = metrics
            .iter()
            .map(|m| wire(serde_json::to_value(m).unwrap()))
            .collect();
        assert_eq!(names, vec!["L2", "IP", "COSINE"]);

        let levels = [
            ConsistencyLevel::Strong,
            ConsistencyLevel::Session,
            ConsistencyLevel::Bounded,
            ConsistencyLevel::Eventually,
        ];
        let names: Vec<String> = levels
            .iter()
            .map(|l| wire(serde_json::to_value(l).unwrap()))
            .collect();
        assert_eq!(names, vec!["Strong", "Session", "Bounded", "Eventually"]);
    }
}
