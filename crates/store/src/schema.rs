//! Collection layout for sections.

use sectiondb_milvus::{CollectionSchema, ConsistencyLevel, FieldSchema, IndexParams, MetricType};

pub const ID_FIELD: &str = "id";
pub const TITLE_FIELD: &str = "title";
pub const HEADING_FIELD: &str = "heading";
pub const CONTENT_FIELD: &str = "content";
pub const EMBEDDING_FIELD: &str = "embedding";

pub const TITLE_MAX_LENGTH: u32 = 50;
pub const HEADING_MAX_LENGTH: u32 = 50;
pub const CONTENT_MAX_LENGTH: u32 = 5000;

pub const SHARDS: u32 = 2;

/// Default consistency for searches against the collection.
pub const CONSISTENCY: ConsistencyLevel = ConsistencyLevel::Bounded;

pub const METRIC: MetricType = MetricType::L2;

/// IVF_FLAT cluster count.
pub const NLIST: u32 = 128;

/// Fields returned with every search hit.
pub const OUTPUT_FIELDS: [&str; 4] = [ID_FIELD, TITLE_FIELD, HEADING_FIELD, CONTENT_FIELD];

/// Schema of a section collection with the given embedding dimension.
pub fn section_schema(collection_name: &str, dim: u32) -> CollectionSchema {
    CollectionSchema::new(collection_name)
        .with_field(FieldSchema::primary_int64(ID_FIELD))
        .with_field(FieldSchema::varchar(TITLE_FIELD, TITLE_MAX_LENGTH))
        .with_field(FieldSchema::varchar(HEADING_FIELD, HEADING_MAX_LENGTH))
        .with_field(FieldSchema::varchar(CONTENT_FIELD, CONTENT_MAX_LENGTH))
        .with_field(FieldSchema::float_vector(EMBEDDING_FIELD, dim))
}

/// Index built on the embedding field before every insert.
pub fn embedding_index() -> IndexParams {
    IndexParams::ivf_flat(METRIC, NLIST)
}
