//! Milvus REST transport.
//!
//! Talks to the Milvus RESTful API (v2), served by the proxy on the same
//! port as gRPC (19530 by default).
//! API reference: https://milvus.io/api-reference/restful/v2.4.x/About.md

use crate::client::MilvusClient;
use crate::column::{self, Column};
use crate::types::{
    CollectionSchema, ConsistencyLevel, IndexParams, LoadState, MetricType, SearchRequest,
    SearchResult,
};
use sectiondb_core::{AppError, AppResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// Score key Milvus attaches to every search hit.
const DISTANCE_KEY: &str = "distance";

/// Asks the proxy to return Int64 fields as JSON numbers instead of strings.
const INT64_HEADER: &str = "Accept-Type-Allow-Int64";

/// Response envelope shared by all endpoints.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionRequest<'a> {
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_name: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionRequest<'a> {
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_name: Option<&'a str>,
    schema: &'a CollectionSchema,
    params: CreateCollectionParams,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateCollectionParams {
    shards_num: u32,
    consistency_level: ConsistencyLevel,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIndexRequest<'a> {
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_name: Option<&'a str>,
    index_params: Vec<IndexParamsEntry<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IndexParamsEntry<'a> {
    field_name: &'a str,
    index_name: &'a str,
    metric_type: MetricType,
    params: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRequest<'a> {
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_name: Option<&'a str>,
    data: Vec<Map<String, Value>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchBody<'a> {
    collection_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    db_name: Option<&'a str>,
    data: Vec<&'a [f32]>,
    anns_field: &'a str,
    limit: usize,
    output_fields: &'a [String],
    #[serde(skip_serializing_if = "str::is_empty")]
    filter: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    partition_names: &'a [String],
    search_params: SearchParams<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchParams<'a> {
    metric_type: MetricType,
    params: &'a BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct HasData {
    has: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertData {
    insert_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsData {
    row_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoadStateData {
    load_state: LoadState,
}

/// Milvus client over the REST v2 API.
pub struct RestClient {
    /// Base URL, e.g. `http://localhost:19530`
    base_url: String,

    /// Bearer token (`user:password` or API key)
    token: Option<String>,

    /// Database name; server default when unset
    database: Option<String>,

    /// HTTP client
    client: reqwest::Client,
}

impl RestClient {
    /// Create a client for a server address, with or without scheme.
    pub fn new(addr: impl AsRef<str>) -> Self {
        Self {
            base_url: normalize_base_url(addr.as_ref()),
            token: None,
            database: None,
            client: reqwest::Client::new(),
        }
    }

    /// Authenticate with a bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Target a specific database.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Apply a per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Get the base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn db_name(&self) -> Option<&str> {
        self.database.as_deref()
    }

    fn collection_request<'a>(&'a self, collection: &'a str) -> CollectionRequest<'a> {
        CollectionRequest {
            collection_name: collection,
            db_name: self.db_name(),
        }
    }

    /// Build a JSON POST with auth and wire-format headers.
    fn request<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> reqwest::RequestBuilder {
        let mut request = self.client.post(url).json(body);
        request = request.header(INT64_HEADER, "true");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        request
    }

    /// POST a request to `/v2/vectordb/<path>` and unwrap the envelope.
    async fn post<B, T>(&self, path: &str, body: &B) -> AppResult<Option<T>>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/v2/vectordb/{}", self.base_url, path);
        tracing::debug!("POST {}", url);

        let response = self
            .request(&url, body)
            .send()
            .await
            .map_err(|e| AppError::Http(format!("Failed to send request to {}: {}", url, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Http(format!(
                "Milvus API error ({}) on {}: {}",
                status, path, error_text
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::Http(format!("Failed to read response from {}: {}", url, e)))?;

        parse_envelope(&text)
    }

    /// POST a request whose response carries no data.
    async fn post_unit<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> AppResult<()> {
        self.post::<B, Value>(path, body).await.map(|_| ())
    }
}

/// Parse a response envelope, turning non-zero codes into errors.
fn parse_envelope<T: DeserializeOwned>(text: &str) -> AppResult<Option<T>> {
    let envelope: Envelope<T> = serde_json::from_str(text)?;

    // Older proxies report success as 200
    if envelope.code != 0 && envelope.code != 200 {
        return Err(AppError::Milvus {
            code: envelope.code,
            message: envelope.message.unwrap_or_else(|| "no message".into()),
        });
    }

    Ok(envelope.data)
}

fn require<T>(data: Option<T>, path: &str) -> AppResult<T> {
    data.ok_or_else(|| AppError::Serialization(format!("Missing data in {} response", path)))
}

/// Add a scheme when the address has none and strip trailing slashes.
fn normalize_base_url(addr: &str) -> String {
    let trimmed = addr.trim().trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    }
}

/// Turn equal-length columns into row objects for the insert payload.
fn columns_to_rows(columns: &[Column]) -> AppResult<Vec<Map<String, Value>>> {
    let rows = column::row_count(columns)?;
    (0..rows)
        .map(|idx| {
            columns
                .iter()
                .map(|c| Ok((c.name().to_string(), c.json_at(idx)?)))
                .collect()
        })
        .collect()
}

/// Turn search hit rows back into columns, in `output_fields` order.
fn rows_to_result(
    rows: Vec<Map<String, Value>>,
    output_fields: &[String],
) -> AppResult<SearchResult> {
    let scores = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.get(DISTANCE_KEY)
                .and_then(Value::as_f64)
                .map(|d| d as f32)
                .ok_or_else(|| AppError::Schema(format!("Search hit {} has no distance", i)))
        })
        .collect::<AppResult<Vec<f32>>>()?;

    let mut fields = Vec::with_capacity(output_fields.len());
    if !rows.is_empty() {
        for name in output_fields {
            fields.push(decode_column(name, &rows)?);
        }
    }

    Ok(SearchResult {
        result_count: rows.len(),
        scores,
        fields,
    })
}

/// Decode one output field across all hits, typed by its first value.
fn decode_column(name: &str, rows: &[Map<String, Value>]) -> AppResult<Column> {
    let values: Vec<&Value> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            row.get(name).ok_or_else(|| {
                AppError::Schema(format!("Search hit {} is missing field '{}'", i, name))
            })
        })
        .collect::<AppResult<_>>()?;

    let mismatch = |i: usize| {
        AppError::Schema(format!(
            "Search hit {} has a mistyped value for field '{}'",
            i, name
        ))
    };

    match values.first() {
        Some(Value::Number(_)) => {
            let ints = values
                .iter()
                .enumerate()
                .map(|(i, v)| v.as_i64().ok_or_else(|| mismatch(i)))
                .collect::<AppResult<Vec<i64>>>()?;
            Ok(Column::int64(name, ints))
        }
        Some(Value::String(_)) => {
            let strings = values
                .iter()
                .enumerate()
                .map(|(i, v)| v.as_str().map(str::to_string).ok_or_else(|| mismatch(i)))
                .collect::<AppResult<Vec<String>>>()?;
            Ok(Column::varchar(name, strings))
        }
        Some(Value::Array(first)) => {
            let dim = first.len();
            let vectors = values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    v.as_array()
                        .ok_or_else(|| mismatch(i))?
                        .iter()
                        .map(|x| x.as_f64().map(|f| f as f32).ok_or_else(|| mismatch(i)))
                        .collect::<AppResult<Vec<f32>>>()
                })
                .collect::<AppResult<Vec<Vec<f32>>>>()?;
            Column::float_vector(name, dim, vectors)
        }
        _ => Err(mismatch(0)),
    }
}

#[async_trait::async_trait]
impl MilvusClient for RestClient {
    fn transport_name(&self) -> &str {
        "rest"
    }

    async fn has_collection(&self, collection: &str) -> AppResult<bool> {
        let path = "collections/has";
        let body = self.collection_request(collection);
        let data: Option<HasData> = self.post(path, &body).await?;
        Ok(require(data, path)?.has)
    }

    async fn create_collection(
        &self,
        schema: &CollectionSchema,
        shards: u32,
        consistency: ConsistencyLevel,
    ) -> AppResult<()> {
        tracing::info!(
            "Creating collection '{}' with {} fields",
            schema.collection_name,
            schema.fields.len()
        );

        let body = CreateCollectionRequest {
            collection_name: &schema.collection_name,
            db_name: self.db_name(),
            schema,
            params: CreateCollectionParams {
                shards_num: shards,
                consistency_level: consistency,
            },
        };
        self.post_unit("collections/create", &body).await
    }

    async fn drop_collection(&self, collection: &str) -> AppResult<()> {
        self.post_unit("collections/drop", &self.collection_request(collection))
            .await
    }

    async fn release_collection(&self, collection: &str) -> AppResult<()> {
        self.post_unit("collections/release", &self.collection_request(collection))
            .await
    }

    async fn load_collection(&self, collection: &str) -> AppResult<()> {
        self.post_unit("collections/load", &self.collection_request(collection))
            .await
    }

    async fn get_load_state(&self, collection: &str) -> AppResult<LoadState> {
        let path = "collections/get_load_state";
        let body = self.collection_request(collection);
        let data: Option<LoadStateData> = self.post(path, &body).await?;
        Ok(require(data, path)?.load_state)
    }

    async fn collection_row_count(&self, collection: &str) -> AppResult<u64> {
        let path = "collections/get_stats";
        let body = self.collection_request(collection);
        let data: Option<StatsData> = self.post(path, &body).await?;
        Ok(require(data, path)?.row_count)
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        index: &IndexParams,
    ) -> AppResult<()> {
        let body = CreateIndexRequest {
            collection_name: collection,
            db_name: self.db_name(),
            index_params: vec![index_entry(field, index)],
        };
        self.post_unit("indexes/create", &body).await
    }

    async fn insert(&self, collection: &str, columns: &[Column]) -> AppResult<u64> {
        let path = "entities/insert";
        let body = InsertRequest {
            collection_name: collection,
            db_name: self.db_name(),
            data: columns_to_rows(columns)?,
        };

        tracing::debug!("Inserting {} rows into '{}'", body.data.len(), collection);
        let data: Option<InsertData> = self.post(path, &body).await?;
        Ok(require(data, path)?.insert_count)
    }

    async fn search(&self, request: &SearchRequest) -> AppResult<SearchResult> {
        let body = SearchBody {
            collection_name: &request.collection_name,
            db_name: self.db_name(),
            data: vec![request.vector.as_slice()],
            anns_field: &request.anns_field,
            limit: request.top_k,
            output_fields: &request.output_fields,
            filter: &request.expr,
            partition_names: &request.partitions,
            search_params: SearchParams {
                metric_type: request.metric_type,
                params: &request.params,
            },
        };

        let rows: Option<Vec<Map<String, Value>>> = self.post("entities/search", &body).await?;
        rows_to_result(rows.unwrap_or_default(), &request.output_fields)
    }
}

/// Build the wire entry for an index; the index is named after its field.
fn index_entry<'a>(field: &'a str, index: &IndexParams) -> IndexParamsEntry<'a> {
    let mut params = index.params.clone();
    params.insert(
        "index_type".to_string(),
        Value::from(index.index_type.as_str()),
    );
    IndexParamsEntry {
        field_name: field,
        index_name: field,
        metric_type: index.metric_type,
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FieldSchema;
    use serde_json::json;

    #[test]
    fn test_rest_client_creation() {
        let client = RestClient::new("localhost:19530");
        assert_eq!(client.transport_name(), "rest");
        assert_eq!(client.base_url(), "http://localhost:19530");

        let client = RestClient::new("https://milvus.example.com/");
        assert_eq!(client.base_url(), "https://milvus.example.com");
    }

    #[test]
    fn test_request_headers() {
        let client = RestClient::new("localhost:19530").with_token("token");
        let request = client.request("http://db/x", &json!({})).build().unwrap();
        assert_eq!(request.headers()[INT64_HEADER], "true");
        assert_eq!(request.headers()["authorization"], "Bearer token");

        let anon = RestClient::new("localhost:19530");
        let request = anon.request("http://db/x", &json!({})).build().unwrap();
        assert_eq!(request.headers()["accept-type-allow-int64"], "true");
        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn test_envelope_success_and_error() {
        let text = r#"{"code":0,"data":{"has":true}}"#;
        let data: Option<HasData> = parse_envelope(text).unwrap();
        assert!(data.unwrap().has);

        let none: Option<Value> = parse_envelope(r#"{"code":0,"data":{}}"#).unwrap();
        assert_eq!(none, Some(json!({})));

        let text = r#"{"code":100,"message":"collection not found[collection=docs]"}"#;
        match parse_envelope::<Value>(text) {
            Err(AppError::Milvus { code, message }) => {
                assert_eq!(code, 100);
                assert!(message.contains("collection not found"));
            }
            other => panic!("Expected Milvus error, got {:?}", other),
        }
    }

    #[test]
    fn test_create_collection_body() {
        let schema = CollectionSchema::new("docs")
            .with_field(FieldSchema::primary_int64("id"))
            .with_field(FieldSchema::float_vector("embedding", 4));
        let body = CreateCollectionRequest {
            collection_name: &schema.collection_name,
            db_name: None,
            schema: &schema,
            params: CreateCollectionParams {
                shards_num: 2,
                consistency_level: ConsistencyLevel::Bounded,
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["collectionName"], "docs");
        assert!(value.get("dbName").is_none());
        assert_eq!(value["schema"]["autoId"], false);
        assert_eq!(value["schema"]["fields"][1]["elementTypeParams"]["dim"], 4);
        assert_eq!(value["params"]["shardsNum"], 2);
        assert_eq!(value["params"]["consistencyLevel"], "Bounded");
    }

    #[test]
    fn test_index_entry_carries_type() {
        let index = IndexParams::ivf_flat(MetricType::L2, 128);
        let value = serde_json::to_value(index_entry("embedding", &index)).unwrap();
        assert_eq!(
            value,
            json!({
                "fieldName": "embedding",
                "indexName": "embedding",
                "metricType": "L2",
                "params": {"index_type": "IVF_FLAT", "nlist": 128}
            })
        );
    }

    #[test]
    fn test_columns_to_rows() {
        let columns = vec![
            Column::int64("id", vec![0, 1]),
            Column::varchar("title", vec!["a".to_string(), "b".to_string()]),
            Column::float_vector("embedding", 2, vec![vec![0.5, 1.0], vec![0.0, -1.0]]).unwrap(),
        ];

        let rows = columns_to_rows(&columns).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            Value::Object(rows[1].clone()),
            json!({"id": 1, "title": "b", "embedding": [0.0, -1.0]})
        );
    }

    #[test]
    fn test_search_body_skips_empty_filter() {
        let request = SearchRequest {
            collection_name: "docs".to_string(),
            partitions: Vec::new(),
            expr: String::new(),
            output_fields: vec!["id".to_string()],
            vector: vec![0.25, 0.5],
            anns_field: "embedding".to_string(),
            metric_type: MetricType::L2,
            top_k: 3,
            params: BTreeMap::new(),
        };
        let body = SearchBody {
            collection_name: &request.collection_name,
            db_name: Some("default"),
            data: vec![request.vector.as_slice()],
            anns_field: &request.anns_field,
            limit: request.top_k,
            output_fields: &request.output_fields,
            filter: &request.expr,
            partition_names: &request.partitions,
            search_params: SearchParams {
                metric_type: request.metric_type,
                params: &request.params,
            },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert!(value.get("filter").is_none());
        assert!(value.get("partitionNames").is_none());
        assert_eq!(value["dbName"], "default");
        assert_eq!(value["limit"], 3);
        assert_eq!(value["data"], json!([[0.25, 0.5]]));
        assert_eq!(
            value["searchParams"],
            json!({"metricType": "L2", "params": {}})
        );
    }

    #[test]
    fn test_rows_to_result() {
        let rows: Vec<Map<String, Value>> = serde_json::from_value(json!([
            {"distance": 0.5, "id": 3, "title": "Intro", "heading": "Setup"},
            {"distance": 1.25, "id": 9, "title": "API", "heading": "Search"}
        ]))
        .unwrap();
        let fields = vec!["id".to_string(), "title".to_string(), "heading".to_string()];

        let result = rows_to_result(rows, &fields).unwrap();
        assert_eq!(result.result_count, 2);
        assert_eq!(result.scores, vec![0.5, 1.25]);
        assert_eq!(result.field("id"), Some(&Column::int64("id", vec![3, 9])));
        assert_eq!(
            result.field("heading").unwrap().varchar_at(1).unwrap(),
            "Search"
        );
    }

    #[test]
    fn test_rows_to_result_errors() {
        let no_distance: Vec<Map<String, Value>> =
            serde_json::from_value(json!([{"id": 1}])).unwrap();
        assert!(matches!(
            rows_to_result(no_distance, &["id".to_string()]),
            Err(AppError::Schema(_))
        ));

        let missing_field: Vec<Map<String, Value>> =
            serde_json::from_value(json!([{"distance": 0.1, "id": 1}])).unwrap();
        assert!(matches!(
            rows_to_result(missing_field, &["title".to_string()]),
            Err(AppError::Schema(_))
        ));

        let empty = rows_to_result(Vec::new(), &["id".to_string()]).unwrap();
        assert_eq!(empty.result_count, 0);
        assert!(empty.fields.is_empty());
    }
}
