//! Firestore document store over the REST API
//!
//! Listing reads use `documents:runQuery` with a structured query ordered by
//! `name` then document name, resuming with an exclusive `startAt` cursor.
//! Counts use `documents:runAggregationQuery`. Filtering is a single
//! `ARRAY_CONTAINS_ANY` over `combinedSlug`, which gives the OR semantics of
//! [`FilterSet`]. Firestore caps that operator at 30 values; larger filter
//! sets are rejected by the service and surface as a store error.

use agency_core::config::FirestoreSettings;
use agency_core::store::{AgencyStore, Cursor, PageQuery};
use agency_core::{AgencyRecord, DirectoryError, FilterSet, StoreError};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use serde_json::{json, Map, Value as JsonValue};
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

/// Field holding each agency's combined tag set
pub const TAG_FIELD: &str = "combinedSlug";

/// Alias for the count aggregation
const COUNT_ALIAS: &str = "total";

/// Firestore client configuration
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub api_key: Option<String>,
    pub auth_token: Option<String>,
    pub timeout: Duration,
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self::from(&FirestoreSettings::default())
    }
}

impl From<&FirestoreSettings> for FirestoreConfig {
    fn from(settings: &FirestoreSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            project_id: settings.project_id.clone(),
            database: settings.database.clone(),
            collection: settings.collection.clone(),
            api_key: settings.api_key.clone(),
            auth_token: settings.auth_token.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

/// [`AgencyStore`] backed by a Firestore collection
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    config: FirestoreConfig,
    client: reqwest::Client,
}

impl FirestoreStore {
    /// Create a new Firestore store
    pub fn new(config: FirestoreConfig) -> agency_core::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DirectoryError::network(format!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(
            "Firestore store: project={}, database={}, collection={}",
            config.project_id,
            config.database,
            config.collection
        );
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &FirestoreConfig {
        &self.config
    }

    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.config.project_id, self.config.database
        )
    }

    /// Full resource name of a document in the collection
    fn document_name(&self, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), self.config.collection, id)
    }

    fn url(&self, path: &str) -> Result<Url, StoreError> {
        let raw = format!("{}/v1/{}", self.config.base_url.trim_end_matches('/'), path);
        let mut url = Url::parse(&raw)
            .map_err(|e| StoreError::rejected(format!("invalid Firestore URL {}: {}", raw, e)))?;
        if let Some(key) = &self.config.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn document_url(&self, id: &str) -> Result<Url, StoreError> {
        let mut url = self.url(&format!("{}/{}", self.documents_root(), self.config.collection))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::rejected("Firestore base URL cannot take a path"))?
            .push(id);
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.auth_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Structured query over the collection, filtered by tag when needed
    fn base_query(&self, filters: &FilterSet) -> JsonValue {
        let mut query = json!({
            "from": [{ "collectionId": self.config.collection }],
        });
        if !filters.is_empty() {
            let values: Vec<JsonValue> = filters
                .terms()
                .map(|term| json!({ "stringValue": term }))
                .collect();
            query["where"] = json!({
                "fieldFilter": {
                    "field": { "fieldPath": TAG_FIELD },
                    "op": "ARRAY_CONTAINS_ANY",
                    "value": { "arrayValue": { "values": values } }
                }
            });
        }
        query
    }

    fn page_query(&self, query: &PageQuery) -> JsonValue {
        let mut structured = self.base_query(&query.filters);
        structured["orderBy"] = json!([
            { "field": { "fieldPath": "name" }, "direction": "ASCENDING" },
            { "field": { "fieldPath": "__name__" }, "direction": "ASCENDING" }
        ]);
        structured["limit"] = json!(query.limit);
        if let Some(cursor) = &query.after {
            structured["startAt"] = self.start_after(cursor);
        }
        structured
    }

    fn start_after(&self, cursor: &Cursor) -> JsonValue {
        json!({
            "values": [
                { "stringValue": cursor.name() },
                { "referenceValue": self.document_name(cursor.id()) }
            ],
            "before": false
        })
    }

    async fn post<T: DeserializeOwned>(
        &self,
        operation: &str,
        url: Url,
        body: &JsonValue,
    ) -> Result<T, StoreError> {
        tracing::debug!("Firestore {}: {}", operation, body);
        let response = self
            .authorize(self.client.post(url))
            .json(body)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        read_json(operation, response).await
    }
}

#[async_trait]
impl AgencyStore for FirestoreStore {
    async fn count(&self, filters: &FilterSet) -> Result<u64, StoreError> {
        let url = self.url(&format!("{}:runAggregationQuery", self.documents_root()))?;
        let body = json!({
            "structuredAggregationQuery": {
                "structuredQuery": self.base_query(filters),
                "aggregations": [{ "alias": COUNT_ALIAS, "count": {} }]
            }
        });

        let items: Vec<AggregationItem> = self.post("runAggregationQuery", url, &body).await?;
        let value = items
            .into_iter()
            .filter_map(|item| item.result)
            .find_map(|mut result| result.aggregate_fields.remove(COUNT_ALIAS))
            .ok_or_else(|| StoreError::malformed("aggregation response has no count"))?;

        match value {
            FirestoreValue::IntegerValue(raw) => raw
                .parse()
                .map_err(|e| StoreError::malformed(format!("invalid count {:?}: {}", raw, e))),
            other => Err(StoreError::malformed(format!(
                "count is not an integer: {:?}",
                other
            ))),
        }
    }

    async fn fetch(&self, query: &PageQuery) -> Result<Vec<AgencyRecord>, StoreError> {
        let url = self.url(&format!("{}:runQuery", self.documents_root()))?;
        let body = json!({ "structuredQuery": self.page_query(query) });

        let items: Vec<RunQueryItem> = self.post("runQuery", url, &body).await?;
        items
            .into_iter()
            .filter_map(|item| item.document)
            .map(Document::into_record)
            .collect()
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<AgencyRecord>, StoreError> {
        let url = self.document_url(id)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| transport_error("get", e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: Document = read_json("get", response).await?;
        document.into_record().map(Some)
    }

    fn backend(&self) -> &'static str {
        "firestore"
    }
}

fn transport_error(operation: &str, error: reqwest::Error) -> StoreError {
    if error.is_timeout() {
        StoreError::timeout(format!("Firestore {}", operation))
    } else {
        StoreError::unavailable(format!("Firestore {} request failed: {}", operation, error))
    }
}

async fn read_json<T: DeserializeOwned>(
    operation: &str,
    response: reqwest::Response,
) -> Result<T, StoreError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(operation, e))?;

    if !status.is_success() {
        let snippet: String = body.chars().take(512).collect();
        let message = format!("Firestore {} returned {}: {}", operation, status, snippet);
        return Err(if status.is_client_error() {
            StoreError::rejected(message)
        } else {
            StoreError::unavailable(message)
        });
    }

    serde_json::from_str(&body).map_err(|e| {
        StoreError::malformed(format!("Firestore {} response: {}", operation, e))
    })
}

#[derive(Debug, Deserialize)]
struct RunQueryItem {
    #[serde(default)]
    document: Option<Document>,
}

#[derive(Debug, Deserialize)]
struct AggregationItem {
    #[serde(default)]
    result: Option<AggregationResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AggregationResult {
    #[serde(default)]
    aggregate_fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct Document {
    name: String,
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

impl Document {
    /// Validates the document into a typed record; the document id is authoritative
    fn into_record(self) -> Result<AgencyRecord, StoreError> {
        let id = self
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| StoreError::malformed(format!("bad document name {:?}", self.name)))?
            .to_string();

        let mut object = Map::with_capacity(self.fields.len() + 1);
        for (key, value) in self.fields {
            object.insert(key, value.into_json()?);
        }
        object.insert("id".to_string(), JsonValue::String(id.clone()));

        serde_json::from_value(JsonValue::Object(object)).map_err(|e| {
            StoreError::malformed(format!("document {} failed validation: {}", id, e))
        })
    }
}

/// Firestore's typed value encoding
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
enum FirestoreValue {
    NullValue(IgnoredAny),
    BooleanValue(bool),
    IntegerValue(String),
    DoubleValue(JsonValue),
    TimestampValue(String),
    StringValue(String),
    BytesValue(String),
    ReferenceValue(String),
    GeoPointValue(GeoPoint),
    ArrayValue(ArrayValue),
    MapValue(MapValue),
}

#[derive(Debug, Deserialize)]
struct GeoPoint {
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ArrayValue {
    #[serde(default)]
    values: Vec<FirestoreValue>,
}

#[derive(Debug, Deserialize)]
struct MapValue {
    #[serde(default)]
    fields: HashMap<String, FirestoreValue>,
}

impl FirestoreValue {
    fn into_json(self) -> Result<JsonValue, StoreError> {
        Ok(match self {
            Self::NullValue(_) => JsonValue::Null,
            Self::BooleanValue(b) => JsonValue::Bool(b),
            Self::IntegerValue(raw) => {
                let n: i64 = raw
                    .parse()
                    .map_err(|e| StoreError::malformed(format!("invalid integer {:?}: {}", raw, e)))?;
                JsonValue::from(n)
            }
            // Non-finite doubles arrive as strings and have no JSON form.
            Self::DoubleValue(n) if n.is_number() => n,
            Self::DoubleValue(_) => JsonValue::Null,
            Self::TimestampValue(s)
            | Self::StringValue(s)
            | Self::BytesValue(s)
            | Self::ReferenceValue(s) => JsonValue::String(s),
            Self::GeoPointValue(point) => json!({
                "latitude": point.latitude,
                "longitude": point.longitude
            }),
            Self::ArrayValue(array) => JsonValue::Array(
                array
                    .values
                    .into_iter()
                    .map(FirestoreValue::into_json)
                    .collect::<Result<_, _>>()?,
            ),
            Self::MapValue(map) => {
                let mut object = Map::with_capacity(map.fields.len());
                for (key, value) in map.fields {
                    object.insert(key, value.into_json()?);
                }
                JsonValue::Object(object)
            }
        })
    }
}
