//! Firestore-backed document collection (REST v1).
//!
//! ## Request Mapping
//!
//! | Operation | HTTP |
//! |-----------|------|
//! | `add` | `POST {documents}/{collection}` |
//! | `set` | `PATCH {documents}/{collection}/{id}?currentDocument.exists=true` |
//! | `remove` | `DELETE {documents}/{collection}/{id}?currentDocument.exists=true` |
//! | `get` | `GET {documents}/{collection}/{id}` |
//! | `query_ordered_desc` | `POST {documents}:runQuery` (structured query, `DESCENDING`) |
//!
//! ## Error Mapping
//!
//! | Response | StoreError |
//! |----------|------------|
//! | 404 / `NOT_FOUND` / `FAILED_PRECONDITION` on a document path | `NotFound` |
//! | other non-2xx | `Remote { status, body }` |
//! | connection / timeout failures | `Transport` |
//! | unexpected payload shape | `Decode` |

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue, json};
use stockpos_core::RecordId;
use tracing::instrument;

use super::{Document, DocumentCollection, DocumentFields};
use crate::config::FirestoreConfig;
use crate::error::StoreError;

/// A single Firestore collection accessed over the REST API.
#[derive(Debug, Clone)]
pub struct FirestoreCollection {
    http: reqwest::Client,
    documents_url: String,
    collection: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirestoreDocument {
    name: String,
    #[serde(default)]
    fields: Map<String, JsonValue>,
}

#[derive(Debug, Deserialize)]
struct RunQueryEntry {
    #[serde(default)]
    document: Option<FirestoreDocument>,
}

impl FirestoreCollection {
    pub fn new(config: &FirestoreConfig, collection: impl Into<String>) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self::with_client(http, config, collection))
    }

    pub fn with_client(
        http: reqwest::Client,
        config: &FirestoreConfig,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            http,
            documents_url: config.documents_url(),
            collection: collection.into(),
            api_key: config.api_key.clone(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.documents_url, self.collection)
    }

    fn document_url(&self, id: &RecordId) -> String {
        format!("{}/{}/{}", self.documents_url, self.collection, id)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let req = self.http.request(method, url);
        match &self.api_key {
            Some(key) => req.query(&[("key", key.as_str())]),
            None => req,
        }
    }

    async fn send(req: RequestBuilder) -> Result<Response, StoreError> {
        req.send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    /// Map a non-success response on a document path.
    async fn document_error(id: &RecordId, resp: Response) -> StoreError {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND || is_missing_document(&body) {
            StoreError::NotFound(id.clone())
        } else {
            StoreError::Remote {
                status: status.as_u16(),
                body,
            }
        }
    }

    async fn remote_error(resp: Response) -> StoreError {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        StoreError::Remote { status, body }
    }
}

#[async_trait::async_trait]
impl DocumentCollection for FirestoreCollection {
    fn name(&self) -> &str {
        &self.collection
    }

    #[instrument(skip(self, fields), fields(collection = %self.collection))]
    async fn add(&self, fields: DocumentFields) -> Result<RecordId, StoreError> {
        let body = json!({ "fields": encode_fields(fields) });
        let resp = Self::send(self.request(Method::POST, self.collection_url()).json(&body)).await?;
        if !resp.status().is_success() {
            return Err(Self::remote_error(resp).await);
        }

        let doc: FirestoreDocument = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        document_id(&doc.name)
    }

    #[instrument(skip(self, fields), fields(collection = %self.collection))]
    async fn set(&self, id: &RecordId, fields: DocumentFields) -> Result<(), StoreError> {
        let body = json!({ "fields": encode_fields(fields) });
        let req = self
            .request(Method::PATCH, self.document_url(id))
            .query(&[("currentDocument.exists", "true")])
            .json(&body);
        let resp = Self::send(req).await?;
        if !resp.status().is_success() {
            return Err(Self::document_error(id, resp).await);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn remove(&self, id: &RecordId) -> Result<(), StoreError> {
        let req = self
            .request(Method::DELETE, self.document_url(id))
            .query(&[("currentDocument.exists", "true")]);
        let resp = Self::send(req).await?;
        if !resp.status().is_success() {
            return Err(Self::document_error(id, resp).await);
        }
        Ok(())
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn get(&self, id: &RecordId) -> Result<Option<Document>, StoreError> {
        let resp = Self::send(self.request(Method::GET, self.document_url(id))).await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(Self::remote_error(resp).await);
        }

        let doc: FirestoreDocument = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        into_document(doc).map(Some)
    }

    #[instrument(skip(self), fields(collection = %self.collection))]
    async fn query_ordered_desc(&self, field: &str) -> Result<Vec<Document>, StoreError> {
        let body = run_query_body(&self.collection, field);
        let url = format!("{}:runQuery", self.documents_url);
        let resp = Self::send(self.request(Method::POST, url).json(&body)).await?;
        if !resp.status().is_success() {
            return Err(Self::remote_error(resp).await);
        }

        let entries: JsonValue = resp
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        parse_run_query(entries)
    }
}

fn run_query_body(collection: &str, field: &str) -> JsonValue {
    json!({
        "structuredQuery": {
            "from": [{ "collectionId": collection }],
            "orderBy": [{
                "field": { "fieldPath": field },
                "direction": "DESCENDING"
            }]
        }
    })
}

/// `runQuery` answers with an array; entries without a `document` only carry
/// read metadata and are skipped.
fn parse_run_query(entries: JsonValue) -> Result<Vec<Document>, StoreError> {
    let entries: Vec<RunQueryEntry> =
        serde_json::from_value(entries).map_err(|e| StoreError::Decode(e.to_string()))?;
    entries
        .into_iter()
        .filter_map(|e| e.document)
        .map(into_document)
        .collect()
}

fn into_document(doc: FirestoreDocument) -> Result<Document, StoreError> {
    Ok(Document {
        id: document_id(&doc.name)?,
        fields: decode_fields(doc.fields)?,
    })
}

/// Last path segment of `projects/{p}/databases/{d}/documents/{coll}/{id}`.
fn document_id(name: &str) -> Result<RecordId, StoreError> {
    let segment = name.rsplit('/').next().unwrap_or_default();
    RecordId::new(segment).map_err(|e| StoreError::Decode(format!("document name '{name}': {e}")))
}

fn is_missing_document(body: &str) -> bool {
    let Ok(parsed) = serde_json::from_str::<JsonValue>(body) else {
        return false;
    };
    matches!(
        parsed.pointer("/error/status").and_then(JsonValue::as_str),
        Some("NOT_FOUND") | Some("FAILED_PRECONDITION")
    )
}

fn encode_fields(fields: DocumentFields) -> Map<String, JsonValue> {
    fields.into_iter().map(|(k, v)| (k, encode_value(v))).collect()
}

fn decode_fields(fields: Map<String, JsonValue>) -> Result<DocumentFields, StoreError> {
    fields
        .into_iter()
        .map(|(k, v)| decode_value(v).map(|v| (k, v)))
        .collect()
}

/// Plain JSON -> Firestore typed value.
fn encode_value(value: JsonValue) -> JsonValue {
    match value {
        JsonValue::Null => json!({ "nullValue": null }),
        JsonValue::Bool(b) => json!({ "booleanValue": b }),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else if let Some(u) = n.as_u64() {
                json!({ "integerValue": u.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64().unwrap_or_default() })
            }
        }
        JsonValue::String(s) => json!({ "stringValue": s }),
        JsonValue::Array(values) => json!({
            "arrayValue": { "values": values.into_iter().map(encode_value).collect::<Vec<_>>() }
        }),
        JsonValue::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Firestore typed value -> plain JSON.
fn decode_value(value: JsonValue) -> Result<JsonValue, StoreError> {
    let typed = match value {
        JsonValue::Object(map) => map,
        other => return Err(StoreError::Decode(format!("expected typed value, got {other}"))),
    };
    let Some((kind, inner)) = typed.into_iter().next() else {
        return Err(StoreError::Decode("empty typed value".to_string()));
    };

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(JsonValue::Null),
        ("booleanValue", v @ JsonValue::Bool(_)) => Ok(v),
        ("stringValue", v @ JsonValue::String(_)) => Ok(v),
        ("timestampValue", v @ JsonValue::String(_)) => Ok(v),
        ("referenceValue", v @ JsonValue::String(_)) => Ok(v),
        ("integerValue", JsonValue::String(s)) => s
            .parse::<i64>()
            .map(JsonValue::from)
            .map_err(|e| StoreError::Decode(format!("integerValue '{s}': {e}"))),
        ("integerValue", v @ JsonValue::Number(_)) => Ok(v),
        ("doubleValue", v @ JsonValue::Number(_)) => Ok(v),
        ("arrayValue", JsonValue::Object(mut arr)) => match arr.remove("values") {
            Some(JsonValue::Array(values)) => values
                .into_iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            _ => Ok(JsonValue::Array(Vec::new())),
        },
        ("mapValue", JsonValue::Object(mut map)) => match map.remove("fields") {
            Some(JsonValue::Object(fields)) => decode_fields(fields).map(JsonValue::Object),
            _ => Ok(JsonValue::Object(Map::new())),
        },
        (kind, inner) => Err(StoreError::Decode(format!(
            "unsupported value {kind}: {inner}"
        ))),
    }
}
