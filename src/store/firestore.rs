//! Firestore REST implementation of [`DocumentStore`].
//!
//! Documents are written through the Firestore v1 REST surface: a `PATCH`
//! to `{documents}/{collection}/{id}` has replace-on-conflict semantics and
//! backs the idempotent upsert path, while a `POST` to
//! `{documents}/{collection}` lets Firestore assign the id for records
//! without a URL. Firestore does not accept plain JSON; every value is
//! encoded into its typed `fields` representation first.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

use crate::error::{IngestError, Result};
use crate::store::DocumentStore;
use crate::utils::truncate_for_log;

/// Production API root.
pub const FIRESTORE_API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Service credentials loaded from the JSON file named on the command line.
///
/// Both fields are required and must be non-empty; the job aborts before
/// touching the network otherwise.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreCredentials {
    pub project_id: String,
    pub api_key: String,
}

impl StoreCredentials {
    pub fn load(path: &str) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| IngestError::Credentials {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        let creds: StoreCredentials =
            serde_json::from_str(&raw).map_err(|e| IngestError::Credentials {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        if creds.project_id.trim().is_empty() || creds.api_key.trim().is_empty() {
            return Err(IngestError::Credentials {
                path: path.to_string(),
                reason: "project_id and api_key must be non-empty".to_string(),
            });
        }
        Ok(creds)
    }
}

/// Firestore REST client. One instance per run, shared by every write.
pub struct FirestoreClient {
    http: reqwest::Client,
    documents_url: String,
    api_key: String,
}

impl FirestoreClient {
    pub fn new(creds: &StoreCredentials) -> Self {
        let documents_url = format!(
            "{FIRESTORE_API_BASE}/projects/{}/databases/(default)/documents",
            creds.project_id
        );
        Self::with_documents_url(documents_url, creds.api_key.clone())
    }

    /// Point the client at a different documents root (tests, emulator).
    pub fn with_documents_url(
        documents_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            documents_url: documents_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    #[instrument(level = "debug", skip(self, doc))]
    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<()> {
        let url = format!("{}/{}/{}", self.documents_url, collection, id);
        let response = self
            .http
            .patch(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&encode_document(doc))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::StoreStatus {
                status: status.as_u16(),
                collection: collection.to_string(),
                body: truncate_for_log(&body, 300),
            });
        }
        debug!(collection, id, "Upserted document");
        Ok(())
    }

    #[instrument(level = "debug", skip(self, doc))]
    async fn insert(&self, collection: &str, doc: &Value) -> Result<String> {
        let url = format!("{}/{}", self.documents_url, collection);
        let response = self
            .http
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&encode_document(doc))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::StoreStatus {
                status: status.as_u16(),
                collection: collection.to_string(),
                body: truncate_for_log(&body, 300),
            });
        }

        // The created document's full resource name comes back as e.g.
        // "projects/p/databases/(default)/documents/news-unresolved/AbC123".
        let created: Value = response.json().await?;
        let name = created
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| IngestError::StoreResponse("missing document name".to_string()))?;
        let id = name.rsplit('/').next().unwrap_or(name).to_string();
        debug!(collection, id = %id, "Inserted document with store-assigned id");
        Ok(id)
    }
}

/// Encode a JSON document into Firestore's typed `{"fields": …}` form.
pub(crate) fn encode_document(doc: &Value) -> Value {
    match doc {
        Value::Object(map) => json!({ "fields": encode_fields(map) }),
        other => json!({ "fields": { "value": encode_value(other) } }),
    }
}

fn encode_fields(map: &Map<String, Value>) -> Value {
    Value::Object(
        map.iter()
            .map(|(key, value)| (key.clone(), encode_value(value)))
            .collect(),
    )
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            // Firestore carries integers as strings.
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n.as_f64() })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => json!({
            "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() }
        }),
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}
