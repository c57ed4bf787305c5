//! Shared test fixtures: an in-memory document store and a one-shot canned
//! HTTP responder for exercising the search client without the real API.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use crate::error::{IngestError, Result};
use crate::store::DocumentStore;

/// In-memory [`DocumentStore`] with map semantics, so upserting the same id
/// twice leaves exactly one document.
#[derive(Default)]
pub struct MemoryStore {
    pub docs: Mutex<BTreeMap<(String, String), Value>>,
    next_auto_id: Mutex<u64>,
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<()> {
        self.docs
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.to_string()), doc.clone());
        Ok(())
    }

    async fn insert(&self, collection: &str, doc: &Value) -> Result<String> {
        let mut next = self.next_auto_id.lock().unwrap();
        *next += 1;
        let id = format!("auto-{next}");
        self.docs
            .lock()
            .unwrap()
            .insert((collection.to_string(), id.clone()), doc.clone());
        Ok(id)
    }
}

/// [`DocumentStore`] that rejects every write.
pub struct FailingStore;

#[async_trait]
impl DocumentStore for FailingStore {
    async fn upsert(&self, _collection: &str, _id: &str, _doc: &Value) -> Result<()> {
        Err(IngestError::StoreResponse("synthetic failure".to_string()))
    }

    async fn insert(&self, _collection: &str, _doc: &Value) -> Result<String> {
        Err(IngestError::StoreResponse("synthetic failure".to_string()))
    }
}

/// Bind an ephemeral port, serve a single canned HTTP response to the first
/// connection, and return the base URL to point a client at.
pub async fn serve_once(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 8192];
        let _ = socket.read(&mut buf).await;
        let response = format!(
            "{status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.flush().await;
    });

    format!("http://{addr}")
}
