//! Document-store seam and identifier derivation.
//!
//! The pipeline talks to storage exclusively through [`DocumentStore`], so
//! the Firestore REST client can be swapped for an in-memory store in tests.

use async_trait::async_trait;
use md5::{Digest, Md5};
use serde_json::Value;

use crate::error::Result;

pub mod firestore;

/// Key-value document storage as this job consumes it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write-or-replace a document under a caller-supplied id.
    async fn upsert(&self, collection: &str, id: &str, doc: &Value) -> Result<()>;

    /// Append a document, letting the store assign the id. Returns the
    /// assigned id. No deduplication is possible on this path.
    async fn insert(&self, collection: &str, doc: &Value) -> Result<String>;
}

/// Derive the stable 32-hex-character document id for a URL-bearing record.
///
/// The id is the MD5 digest of the UTF-8 bytes of the URL, so re-ingesting
/// the same article always lands on the same document.
pub fn document_id_for_url(url: &str) -> String {
    format!("{:x}", Md5::digest(url.as_bytes()))
}
