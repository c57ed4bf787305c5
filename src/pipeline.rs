//! The ingestion job: fetch once, then transform and persist each record.
//!
//! Control flow is strictly sequential. The fetch is all-or-nothing — any
//! failure there aborts the run before a single write happens. Once records
//! are in hand, each one is normalized and written on its own: a store
//! failure is logged and skipped so one bad record cannot sink the batch.

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::models::NewsDocument;
use crate::search::SearchClient;
use crate::store::{document_id_for_url, DocumentStore};

/// Per-run parameters resolved from the CLI in `main`.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub query: String,
    pub size: u32,
    pub collection: String,
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub fetched: usize,
    pub persisted: usize,
    pub failed: usize,
    /// Every normalized article of the run, persisted or not; this feeds
    /// the optional JSON snapshot.
    pub articles: Vec<NewsDocument>,
}

/// Run the job end to end.
#[instrument(level = "info", skip_all, fields(collection = %options.collection, size = options.size))]
pub async fn run(
    search: &SearchClient,
    store: &dyn DocumentStore,
    options: &IngestOptions,
) -> Result<IngestReport> {
    let raw_articles = search.search(&options.query, options.size).await?;

    let mut report = IngestReport {
        fetched: raw_articles.len(),
        ..Default::default()
    };
    info!(count = report.fetched, "Processing fetched articles");

    for (index, raw) in raw_articles.into_iter().enumerate() {
        let article = NewsDocument::from_raw(raw);
        match persist_article(store, &options.collection, &article).await {
            Ok(id) => {
                debug!(index, id = %id, title = %article.title, "Persisted article");
                report.persisted += 1;
            }
            Err(e) => {
                warn!(index, title = %article.title, error = %e, "Failed to persist article; continuing");
                report.failed += 1;
            }
        }
        report.articles.push(article);
    }

    info!(
        fetched = report.fetched,
        persisted = report.persisted,
        failed = report.failed,
        "Ingestion run complete"
    );
    Ok(report)
}

/// Write one article and return the identifier it landed under.
///
/// URL-bearing records get the deterministic hash id and upsert semantics;
/// everything else takes the store-assigned-id path.
async fn persist_article(
    store: &dyn DocumentStore,
    collection: &str,
    article: &NewsDocument,
) -> Result<String> {
    let doc: Value = serde_json::to_value(article)?;
    match &article.url {
        Some(url) => {
            let id = document_id_for_url(url);
            store.upsert(collection, &id, &doc).await?;
            Ok(id)
        }
        None => store.insert(collection, &doc).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use crate::testutil::{serve_once, FailingStore, MemoryStore};
    use serde_json::json;

    fn options() -> IngestOptions {
        IngestOptions {
            query: "q".to_string(),
            size: 2,
            collection: "news-unresolved".to_string(),
        }
    }

    fn two_entry_response() -> String {
        json!({
            "data": [
                {
                    "entity": {
                        "title": "Superbug outbreak",
                        "text": "a new superbugs wave",
                        "pageUrl": "https://example.com/articles/superbug-outbreak",
                        "date": "d2025-06-01"
                    }
                },
                {
                    "title": "No link here",
                    "text": "bacteria in the wild"
                }
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_run_persists_keyed_and_auto_id_records() {
        let endpoint = serve_once("HTTP/1.1 200 OK", two_entry_response()).await;
        let search = SearchClient::with_endpoint("test-token", endpoint);
        let store = MemoryStore::default();

        let report = run(&search, &store, &options()).await.unwrap();

        assert_eq!(report.fetched, 2);
        assert_eq!(report.persisted, 2);
        assert_eq!(report.failed, 0);
        assert_eq!(report.articles.len(), 2);

        let docs = store.docs.lock().unwrap();
        assert_eq!(docs.len(), 2);

        // URL-bearing record lands under the hash of its URL.
        let keyed = docs
            .get(&(
                "news-unresolved".to_string(),
                "a72621098f500cb68081a47d0985b8f6".to_string(),
            ))
            .expect("keyed document missing");
        assert_eq!(keyed["title"], "Superbug outbreak");
        assert_eq!(keyed["date"], "2025-06-01");

        // URL-less record went through the auto-id insert path.
        let auto = docs
            .get(&("news-unresolved".to_string(), "auto-1".to_string()))
            .expect("auto-id document missing");
        assert_eq!(auto["title"], "No link here");
        assert_eq!(auto["url"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_run_is_idempotent_for_url_bearing_records() {
        let store = MemoryStore::default();
        let opts = options();

        for _ in 0..2 {
            let endpoint = serve_once("HTTP/1.1 200 OK", json!({
                "data": [{ "entity": {
                    "title": "Same article",
                    "pageUrl": "https://example.com/a"
                }}]
            }).to_string())
            .await;
            let search = SearchClient::with_endpoint("test-token", endpoint);
            run(&search, &store, &opts).await.unwrap();
        }

        // Two runs over the same article: one document, not two.
        let docs = store.docs.lock().unwrap();
        assert_eq!(docs.len(), 1);
        assert!(docs.contains_key(&(
            "news-unresolved".to_string(),
            "cd69b81ea00cc2798797293cbc92d643".to_string()
        )));
    }

    #[tokio::test]
    async fn test_fetch_failure_writes_nothing() {
        let endpoint = serve_once("HTTP/1.1 401 Unauthorized", "{}".to_string()).await;
        let search = SearchClient::with_endpoint("bad-token", endpoint);
        let store = MemoryStore::default();

        let err = run(&search, &store, &options()).await.unwrap_err();
        assert!(matches!(err, IngestError::Status { status: 401, .. }));
        assert!(store.docs.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failures_are_skipped_per_record() {
        let endpoint = serve_once("HTTP/1.1 200 OK", two_entry_response()).await;
        let search = SearchClient::with_endpoint("test-token", endpoint);
        let store = FailingStore;

        let report = run(&search, &store, &options()).await.unwrap();
        assert_eq!(report.fetched, 2);
        assert_eq!(report.persisted, 0);
        assert_eq!(report.failed, 2);
        // The snapshot still sees every normalized article.
        assert_eq!(report.articles.len(), 2);
    }
}
