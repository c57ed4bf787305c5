//! JSON snapshot of one ingestion run.
//!
//! When a data directory is configured, the full array of normalized
//! articles is written to `{data_dir}/amr_news.json` — pretty-printed,
//! UTF-8, non-ASCII preserved — so the frontend can serve the latest run
//! without touching the document store.

use tokio::fs;
use tracing::{info, instrument};

use crate::error::Result;
use crate::models::NewsDocument;

/// Fixed snapshot file name inside the data directory.
pub const SNAPSHOT_FILENAME: &str = "amr_news.json";

/// Write the run's normalized articles to the snapshot file.
///
/// Returns the path written. Failure here is reported by the caller but
/// never aborts the run; the store writes have already happened.
#[instrument(level = "info", skip_all, fields(data_dir = %data_dir))]
pub async fn write_snapshot(articles: &[NewsDocument], data_dir: &str) -> Result<String> {
    let json = serde_json::to_string_pretty(articles)?;
    let path = format!("{}/{}", data_dir.trim_end_matches('/'), SNAPSHOT_FILENAME);

    fs::write(&path, json).await?;
    info!(path = %path, count = articles.len(), "Wrote snapshot JSON");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawArticle;
    use serde_json::json;

    #[tokio::test]
    async fn test_write_snapshot_roundtrip() {
        let dir = std::env::temp_dir().join("amr_test_snapshot");
        std::fs::create_dir_all(&dir).unwrap();

        let raw: RawArticle = serde_json::from_value(json!({
            "title": "Superbakterier på fremmarch",
            "text": "mrsa i Danmark",
            "pageUrl": "https://example.dk/nyhed",
        }))
        .unwrap();
        let articles = vec![NewsDocument::from_raw(raw)];

        let path = write_snapshot(&articles, dir.to_str().unwrap())
            .await
            .unwrap();
        assert!(path.ends_with(SNAPSHOT_FILENAME));

        let written = std::fs::read_to_string(&path).unwrap();
        // Non-ASCII must be preserved literally, not escaped.
        assert!(written.contains("Superbakterier på fremmarch"));

        let parsed: Vec<NewsDocument> = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed, articles);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
