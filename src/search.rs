//! Diffbot Knowledge Graph search client.
//!
//! One GET against the DQL endpoint per run: no retries, no backoff, no
//! pagination. The job is driven by an external scheduler, so a failed run
//! is simply reported and the next scheduled run tries again. Any transport
//! error or non-success status is fatal for the whole run; individual
//! entries that fail to decode are logged and skipped.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{IngestError, Result};
use crate::models::RawArticle;
use crate::utils::truncate_for_log;

/// Production DQL endpoint.
pub const DIFFBOT_ENDPOINT: &str = "https://kg.diffbot.com/kg/v3/dql";

/// The fixed AMR filter expression: English-language articles matching
/// antimicrobial-resistance title/text/tag predicates, minus market-report
/// titles and known noise sites, newest first.
pub const AMR_QUERY: &str = r#"type:Article language:en  or(   title:"Antimicrobial resistance",    tags.label:"Antimicrobial resistance",    title:"Antibiotic resistance",    title:"Superbugs",    text:"Antimicrobial stewardship",    text:"Antibiotic resistance",    text:"Antimicrobial resistance",    text:"multidrug-resistant",    text:"Phage therapy" )  not(title:or("market research", "market size", "sensor", "magnetic", "forecast", "shares"))  not(site:or("surahquran.com", "angi.com", "NewStraitsTimes")) not(pageUrl:"www.nst.com.my")  sortBy:date"#;

/// Build the query for one run, optionally bounded below by a publication
/// date.
pub fn build_query(since: Option<NaiveDate>) -> String {
    match since {
        Some(date) => format!("{AMR_QUERY} date>{date}"),
        None => AMR_QUERY.to_string(),
    }
}

#[derive(Debug, Default, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for the knowledge-graph search API.
///
/// Constructed once at startup and passed by reference into the pipeline;
/// the token is validated before the client is ever built.
pub struct SearchClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl SearchClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_endpoint(token, DIFFBOT_ENDPOINT)
    }

    /// Point the client at a different endpoint (tests, proxies).
    pub fn with_endpoint(token: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    /// Run one search and return the decoded entities.
    ///
    /// Each `data[]` entry may wrap its payload under an `entity` key or be
    /// the payload itself; both shapes are accepted.
    #[instrument(level = "info", skip(self, query))]
    pub async fn search(&self, query: &str, size: u32) -> Result<Vec<RawArticle>> {
        let params = [
            ("token", self.token.clone()),
            ("query", query.to_string()),
            ("size", size.to_string()),
            ("json", "true".to_string()),
        ];
        let url = Url::parse_with_params(&self.endpoint, &params)?;
        debug!(endpoint = %self.endpoint, size, "Requesting search results");

        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(IngestError::Status {
                status: status.as_u16(),
                body: truncate_for_log(&body, 300),
            });
        }

        let payload: SearchResponse = response.json().await?;
        let mut articles = Vec::with_capacity(payload.data.len());
        for (index, entry) in payload.data.into_iter().enumerate() {
            let entity = match entry {
                Value::Object(mut map) => map.remove("entity").unwrap_or(Value::Object(map)),
                other => other,
            };
            match serde_json::from_value::<RawArticle>(entity) {
                Ok(article) => articles.push(article),
                Err(e) => warn!(index, error = %e, "Skipping undecodable search entry"),
            }
        }

        info!(count = articles.len(), "Fetched search results");
        Ok(articles)
    }
}
