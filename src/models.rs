//! Data models for raw search entities and their normalized form.
//!
//! [`RawArticle`] is a tolerant view of a Diffbot Knowledge Graph entity:
//! every field may be absent, and the `date` field may arrive as either a
//! plain string or a structured object (see [`RawDate`]). [`NewsDocument`]
//! is the shape this job persists; its snake_case wire keys match the JSON
//! consumed by the news frontend, so they must not be renamed casually.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::annotate;

/// Title sentinel for entities with no `title` field.
pub const UNTITLED: &str = "Uden titel";
/// Source sentinel for entities with no `siteName` field.
pub const UNKNOWN_SOURCE: &str = "Ukendt kilde";

/// A raw article entity as returned by the search API.
///
/// The producer guarantees nothing about which fields are present, so every
/// field defaults when absent. Fields with upstream type variance (`image`)
/// are kept as opaque JSON.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawArticle {
    pub title: Option<String>,
    pub text: Option<String>,
    pub html: Option<String>,
    pub date: Option<RawDate>,
    #[serde(rename = "siteName")]
    pub site_name: Option<String>,
    pub image: Option<Value>,
    pub tags: Vec<RawTag>,
    pub sentiment: Option<f64>,
    #[serde(rename = "pageUrl")]
    pub page_url: Option<String>,
    #[serde(rename = "resolvedPageUrl")]
    pub resolved_page_url: Option<String>,
}

/// A topical tag attached to a raw entity. Tags without a `label` are
/// dropped during normalization.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct RawTag {
    pub label: Option<String>,
}

/// The two shapes the producer uses for `date`: a structured object with a
/// display string under `str`, or the display string directly.
///
/// Resolved once at the transform boundary by [`annotate::normalize_date`];
/// nothing else inspects the variants.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDate {
    Structured {
        #[serde(rename = "str", default)]
        display: Option<String>,
    },
    Plain(String),
}

/// A normalized, annotated article ready for persistence.
///
/// Exists only for the duration of one run; the document store and the
/// optional JSON snapshot both receive exactly this serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsDocument {
    pub title: String,
    /// Canonical identity; `resolvedPageUrl` preferred over `pageUrl`.
    /// `None` when the entity carries no usable URL.
    pub url: Option<String>,
    pub date: String,
    pub source: String,
    pub image: Option<Value>,
    /// First 300 characters of the body with `<mark>` highlighting.
    pub summary_html: String,
    /// Full body (HTML when available, text otherwise), highlighted.
    pub full_content_html: String,
    pub relevance_msg: String,
    pub tags: Vec<String>,
    pub sentiment_score: f64,
}

impl NewsDocument {
    /// Normalize one raw search entity into the persisted document shape.
    ///
    /// Pure apart from the fixed keyword list: identical input yields an
    /// identical document.
    pub fn from_raw(raw: RawArticle) -> Self {
        let text = raw.text.as_deref().unwrap_or("");
        let html = raw.html.as_deref().unwrap_or(text);
        let labels: Vec<String> = raw.tags.iter().filter_map(|t| t.label.clone()).collect();

        let summary_html = annotate::highlight_keywords(text, Some(annotate::SUMMARY_PREVIEW_CHARS));
        let full_content_html = annotate::highlight_keywords(html, None);
        let relevance_msg = annotate::relevance_reason(text, &labels);
        let date = annotate::normalize_date(raw.date.as_ref());

        // Empty strings count as absent, so an empty resolved URL still
        // falls back to the page URL.
        let url = raw
            .resolved_page_url
            .filter(|u| !u.is_empty())
            .or(raw.page_url.filter(|u| !u.is_empty()));

        Self {
            title: raw.title.unwrap_or_else(|| UNTITLED.to_string()),
            url,
            date,
            source: raw.site_name.unwrap_or_else(|| UNKNOWN_SOURCE.to_string()),
            image: raw.image,
            summary_html,
            full_content_html,
            relevance_msg,
            tags: labels,
            sentiment_score: raw.sentiment.unwrap_or(0.0),
        }
    }
}
