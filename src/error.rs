//! Error types for the ingestion job.
//!
//! Failures fall into two tiers. Fatal errors abort the whole run: missing
//! configuration, an unreadable credential file, or any failure of the
//! search request itself. Per-record store errors are recoverable: the
//! pipeline logs them and moves on to the next article.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("DIFFBOT_TOKEN is missing or empty")]
    MissingToken,

    #[error("invalid store credentials at {path}: {reason}")]
    Credentials { path: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("search API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("store returned HTTP {status} for collection {collection}: {body}")]
    StoreStatus {
        status: u16,
        collection: String,
        body: String,
    },

    #[error("unexpected store response: {0}")]
    StoreResponse(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, IngestError>;
