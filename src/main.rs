//! # AMR News Ingest
//!
//! A batch ingestion job that monitors news coverage of antimicrobial
//! resistance. Each run queries the Diffbot Knowledge Graph for matching
//! articles, annotates every result with keyword highlighting and a
//! relevance explanation, and upserts the annotated records into a
//! Firestore collection keyed by a hash of the article URL, so re-ingesting
//! the same article overwrites rather than duplicates.
//!
//! ## Usage
//!
//! ```sh
//! DIFFBOT_TOKEN=... amr_news_ingest --credentials ./firestore.json
//! ```
//!
//! ## Architecture
//!
//! One sequential pipeline per run:
//! 1. **Fetch**: a single DQL search request (fatal on any failure)
//! 2. **Transform**: normalize each raw entity into a [`models::NewsDocument`]
//! 3. **Persist**: per-record upsert, logged and skipped on failure
//!
//! An optional JSON snapshot of the run is written next to the store
//! writes. The job is meant to be driven by cron; it keeps no state
//! between runs.

use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use clap::Parser;

mod annotate;
mod cli;
mod error;
mod models;
mod outputs;
mod pipeline;
mod search;
mod store;
#[cfg(test)]
mod testutil;
mod utils;

use cli::Cli;
use error::IngestError;
use pipeline::IngestOptions;
use search::SearchClient;
use store::firestore::{FirestoreClient, StoreCredentials};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("amr_news_ingest starting up");

    // .env is optional; the environment may already be populated.
    if dotenvy::dotenv().is_ok() {
        debug!("Loaded .env file");
    }

    let args = Cli::parse();
    debug!(size = args.size, collection = %args.collection, ?args.data_dir, ?args.since, "Parsed CLI arguments");

    // --- Fatal configuration checks, before any network traffic ---
    let Some(token) = args
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
    else {
        error!("DIFFBOT_TOKEN not found; set it in .env or pass --token");
        return Err(IngestError::MissingToken.into());
    };

    let credentials = match StoreCredentials::load(&args.credentials) {
        Ok(creds) => creds,
        Err(e) => {
            error!(path = %args.credentials, error = %e, "Store credential file is missing or invalid");
            return Err(e.into());
        }
    };
    info!(project_id = %credentials.project_id, "Loaded store credentials");

    // Early check: a configured snapshot directory must be writable.
    if let Some(ref data_dir) = args.data_dir {
        if let Err(e) = ensure_writable_dir(data_dir).await {
            error!(
                path = %data_dir,
                error = %e,
                "Data directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    // --- Construct clients once; everything downstream borrows them ---
    let search = SearchClient::new(token);
    let firestore = FirestoreClient::new(&credentials);

    let options = IngestOptions {
        query: search::build_query(args.since),
        size: args.size,
        collection: args.collection.clone(),
    };

    // --- Run the pipeline ---
    let report = match pipeline::run(&search, &firestore, &options).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, "Ingestion run failed before persistence");
            return Err(e.into());
        }
    };

    // --- Optional local snapshot ---
    if let Some(ref data_dir) = args.data_dir {
        match outputs::json::write_snapshot(&report.articles, data_dir).await {
            Ok(path) => info!(path = %path, "Snapshot written"),
            Err(e) => warn!(path = %data_dir, error = %e, "Failed to write snapshot; store writes are unaffected"),
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        fetched = report.fetched,
        persisted = report.persisted,
        failed = report.failed,
        "Execution complete"
    );

    Ok(())
}
