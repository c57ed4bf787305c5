//! Command-line interface for the AMR news ingestion job.
//!
//! Every option can come from a flag or from the environment, so the same
//! binary works interactively and from cron with a `.env` file.

use chrono::NaiveDate;
use clap::Parser;

/// Command-line arguments for one ingestion run.
///
/// # Examples
///
/// ```sh
/// # Token and credentials from the environment / .env
/// amr_news_ingest --credentials ./firestore.json
///
/// # Smaller batch, local snapshot, only recent articles
/// amr_news_ingest -c ./firestore.json -s 10 -d ./data --since 2025-06-01
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Diffbot Knowledge Graph API token
    #[arg(long, env = "DIFFBOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Path to the JSON store credential file (project_id, api_key)
    #[arg(short = 'c', long, env = "STORE_CREDENTIALS")]
    pub credentials: String,

    /// Maximum number of search results to fetch
    #[arg(short, long, env = "INGEST_SIZE", default_value_t = 25)]
    pub size: u32,

    /// Document-store collection to upsert into
    #[arg(long, env = "INGEST_COLLECTION", default_value = "news-unresolved")]
    pub collection: String,

    /// Optional directory for a local JSON snapshot of the run
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// Only fetch articles published after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<NaiveDate>,
}
