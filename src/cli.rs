//! Command-line interface definitions for topic_corpus.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every option except the topics can also come from an environment variable
//! or the YAML config file; CLI values win.

use clap::Parser;

/// Command-line arguments for the topic_corpus application.
///
/// # Examples
///
/// ```sh
/// # One topic, keys from the environment
/// GNEWS_API_KEY=... SERPAPI_API_KEY=... topic_corpus "Rust (programming language)"
///
/// # Several topics, archived to ./results
/// topic_corpus -a ./results "Ada Lovelace" "Alan Turing"
///
/// # With a config file
/// topic_corpus -c ./topic_corpus.yaml "Grace Hopper"
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Topics to gather text for; each becomes its own job
    #[arg(required = true)]
    pub topics: Vec<String>,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory where succeeded jobs are archived as `{job_id}.json`
    #[arg(short, long, env = "ARCHIVE_DIR")]
    pub archive_dir: Option<String>,

    /// GNews API key
    #[arg(long, env = "GNEWS_API_KEY")]
    pub gnews_api_key: Option<String>,

    /// SerpAPI key
    #[arg(long, env = "SERPAPI_API_KEY")]
    pub serpapi_api_key: Option<String>,

    /// Maximum number of jobs running at once
    #[arg(long)]
    pub max_concurrent_jobs: Option<usize>,

    /// Status polling interval in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,
}
