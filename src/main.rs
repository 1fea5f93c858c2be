//! # topic_corpus
//!
//! Gathers text about a topic from three independent sources, cleans each
//! source's output, and joins the results into one document. Every topic runs
//! as a background job whose progress can be polled while it works.
//!
//! ## Sources
//!
//! - Wikipedia (plain-text article extract)
//! - GNews (news search, each article page scraped)
//! - SerpAPI (Google web search, top results scraped)
//!
//! ## Usage
//!
//! ```sh
//! topic_corpus -a ./results "Ada Lovelace" "Alan Turing"
//! ```
//!
//! ## Architecture
//!
//! 1. **Submission**: each topic becomes a `Pending` job in the job store
//! 2. **Fan-out**: the job runs one fetch → clean pipeline per source, in parallel
//! 3. **Aggregation**: non-empty texts are joined in fixed source order
//! 4. **Output**: the terminal job view is printed; successes are optionally archived as JSON

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use futures::future::join_all;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod aggregate;
mod cleaner;
mod cli;
mod config;
mod error;
mod fetchers;
mod jobs;
mod models;
mod outputs;
mod pipeline;
mod utils;

use cli::Cli;
use config::Config;
use fetchers::Sources;
use jobs::{JobManager, ManagerSettings};
use models::{JobId, JobStatus, JobView};
use utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("topic_corpus starting up");

    let args = Cli::parse();
    debug!(topics = ?args.topics, config = ?args.config, "Parsed CLI arguments");

    let config = Config::load(&args)?;
    if config.gnews_api_key.is_none() {
        warn!("GNews API key not configured; news search will not contribute");
    }
    if config.serpapi_api_key.is_none() {
        warn!("SerpAPI key not configured; web search will not contribute");
    }

    // Early check: ensure archive dir is writable
    if let Some(dir) = &config.archive_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir.display(),
                error = %e,
                "Archive directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    let sources = Sources::from_config(&config)?;
    let manager = JobManager::new(sources, ManagerSettings::from_config(&config));

    let submitted: Vec<(String, JobId)> = args
        .topics
        .iter()
        .map(|topic| (topic.clone(), manager.submit(topic.as_str())))
        .collect();
    info!(count = submitted.len(), "Submitted jobs");

    let views = join_all(
        submitted
            .iter()
            .map(|(topic, job_id)| watch_job(&manager, *job_id, topic, &config)),
    )
    .await;

    let mut failed = 0usize;
    for view in views {
        let view = view?;
        if view.status == JobStatus::Failed {
            failed += 1;
        }
        println!("{}", serde_json::to_string_pretty(&view)?);
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        jobs = submitted.len(),
        failed,
        "Execution complete"
    );

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Poll one job until it finishes, logging every progress change.
#[instrument(level = "info", skip(manager, config))]
async fn watch_job(
    manager: &JobManager,
    job_id: JobId,
    topic: &str,
    config: &Config,
) -> error::Result<JobView> {
    let mut last_label = String::new();
    loop {
        let view = manager.get(&job_id)?;
        if view.progress_label != last_label {
            info!(
                status = ?view.status,
                progress = %view.progress_label,
                active_jobs = manager.active_count(),
                "Job progress"
            );
            last_label = view.progress_label.clone();
        }
        if view.status.is_terminal() {
            match (&view.result, &view.error) {
                (Some(result), _) => info!(
                    characters = result.character_count,
                    sources = ?result.contributing_sources,
                    "Job finished"
                ),
                (_, Some(reason)) => warn!(%reason, "Job failed"),
                _ => {}
            }
            return Ok(view);
        }
        tokio::time::sleep(config.poll_interval()).await;
    }
}
