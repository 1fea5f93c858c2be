//! Background job management.
//!
//! [`JobManager::submit`] records a job as `Pending` and returns its id at
//! once; a spawned task then waits for a concurrency permit, fans out to one
//! pipeline task per source, records each outcome as it arrives, aggregates,
//! and moves the job to `Succeeded` or `Failed`. [`JobManager::get`] reads a
//! snapshot at any time.

pub mod state;
pub mod store;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetchers::{Credentials, Sources};
use crate::models::{JobId, JobRecord, JobStatus, JobView, PipelineOutcome, SourceKind};
use crate::outputs::json;
use crate::pipeline::run_source_pipeline;

use state::Job;
use store::{JobHandle, JobStore, lock};

/// Failure reason for a job whose sources did not all report.
const INCOMPLETE_REASON: &str = "Job could not be completed: not every source reported.";

/// Settings that shape how the manager runs jobs.
#[derive(Debug, Clone)]
pub struct ManagerSettings {
    pub max_concurrent_jobs: usize,
    pub job_retention: Option<Duration>,
    pub archive_dir: Option<PathBuf>,
    pub credentials: Credentials,
}

impl Default for ManagerSettings {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            job_retention: None,
            archive_dir: None,
            credentials: Credentials::default(),
        }
    }
}

impl ManagerSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_jobs: config.max_concurrent_jobs.max(1),
            job_retention: config.job_retention(),
            archive_dir: config.archive_dir.clone(),
            credentials: Credentials::from_config(config),
        }
    }
}

/// Owns the job store and drives every job from submission to a terminal state.
#[derive(Clone)]
pub struct JobManager {
    store: Arc<JobStore>,
    sources: Sources,
    permits: Arc<Semaphore>,
    settings: Arc<ManagerSettings>,
}

impl JobManager {
    pub fn new(sources: Sources, settings: ManagerSettings) -> Self {
        let permits = Arc::new(Semaphore::new(settings.max_concurrent_jobs.max(1)));
        Self {
            store: Arc::new(JobStore::new()),
            sources,
            permits,
            settings: Arc::new(settings),
        }
    }

    /// Register a job for `topic` and start it in the background.
    ///
    /// Must be called from within a tokio runtime. When a retention window is
    /// configured, finished jobs older than it are evicted first.
    ///
    /// # Arguments
    ///
    /// * `topic` - Free-text subject passed unchanged to every source
    ///
    /// # Returns
    ///
    /// The new job's id. The job is `Pending` at this point; no source has
    /// been fetched yet.
    pub fn submit(&self, topic: impl Into<String>) -> JobId {
        if let Some(retention) = self.settings.job_retention {
            self.store.evict_finished(retention);
        }

        let topic = topic.into();
        let job_id = Uuid::new_v4();
        let handle = self.store.insert(Job::new(
            job_id,
            topic.clone(),
            self.settings.credentials.clone(),
        ));
        info!(%job_id, %topic, stored = self.store.len(), "Job submitted");

        let manager = self.clone();
        tokio::spawn(async move {
            manager.run_job(job_id, topic, handle).await;
        });

        job_id
    }

    /// Current snapshot of a job.
    ///
    /// # Arguments
    ///
    /// * `job_id` - Id returned by [`JobManager::submit`]
    ///
    /// # Returns
    ///
    /// A [`JobView`] with status, progress label and completed sources. The
    /// result is present only when succeeded, the error only when failed.
    ///
    /// # Errors
    ///
    /// [`Error::JobNotFound`] if the id is unknown or has been evicted.
    pub fn get(&self, job_id: &JobId) -> Result<JobView> {
        self.store
            .view(job_id)
            .ok_or(Error::JobNotFound(*job_id))
    }

    /// Number of jobs currently running (not counting queued ones).
    pub fn active_count(&self) -> usize {
        self.store.count_with_status(JobStatus::Running)
    }

    #[instrument(level = "info", skip(self, topic, handle))]
    async fn run_job(&self, job_id: JobId, topic: String, handle: JobHandle) {
        let _permit = match Arc::clone(&self.permits).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                // The semaphore is never closed while the manager is alive.
                error!(error = %e, "Job scheduler unavailable");
                return;
            }
        };

        let credentials = {
            let mut job = lock(&handle);
            if !job.start() {
                return;
            }
            job.credentials.clone()
        };
        info!(%topic, "Job running");

        let mut pipelines: FuturesUnordered<_> = SourceKind::ALL
            .into_iter()
            .map(|kind| {
                let fetcher = self.sources.get(kind);
                let topic = topic.clone();
                let api_key = credentials.for_source(kind).map(str::to_string);
                let task = tokio::spawn(async move {
                    run_source_pipeline(fetcher.as_ref(), &topic, api_key.as_deref()).await
                });
                async move { (kind, task.await) }
            })
            .collect();

        while let Some((kind, joined)) = pipelines.next().await {
            let outcome = match joined {
                Ok(outcome) if outcome.kind != kind => {
                    warn!(
                        source = %kind,
                        reported = %outcome.kind,
                        "Fetcher reported a different source kind; recording under its slot"
                    );
                    PipelineOutcome { kind, ..outcome }
                }
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(source = %kind, error = %e, "Source pipeline panicked; treating as empty");
                    PipelineOutcome::empty(kind)
                }
            };
            let contributed = outcome.contributed;
            let (recorded, label) = {
                let mut job = lock(&handle);
                let recorded = job.record_outcome(outcome);
                (recorded, job.progress_label().to_string())
            };
            if recorded {
                debug!(source = %kind, contributed, progress = %label, "Source reported");
            } else {
                warn!(source = %kind, progress = %label, "Source report ignored");
            }
        }

        self.finish(job_id, &topic, &handle).await;
    }

    /// Aggregate the recorded texts and make the terminal transition.
    async fn finish(&self, job_id: JobId, topic: &str, handle: &JobHandle) {
        let (aggregated, elapsed) = {
            let job = lock(handle);
            if !job.all_sources_reported() {
                drop(job);
                Self::abort(handle, INCOMPLETE_REASON);
                return;
            }
            (aggregate(job.per_source_text()), job.submitted_at.elapsed())
        };

        match aggregated {
            Ok(result) => {
                if let Some(dir) = &self.settings.archive_dir {
                    let record = JobRecord::new(job_id, topic, &result);
                    if let Err(e) = json::write_job_record(&record, dir).await {
                        warn!(error = %e, "Failed to archive job result");
                    }
                }
                let sources = result.contributing_sources.clone();
                let characters = result.character_count;
                if lock(handle).succeed(result) {
                    info!(?sources, characters, ?elapsed, "Job succeeded");
                } else {
                    Self::abort(handle, INCOMPLETE_REASON);
                }
            }
            Err(e) => {
                let reason = format!(
                    "Could not retrieve any usable data for '{topic}' from any source ({e})."
                );
                if lock(handle).fail(reason) {
                    warn!(error = %e, ?elapsed, "Job failed");
                } else {
                    Self::abort(handle, INCOMPLETE_REASON);
                }
            }
        }
    }

    /// Force a job whose normal terminal transition was refused into `Failed`.
    fn abort(handle: &JobHandle, reason: &str) {
        let mut job = lock(handle);
        let missing: Vec<SourceKind> = SourceKind::ALL
            .into_iter()
            .filter(|kind| !job.sources_completed().contains(kind))
            .collect();
        error!(status = ?job.status(), ?missing, "Terminal transition refused; failing job");
        job.abort(reason);
    }
}
