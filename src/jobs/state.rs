//! Per-job state and its transitions.
//!
//! ```text
//! Pending ──start──▶ Running ──succeed──▶ Succeeded
//!                       │
//!                       └──────fail─────▶ Failed
//! ```
//!
//! The terminal payload lives inside the terminal variant, so a job can never
//! carry both a result and an error, or either one before it has finished.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::fetchers::Credentials;
use crate::models::{JobId, JobResult, JobStatus, JobView, PipelineOutcome, SourceKind};

pub const QUEUED_LABEL: &str = "Queued";
pub const AGGREGATING_LABEL: &str = "Aggregating sources...";
pub const COMPLETE_LABEL: &str = "Complete!";
pub const FAILED_LABEL: &str = "Failed";

#[derive(Debug, Clone, PartialEq, Eq)]
enum JobState {
    Pending,
    Running,
    Succeeded(JobResult),
    Failed(String),
}

#[derive(Debug)]
pub struct Job {
    pub id: JobId,
    pub topic: String,
    pub credentials: Credentials,
    state: JobState,
    progress_label: String,
    /// Cleaned text per finished source; its keys are the completed set.
    per_source_text: BTreeMap<SourceKind, String>,
    pub submitted_at: Instant,
    pub finished_at: Option<Instant>,
}

impl Job {
    pub fn new(id: JobId, topic: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            id,
            topic: topic.into(),
            credentials,
            state: JobState::Pending,
            progress_label: QUEUED_LABEL.to_string(),
            per_source_text: BTreeMap::new(),
            submitted_at: Instant::now(),
            finished_at: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        match self.state {
            JobState::Pending => JobStatus::Pending,
            JobState::Running => JobStatus::Running,
            JobState::Succeeded(_) => JobStatus::Succeeded,
            JobState::Failed(_) => JobStatus::Failed,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status().is_terminal()
    }

    pub fn progress_label(&self) -> &str {
        &self.progress_label
    }

    /// `Pending → Running`. Returns false if the job was not pending.
    pub fn start(&mut self) -> bool {
        if self.state != JobState::Pending {
            return false;
        }
        self.state = JobState::Running;
        self.refresh_progress();
        true
    }

    /// Store a pipeline's outcome. Ignored unless the job is running; a
    /// second report for the same source keeps the first one.
    pub fn record_outcome(&mut self, outcome: PipelineOutcome) -> bool {
        if self.state != JobState::Running || self.per_source_text.contains_key(&outcome.kind) {
            return false;
        }
        self.per_source_text.insert(outcome.kind, outcome.cleaned_text);
        self.refresh_progress();
        true
    }

    pub fn all_sources_reported(&self) -> bool {
        SourceKind::ALL
            .iter()
            .all(|kind| self.per_source_text.contains_key(kind))
    }

    /// Sources that reported, in fixed source order.
    pub fn sources_completed(&self) -> Vec<SourceKind> {
        self.per_source_text.keys().copied().collect()
    }

    /// Cleaned texts in fixed source order, for the aggregator.
    pub fn per_source_text(&self) -> impl Iterator<Item = (SourceKind, &str)> {
        self.per_source_text
            .iter()
            .map(|(kind, text)| (*kind, text.as_str()))
    }

    /// `Running → Succeeded`, only once every source has reported.
    pub fn succeed(&mut self, result: JobResult) -> bool {
        if self.state != JobState::Running || !self.all_sources_reported() {
            return false;
        }
        self.state = JobState::Succeeded(result);
        self.progress_label = COMPLETE_LABEL.to_string();
        self.finished_at = Some(Instant::now());
        true
    }

    /// `Running → Failed`, only once every source has reported.
    pub fn fail(&mut self, reason: impl Into<String>) -> bool {
        if self.state != JobState::Running || !self.all_sources_reported() {
            return false;
        }
        self.state = JobState::Failed(reason.into());
        self.progress_label = FAILED_LABEL.to_string();
        self.finished_at = Some(Instant::now());
        true
    }

    /// `Running → Failed` without waiting for outstanding sources.
    ///
    /// Used when the manager can no longer make a normal terminal transition,
    /// so a job never stays `Running` once its worker has stopped.
    pub fn abort(&mut self, reason: impl Into<String>) -> bool {
        if self.state != JobState::Running {
            return false;
        }
        self.state = JobState::Failed(reason.into());
        self.progress_label = FAILED_LABEL.to_string();
        self.finished_at = Some(Instant::now());
        true
    }

    /// Running label: the lowest-numbered source not yet reported.
    fn refresh_progress(&mut self) {
        self.progress_label = SourceKind::ALL
            .iter()
            .find(|kind| !self.per_source_text.contains_key(*kind))
            .map(|kind| kind.stage_label())
            .unwrap_or_else(|| AGGREGATING_LABEL.to_string());
    }

    pub fn view(&self) -> JobView {
        let (result, error) = match &self.state {
            JobState::Succeeded(result) => (Some(result.clone()), None),
            JobState::Failed(reason) => (None, Some(reason.clone())),
            JobState::Pending | JobState::Running => (None, None),
        };
        JobView {
            job_id: self.id,
            topic: self.topic.clone(),
            status: self.status(),
            progress_label: self.progress_label.clone(),
            sources_completed: self.sources_completed(),
            result,
            error,
        }
    }
}
